use std::time::Duration;

use clap::Parser;
use wondev::{BotConfig, bot, search::Algorithm};

#[derive(Debug, Parser)]
#[command(version, about = "Plays one game over stdin/stdout")]
struct Args {
    /// Plies to search ahead.
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// Per-turn search budget in milliseconds, 0 to disable the deadline.
    #[arg(short, long, default_value_t = 45)]
    time_budget_ms: u64,

    #[arg(short, long, value_enum, default_value_t = Algorithm::AlphaBeta)]
    algorithm: Algorithm,

    /// Skip moves onto cells the unit could not leave again.
    #[arg(long)]
    prune_dead_ends: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{args:?}");

    let config = BotConfig {
        depth: args.depth,
        time_budget: (args.time_budget_ms > 0).then(|| Duration::from_millis(args.time_budget_ms)),
        algorithm: args.algorithm,
        prune_dead_ends: args.prune_dead_ends,
    };

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    bot::run(stdin, stdout, config)
}
