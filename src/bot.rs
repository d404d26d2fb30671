use std::{
    fmt,
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use anyhow::Context as _;

use crate::{
    board::MoveGenOptions,
    protocol::{InputReader, RESIGN, Turn},
    search::{AlphaBeta, Algorithm, Minimax, ScoredAction, SearchConstraint, Searcher},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotConfig {
    pub depth: u32,
    /// Wall-clock budget per turn, `None` to always search the full depth.
    pub time_budget: Option<Duration>,
    pub algorithm: Algorithm,
    pub prune_dead_ends: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            time_budget: Some(Duration::from_millis(45)),
            algorithm: Algorithm::AlphaBeta,
            prune_dead_ends: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Play(ScoredAction),
    Resign,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Play(best) => fmt::Display::fmt(&best.action, f),
            Reply::Resign => f.write_str(RESIGN),
        }
    }
}

pub struct Bot {
    config: BotConfig,
    searcher: Box<dyn Searcher>,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        let movegen = MoveGenOptions {
            prune_dead_ends: config.prune_dead_ends,
        };

        let searcher: Box<dyn Searcher> = match config.algorithm {
            Algorithm::AlphaBeta => Box::new(AlphaBeta::new().with_movegen(movegen)),
            Algorithm::Minimax => Box::new(Minimax::new().with_movegen(movegen)),
        };

        Self { config, searcher }
    }

    pub fn searcher(&self) -> &dyn Searcher {
        self.searcher.as_ref()
    }

    pub fn play_turn(&mut self, turn: Turn) -> Reply {
        let Turn {
            mut board,
            legal_actions,
        } = turn;

        if legal_actions.is_empty() {
            log::info!("No legal action left");
            return Reply::Resign;
        }

        let start = Instant::now();
        let mut constraint = SearchConstraint::new(self.config.depth);
        if let Some(budget) = self.config.time_budget {
            constraint = constraint.with_deadline(start + budget);
        }

        log::trace!("Searching from:\n{board}");
        let best = self.searcher.search(&mut board, &legal_actions, constraint);

        log::info!(
            "Searched {} nodes in {:?}{}",
            self.searcher.node_counter(),
            start.elapsed(),
            if self.searcher.timed_out() {
                " (deadline hit)"
            } else {
                ""
            }
        );

        match best {
            Some(best) => {
                log::debug!("Best: {best}");
                log::info!("SCORE={}", best.eval);
                Reply::Play(best)
            }
            None => Reply::Resign,
        }
    }
}

/// Play a whole game: handshake, then one reply per turn until the input ends or we resign.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W, config: BotConfig) -> anyhow::Result<()> {
    let mut reader = InputReader::new(input);
    let game = reader.read_config().context("Failed to read the handshake")?;
    log::info!(
        "Board {0}x{0}, {1} units per player",
        game.size,
        game.units_per_player
    );

    let mut bot = Bot::new(config);

    for turn_number in 1.. {
        let Some(turn) = reader
            .read_turn(&game)
            .with_context(|| format!("Failed to read turn {turn_number}"))?
        else {
            log::info!("Input closed after {} turns", turn_number - 1);
            break;
        };

        let reply = bot.play_turn(turn);
        writeln!(output, "{reply}")?;
        output.flush()?;

        if reply == Reply::Resign {
            break;
        }
    }

    Ok(())
}
