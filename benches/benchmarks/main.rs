use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use itertools::Itertools as _;
use rand::{SeedableRng, rngs::StdRng};
use wondev::{
    board::{Board, GameConfig, MoveGenOptions, Side, test_utils},
    search::{AlphaBeta, Minimax, SearchConstraint, Searcher},
};

/// Generate a vector of random boards for benchmarking.
fn generate_boards(count: usize, config: GameConfig) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(0xB0A2D);
    (0..count)
        .map(|_| test_utils::random_board(&mut rng, config, 10, 0))
        .collect()
}

fn bench_movegen(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("movegen");
    let boards = generate_boards(COUNT, GameConfig::new(6, 2));
    group.throughput(Throughput::Elements(boards.len() as u64));

    for prune_dead_ends in [false, true] {
        let options = MoveGenOptions { prune_dead_ends };
        let name = if prune_dead_ends { "pruned" } else { "full" };

        group.bench_function(name, |b| {
            let mut actions = Vec::new();
            b.iter(|| {
                for board in &boards {
                    actions.clear();
                    board.extend_actions(Side::Mine, options, &mut actions);
                    black_box(&actions);
                }
            });
        });
    }
}

fn bench_search(c: &mut Criterion) {
    const COUNT: usize = 10;

    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    let boards = generate_boards(COUNT, GameConfig::new(5, 1));
    let roots = boards
        .iter()
        .map(|board| board.possible_actions(Side::Mine))
        .collect_vec();
    let constraint = SearchConstraint::new(2);

    group.bench_function("alpha_beta", |b| {
        let mut searcher = AlphaBeta::new();
        b.iter(|| {
            for (board, root) in boards.iter().zip(&roots) {
                let mut board = board.clone();
                black_box(searcher.search(&mut board, root, constraint));
            }
        });
    });

    group.bench_function("minimax", |b| {
        let mut searcher = Minimax::new();
        b.iter(|| {
            for (board, root) in boards.iter().zip(&roots) {
                let mut board = board.clone();
                black_box(searcher.search(&mut board, root, constraint));
            }
        });
    });
}

criterion_group!(benches, bench_movegen, bench_search);
criterion_main!(benches);
