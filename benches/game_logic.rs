use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gem_crush::core::{Board, BoardConfig, GameConfig, StageTimings};
use gem_crush::engine::Game;
use gem_crush::types::Coord;

fn bench_match_scan(c: &mut Criterion) {
    let board = Board::new(&BoardConfig::default()).unwrap();

    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| black_box(board.find_matches()))
    });
}

fn bench_collapse_refill(c: &mut Criterion) {
    let config = BoardConfig::default();

    c.bench_function("explode_collapse_refill_bottom_half", |b| {
        let mut board = Board::new(&config).unwrap();
        let bottom: Vec<Coord> = (0..8)
            .flat_map(|x| (0..4).map(move |y| Coord::new(x, y)))
            .collect();
        b.iter(|| {
            board.explode(bottom.iter().copied());
            black_box(board.collapse());
            black_box(board.refill());
        })
    });
}

fn bench_full_turn(c: &mut Criterion) {
    let config = GameConfig {
        timings: StageTimings::instant(),
        ..GameConfig::default()
    };
    let mut game = Game::new(config).unwrap();

    c.bench_function("full_turn_instant", |b| {
        let mut x = 0;
        b.iter(|| {
            x = (x + 1) % 7;
            game.select(Coord::new(x, 3));
            game.select(Coord::new(x + 1, 3));
            black_box(game.take_events());
        })
    });
}

criterion_group!(
    benches,
    bench_match_scan,
    bench_collapse_refill,
    bench_full_turn
);
criterion_main!(benches);
