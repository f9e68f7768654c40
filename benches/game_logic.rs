use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetrion::core::{ActivePiece, GameConfig, GameController, Playfield, RandomizationQueue};
use tetrion::types::{Command, PieceKind, SessionState};

fn bench_update(c: &mut Criterion) {
    let mut now = Instant::now();
    let mut game = GameController::new(GameConfig::default().with_seed(12345));
    game.start(now);

    c.bench_function("update_16ms", |b| {
        b.iter(|| {
            now += Duration::from_millis(16);
            game.update(black_box(now));
            if game.state() == SessionState::GameOver {
                game.handle_command(Command::Restart, now);
            }
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut field = Playfield::new();
            // Fill bottom 4 rows
            for y in 36..40 {
                for x in 0..10 {
                    field.set(x, y, Some(PieceKind::I));
                }
            }
            field.clear_empty_lines()
        })
    });
}

fn bench_pull_next(c: &mut Criterion) {
    let mut queue = RandomizationQueue::new(12345);

    c.bench_function("pull_next", |b| b.iter(|| queue.pull_next()));
}

fn bench_move(c: &mut Criterion) {
    let field = Playfield::new();
    let mut piece = ActivePiece::spawn(PieceKind::T);

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            piece.move_left(black_box(&field));
            piece.move_right(black_box(&field))
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let field = Playfield::new();
    let mut piece = ActivePiece::spawn(PieceKind::I);

    c.bench_function("rotate_clockwise", |b| {
        b.iter(|| piece.rotate_clockwise(black_box(&field)))
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let field = Playfield::new();

    c.bench_function("hard_drop", |b| {
        b.iter(|| {
            let mut piece = ActivePiece::spawn(black_box(PieceKind::L));
            piece.hard_drop(&field)
        })
    });
}

criterion_group!(
    benches,
    bench_update,
    bench_line_clear,
    bench_pull_next,
    bench_move,
    bench_rotate,
    bench_hard_drop
);
criterion_main!(benches);
