use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridmatch::adapter::Message;
use gridmatch::core::{Board, GridBoard, DEFAULT_LAYOUT};
use gridmatch::engine::{GameMaster, MoveResolver, RandomPlayer};
use gridmatch::types::{Move, Position};

fn bench_full_match(c: &mut Criterion) {
    c.bench_function("match_100_rounds_random", |b| {
        b.iter(|| {
            let board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();
            let mut gm = GameMaster::new(board, 100, 1);
            gm.register_player(Box::new(RandomPlayer::new(1))).unwrap();
            gm.register_player(Box::new(RandomPlayer::new(2))).unwrap();
            black_box(gm.play().unwrap());
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();

    c.bench_function("board_snapshot", |b| {
        b.iter(|| black_box(board.snapshot()));
    });
}

fn bench_fallback(c: &mut Criterion) {
    let board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();
    let legal = board.legal_moves(Position::new(1, 2));
    let mut resolver = MoveResolver::new(1);

    c.bench_function("fallback_move", |b| {
        b.iter(|| black_box(resolver.fallback_move(&legal)));
    });
}

fn bench_move_bot(c: &mut Criterion) {
    let mut board = GridBoard::from_layout_str(DEFAULT_LAYOUT, 2).unwrap();

    c.bench_function("move_bot_stay", |b| {
        b.iter(|| black_box(board.move_bot(0, Move::Stay)));
    });
}

fn bench_decode(c: &mut Criterion) {
    let line = r#"{"type":"response","result":"north","id":"q-42"}"#;

    c.bench_function("decode_response_line", |b| {
        b.iter(|| black_box(Message::from_line(black_box(line))));
    });
}

criterion_group!(
    benches,
    bench_full_match,
    bench_snapshot,
    bench_fallback,
    bench_move_bot,
    bench_decode
);
criterion_main!(benches);
