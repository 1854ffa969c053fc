use connect_four_engine::{
    core::evaluation::score, Algorithm, Board, Game, MinMaxBot, RandomBot, Side,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn midgame() -> Board {
    let mut game = Game::new();
    let opponent = RandomBot::seeded(1234);
    for _ in 0..10 {
        let column = opponent.solve(game.board()).unwrap();
        game.execute_move(column).unwrap();
        if game.game_ended() {
            break;
        }
    }
    game.board().clone()
}

fn random_game(opponent: &RandomBot) -> Game {
    let mut game = Game::new();
    while !game.game_ended() {
        let column = opponent.solve(game.board()).unwrap();
        game.execute_move(column).unwrap();
    }
    game
}

fn criterion_benchmark(c: &mut Criterion) {
    let board = midgame();
    let pruned = MinMaxBot::default();
    let full = MinMaxBot::default().with_pruning(false);
    let opponent = RandomBot::seeded(7);

    c.bench_function("evaluate midgame", |b| {
        b.iter(|| score(black_box(&board), Side::PlayerTwo))
    });
    c.bench_function("legal moves", |b| b.iter(|| black_box(&board).legal_moves()));
    c.bench_function("alpha-beta depth 5", |b| {
        b.iter(|| pruned.search_root(black_box(&board)))
    });
    c.bench_function("minimax depth 5", |b| {
        b.iter(|| full.search_root(black_box(&board)))
    });
    c.bench_function("random game", |b| b.iter(|| random_game(&opponent)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
