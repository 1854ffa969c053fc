use crate::core::engine::{Board, Cell, Side, ROWS};
use crate::core::utils::{Window, WINDOWS};

pub const FOUR_IN_WINDOW: i32 = 10_000;
pub const THREE_IN_WINDOW: i32 = 5;
pub const TWO_IN_WINDOW: i32 = 2;
pub const OPPONENT_THREE_IN_WINDOW: i32 = -4;
pub const CENTER_BONUS: i32 = 3;

const CENTER_COL: usize = 3;

/// Heuristic value of `board` from `side`'s point of view. Finished positions
/// get no special treatment here.
pub fn score(board: &Board, side: Side) -> i32 {
    let windows: i32 = WINDOWS
        .iter()
        .map(|window| window_score(board, window, side))
        .sum();
    let center = (0..ROWS)
        .filter(|row| board.get(*row, CENTER_COL) == Cell::Piece(side))
        .count() as i32;
    windows + center * CENTER_BONUS
}

fn window_score(board: &Board, window: &Window, side: Side) -> i32 {
    let (mut own, mut opponent, mut empty) = (0, 0, 0);
    for (row, col) in window {
        match board.get(*row, *col) {
            Cell::Empty => empty += 1,
            Cell::Piece(piece) if piece == side => own += 1,
            Cell::Piece(_) => opponent += 1,
        }
    }
    match (own, opponent, empty) {
        (4, _, _) => FOUR_IN_WINDOW,
        (3, _, 1) => THREE_IN_WINDOW,
        (2, _, 2) => TWO_IN_WINDOW,
        (_, 3, 1) => OPPONENT_THREE_IN_WINDOW,
        _ => 0,
    }
}
