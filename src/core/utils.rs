use crate::core::engine::{COLS, ROWS};

/// Cells in a single window.
pub const WINDOW_LEN: usize = 4;

/// (row, column) pair, row 0 is the top of the board.
pub type Position = (usize, usize);

pub type Window = [Position; WINDOW_LEN];

const HORIZONTAL_COUNT: usize = ROWS * (COLS - WINDOW_LEN + 1);
const VERTICAL_COUNT: usize = (ROWS - WINDOW_LEN + 1) * COLS;
const DIAGONAL_COUNT: usize = (ROWS - WINDOW_LEN + 1) * (COLS - WINDOW_LEN + 1);

pub const WINDOW_COUNT: usize = HORIZONTAL_COUNT + VERTICAL_COUNT + 2 * DIAGONAL_COUNT;

/// Every run of four cells that fits on the grid, in scan order:
/// horizontal (rows top-to-bottom), vertical (columns left-to-right),
/// then `\` diagonals and `/` diagonals, each top-to-bottom and left-to-right.
pub const WINDOWS: [Window; WINDOW_COUNT] = build_windows();

const fn build_windows() -> [Window; WINDOW_COUNT] {
    let mut table = [[(0, 0); WINDOW_LEN]; WINDOW_COUNT];
    let mut idx = 0;

    let mut row = 0;
    while row < ROWS {
        let mut col = 0;
        while col + WINDOW_LEN <= COLS {
            table[idx] = line(row, col, 0, 1);
            idx += 1;
            col += 1;
        }
        row += 1;
    }

    let mut col = 0;
    while col < COLS {
        let mut row = 0;
        while row + WINDOW_LEN <= ROWS {
            table[idx] = line(row, col, 1, 0);
            idx += 1;
            row += 1;
        }
        col += 1;
    }

    let mut row = 0;
    while row + WINDOW_LEN <= ROWS {
        let mut col = 0;
        while col + WINDOW_LEN <= COLS {
            table[idx] = line(row, col, 1, 1);
            idx += 1;
            col += 1;
        }
        row += 1;
    }

    // `/` windows start at their top-right cell and walk down-left
    let mut row = 0;
    while row + WINDOW_LEN <= ROWS {
        let mut col = WINDOW_LEN - 1;
        while col < COLS {
            table[idx] = line(row, col, 1, -1);
            idx += 1;
            col += 1;
        }
        row += 1;
    }

    table
}

const fn line(row: usize, col: usize, d_row: isize, d_col: isize) -> Window {
    let mut window = [(0, 0); WINDOW_LEN];
    let mut step = 0;
    while step < WINDOW_LEN {
        window[step] = (
            (row as isize + d_row * step as isize) as usize,
            (col as isize + d_col * step as isize) as usize,
        );
        step += 1;
    }
    window
}

#[inline]
pub fn compact_pos(row: usize, col: usize) -> usize {
    row * COLS + col
}

/// True when every step between consecutive cells is the same unit step
/// along one axis or diagonal.
pub fn is_straight_run(cells: &[Position]) -> bool {
    if cells.len() < 2 {
        return true;
    }
    let step = |a: Position, b: Position| {
        (
            b.0 as isize - a.0 as isize,
            b.1 as isize - a.1 as isize,
        )
    };
    let first = step(cells[0], cells[1]);
    if first == (0, 0) || first.0.abs() > 1 || first.1.abs() > 1 {
        return false;
    }
    cells.windows(2).all(|pair| step(pair[0], pair[1]) == first)
}
