use std::fmt::{self, Display};
use std::ops::{Deref, DerefMut};

use log::trace;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::core::utils::{compact_pos, Position, WINDOWS};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Wire form of a board: `ROWS` rows of `COLS` cell codes (0 empty, 1/2 players).
pub type Grid = [[u8; COLS]; ROWS];

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Side {
    PlayerOne = 0x01,
    PlayerTwo = 0x02,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::PlayerOne => Side::PlayerTwo,
            Side::PlayerTwo => Side::PlayerOne,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::PlayerOne => write!(f, "player one"),
            Side::PlayerTwo => write!(f, "player two"),
        }
    }
}

impl From<Side> for u8 {
    fn from(value: Side) -> Self {
        value as u8
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Cell {
    Empty,
    Piece(Side),
}

impl Cell {
    fn from_code(code: u8) -> Option<Cell> {
        match code {
            0x00 => Some(Cell::Empty),
            0x01 => Some(Cell::Piece(Side::PlayerOne)),
            0x02 => Some(Cell::Piece(Side::PlayerTwo)),
            _ => None,
        }
    }

    fn code(self) -> u8 {
        match self {
            Cell::Empty => 0x00,
            Cell::Piece(side) => side.into(),
        }
    }
}

/// Board column, guaranteed to be in `0..COLS`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Column(u8);

impl Column {
    pub const CENTER: Column = Column(3);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Column> {
        (0..COLS as u8).map(Column)
    }
}

impl TryFrom<u8> for Column {
    type Error = MoveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Column::try_from(value as usize)
    }
}

impl TryFrom<usize> for Column {
    type Error = MoveError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value < COLS {
            Ok(Column(value as u8))
        } else {
            Err(MoveError::OutOfRange(value))
        }
    }
}

impl From<Column> for u8 {
    fn from(value: Column) -> Self {
        value.0
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    OutOfRange(usize),
    ColumnFull(Column),
}

impl Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfRange(col) => {
                write!(f, "column {col} is outside of 0..{COLS}")
            }
            MoveError::ColumnFull(col) => write!(f, "column {col} is full"),
        }
    }
}

impl std::error::Error for MoveError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidCell { row: usize, col: usize, code: u8 },
    /// Occupied cell with an empty cell somewhere below it.
    FloatingPiece { row: usize, col: usize },
}

impl Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidCell { row, col, code } => {
                write!(f, "cell ({row}, {col}) has unknown code {code}")
            }
            GridError::FloatingPiece { row, col } => {
                write!(f, "piece at ({row}, {col}) has an empty cell below it")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Four coordinates of a completed line, in scan order.
pub type WinLine = [Position; 4];

/** Row-major grid of cell codes, row 0 is the top. */
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    #[serde_as(as = "Bytes")]
    arr: [u8; ROWS * COLS],
}

impl Board {
    pub fn new() -> Board {
        Board {
            arr: [0x00; ROWS * COLS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        Cell::from_code(self.arr[compact_pos(row, col)]).unwrap_or(Cell::Empty)
    }

    fn top_is_empty(&self, col: Column) -> bool {
        self.arr[compact_pos(0, col.index())] == 0x00
    }

    pub fn is_legal_move(&self, col: u8) -> bool {
        Column::try_from(col)
            .map(|col| self.top_is_empty(col))
            .unwrap_or(false)
    }

    /// Open columns, ascending.
    pub fn legal_moves(&self) -> Vec<Column> {
        Column::all().filter(|col| self.top_is_empty(*col)).collect()
    }

    /// Drops a piece into `col`, returns the row it landed on.
    pub fn place(&mut self, col: Column, side: Side) -> Result<usize, MoveError> {
        let row = (0..ROWS)
            .rev()
            .find(|row| self.arr[compact_pos(*row, col.index())] == 0x00)
            .ok_or(MoveError::ColumnFull(col))?;
        self.arr[compact_pos(row, col.index())] = side.into();
        Ok(row)
    }

    /** Rolls back a placement, `row` must be the one `place` returned. */
    pub fn undo(&mut self, col: Column, row: usize) {
        debug_assert!(
            row == 0 || self.arr[compact_pos(row - 1, col.index())] == 0x00,
            "Undo out of order at ({row}, {col})"
        );
        self.arr[compact_pos(row, col.index())] = 0x00;
    }

    /// Places a piece that is taken back when the returned guard drops,
    /// including during unwinding.
    pub fn place_scoped(&mut self, col: Column, side: Side) -> Result<Placement<'_>, MoveError> {
        let row = self.place(col, side)?;
        Ok(Placement {
            board: self,
            col,
            row,
        })
    }

    pub fn win_line(&self, side: Side) -> Option<WinLine> {
        let code: u8 = side.into();
        WINDOWS
            .iter()
            .find(|window| {
                window
                    .iter()
                    .all(|(row, col)| self.arr[compact_pos(*row, *col)] == code)
            })
            .copied()
    }

    pub fn has_win(&self, side: Side) -> bool {
        self.win_line(side).is_some()
    }

    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.arr[compact_pos(0, col)] != 0x00)
    }

    pub fn is_empty(&self) -> bool {
        self.arr.iter().all(|code| *code == 0x00)
    }

    pub fn is_terminal(&self) -> bool {
        self.has_win(Side::PlayerOne) || self.has_win(Side::PlayerTwo) || self.is_full()
    }

    pub fn count(&self, side: Side) -> usize {
        let code: u8 = side.into();
        self.arr.iter().filter(|cell| **cell == code).count()
    }

    pub fn to_grid(&self) -> Grid {
        let mut grid = [[0x00; COLS]; ROWS];
        for (row, line) in grid.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                *cell = self.arr[compact_pos(row, col)];
            }
        }
        grid
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl TryFrom<Grid> for Board {
    type Error = GridError;

    fn try_from(grid: Grid) -> Result<Self, Self::Error> {
        let mut board = Board::new();
        for col in 0..COLS {
            let mut seen_empty_below = false;
            for row in (0..ROWS).rev() {
                let code = grid[row][col];
                let cell =
                    Cell::from_code(code).ok_or(GridError::InvalidCell { row, col, code })?;
                match cell {
                    Cell::Empty => seen_empty_below = true,
                    Cell::Piece(_) if seen_empty_below => {
                        return Err(GridError::FloatingPiece { row, col })
                    }
                    Cell::Piece(_) => (),
                }
                board.arr[compact_pos(row, col)] = cell.code();
            }
        }
        Ok(board)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            for col in 0..COLS {
                let symbol = match self.get(row, col) {
                    Cell::Empty => '.',
                    Cell::Piece(Side::PlayerOne) => 'X',
                    Cell::Piece(Side::PlayerTwo) => 'O',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        write!(f, "0123456")
    }
}

/// Speculative placement, see [`Board::place_scoped`].
pub struct Placement<'a> {
    board: &'a mut Board,
    col: Column,
    row: usize,
}

impl Placement<'_> {
    pub fn row(&self) -> usize {
        self.row
    }
}

impl Deref for Placement<'_> {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        &*self.board
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.board
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            trace!("Rolling back ({}, {}) while unwinding", self.row, self.col);
        }
        self.board.undo(self.col, self.row);
    }
}
