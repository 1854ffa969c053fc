use std::fmt::{self, Display};
use std::sync::Mutex;
use std::time::Instant;

use log::{error, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::engine::{Board, Column, Side};
use crate::core::evaluation;

pub const WIN_SCORE: i32 = 10_000_000;
pub const DEFAULT_DEPTH: u32 = 5;

pub trait Algorithm {
    fn solve(&self, board: &Board) -> Result<Column, SearchError>;
}

pub type EvaluationFunc = dyn Fn(&Board, Side) -> i32 + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Someone already won or the board is full.
    TerminalBoard,
}

impl Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::TerminalBoard => write!(f, "no move to search, game is already over"),
        }
    }
}

impl std::error::Error for SearchError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub column: Option<Column>,
    pub value: i32,
    /// Placements made while exploring the tree.
    pub nodes: u64,
}

/// Fixed-depth minimax with optional alpha-beta pruning. `side` is the
/// maximizing (computer) side, its opponent minimizes.
pub struct MinMaxBot {
    max_depth: u32,
    side: Side,
    pruning: bool,
    evaluate_fn: &'static EvaluationFunc,
}

impl MinMaxBot {
    pub fn new(max_depth: u32, side: Side) -> Self {
        MinMaxBot {
            max_depth,
            side,
            pruning: true,
            evaluate_fn: &evaluation::score,
        }
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_evaluation(mut self, evaluate_fn: &'static EvaluationFunc) -> Self {
        self.evaluate_fn = evaluate_fn;
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Value of a node where the search stops: wins and draws are exact,
    /// anything else falls back to the heuristic.
    pub fn leaf_value(&self, board: &Board) -> i32 {
        if board.has_win(self.side) {
            WIN_SCORE
        } else if board.has_win(self.side.opposite()) {
            -WIN_SCORE
        } else if board.is_full() {
            0
        } else {
            (self.evaluate_fn)(board, self.side)
        }
    }

    /// Top-level search. An empty board answers the center column without
    /// exploring anything.
    pub fn search_root(&self, board: &Board) -> SearchOutcome {
        if board.is_empty() {
            return SearchOutcome {
                column: Some(Column::CENTER),
                value: 0,
                nodes: 0,
            };
        }
        let mut scratch = board.clone();
        self.search_from(&mut scratch, self.max_depth, true)
    }

    /// Searches `depth` plies below `board`. The board is borrowed mutably for
    /// place/undo and holds the same value again when this returns.
    pub fn search_from(&self, board: &mut Board, depth: u32, maximizing: bool) -> SearchOutcome {
        let mut nodes = 0;
        let (column, value) = self.search(board, depth, i32::MIN, i32::MAX, maximizing, &mut nodes);
        SearchOutcome {
            column,
            value,
            nodes,
        }
    }

    fn search(
        &self,
        board: &mut Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        nodes: &mut u64,
    ) -> (Option<Column>, i32) {
        if depth == 0 || board.is_terminal() {
            return (None, self.leaf_value(board));
        }
        let side = if maximizing {
            self.side
        } else {
            self.side.opposite()
        };
        let mut best_column = None;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for column in board.legal_moves() {
            let value = {
                let mut placed = match board.place_scoped(column, side) {
                    Ok(placed) => placed,
                    Err(err) => {
                        error!("Legal move {} rejected during search: {}", column, err);
                        debug_assert!(false, "legal_moves yielded a closed column {column}");
                        continue;
                    }
                };
                *nodes += 1;
                self.search(&mut placed, depth - 1, alpha, beta, !maximizing, nodes)
                    .1
            };
            // Strict comparison: the lowest column keeps a tied value.
            if maximizing {
                if value > best {
                    best = value;
                    best_column = Some(column);
                }
                alpha = alpha.max(best);
            } else {
                if value < best {
                    best = value;
                    best_column = Some(column);
                }
                beta = beta.min(best);
            }
            if self.pruning && alpha >= beta {
                break;
            }
        }
        (best_column, best)
    }
}

impl Default for MinMaxBot {
    fn default() -> Self {
        MinMaxBot::new(DEFAULT_DEPTH, Side::PlayerTwo)
    }
}

impl Algorithm for MinMaxBot {
    fn solve(&self, board: &Board) -> Result<Column, SearchError> {
        if board.is_terminal() {
            return Err(SearchError::TerminalBoard);
        }
        let now = Instant::now();
        let outcome = self.search_root(board);
        trace!(
            "Search depth {} chose {:?} (value {}, {} nodes) in {}us",
            self.max_depth,
            outcome.column,
            outcome.value,
            outcome.nodes,
            now.elapsed().as_micros()
        );
        outcome
            .column
            .or_else(|| board.legal_moves().first().copied())
            .ok_or(SearchError::TerminalBoard)
    }
}

/// Plays a uniformly random legal column.
pub struct RandomBot {
    rng: Mutex<StdRng>,
}

impl RandomBot {
    pub fn new() -> Self {
        RandomBot {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomBot {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        RandomBot::new()
    }
}

impl Algorithm for RandomBot {
    fn solve(&self, board: &Board) -> Result<Column, SearchError> {
        if board.is_terminal() {
            return Err(SearchError::TerminalBoard);
        }
        let moves = board.legal_moves();
        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };
        moves
            .choose(&mut *rng)
            .copied()
            .ok_or(SearchError::TerminalBoard)
    }
}
