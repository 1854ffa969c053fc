use log::debug;

use crate::core::definitions::{GameEndState, GameState, LastMove, Palette};
use crate::core::engine::{Board, Column, MoveError, Side};
use crate::dispatch::definitions::{RenderRequest, Task};

/// A match in progress: the real board, whose turn it is and what was played.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_player: Side,
    history: Vec<LastMove>,
    end_state: Option<GameEndState>,
}

impl Game {
    pub fn new() -> Game {
        Game {
            board: Board::new(),
            current_player: Side::PlayerOne,
            history: Vec::new(),
            end_state: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Side {
        self.current_player
    }

    pub fn history(&self) -> &[LastMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.history.last().copied()
    }

    pub fn end_state(&self) -> Option<&GameEndState> {
        self.end_state.as_ref()
    }

    pub fn game_ended(&self) -> bool {
        self.end_state.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        match self.end_state {
            Some(GameEndState::Win { side, .. }) => Some(side),
            _ => None,
        }
    }

    pub fn state(&self) -> GameState {
        match &self.end_state {
            Some(end) => GameState::Finished(end.clone()),
            None => GameState::PlayerMove(self.current_player),
        }
    }

    /// Plays `col` for the side to move.
    pub fn execute_move(&mut self, col: Column) -> Result<GameState, MoveError> {
        if self.end_state.is_some() {
            return Ok(self.state());
        }
        let side = self.current_player;
        let row = self.board.place(col, side)?;
        self.history.push(LastMove { row, col, side });

        self.end_state = if let Some(line) = self.board.win_line(side) {
            Some(GameEndState::Win { side, line })
        } else if self.board.is_full() {
            Some(GameEndState::Draw)
        } else {
            None
        };
        self.current_player = side.opposite();
        if let Some(end) = &self.end_state {
            debug!("Game finished after {} moves: {:?}", self.history.len(), end);
        }
        Ok(self.state())
    }

    /// Takes back the most recent move, reopening a finished game.
    pub fn undo_last(&mut self) -> Option<LastMove> {
        let last = self.history.pop()?;
        self.board.undo(last.col, last.row);
        self.current_player = last.side;
        self.end_state = None;
        Some(last)
    }

    pub fn search_task(&self) -> Task {
        Task::Search {
            board: self.board.to_grid(),
        }
    }

    pub fn render_task(&self, palette: Palette, scene_id: Option<String>) -> Task {
        Task::Render(RenderRequest {
            board: self.board.to_grid(),
            palette,
            last_move: self.last_move(),
            scene_id,
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
