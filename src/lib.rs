pub mod core;
pub mod dispatch;

// module re-exports
pub use self::core::algorithms::{Algorithm, MinMaxBot, RandomBot, SearchError, SearchOutcome};
pub use self::core::definitions::{GameEndState, GameState, LastMove, Palette, Rgb};
pub use self::core::engine::{Board, Cell, Column, Grid, MoveError, Side, WinLine};
pub use self::core::game::Game;
pub use self::dispatch::{Dispatcher, DispatcherConfig, DispatchResult, Payload, Task};
