//! Runs search and render tasks on a fresh thread per task and hands the
//! single result back through a one-shot channel.

pub mod definitions;
pub mod logic;

pub use definitions::{DispatchResult, Payload, RenderRequest, Renderer, Task, TaskId};
pub use logic::{Dispatcher, DispatcherConfig, PendingResult};
