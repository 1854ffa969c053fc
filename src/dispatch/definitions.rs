use std::fmt::{self, Display};

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::core::definitions::{LastMove, Palette};
use crate::core::engine::{Column, Grid};

pub use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub board: Grid,
    pub palette: Palette,
    pub last_move: Option<LastMove>,
    pub scene_id: Option<String>,
}

/// One unit of work for an isolated context. Carries its own board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Search { board: Grid },
    Render(RenderRequest),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Column(Column),
    Image(#[serde_as(as = "Bytes")] Vec<u8>),
}

/// The single message an isolated context sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchResult {
    Data(Payload),
    Error(String),
}

/// External rendering pipeline. Called on the isolated context's thread.
pub trait Renderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug)]
pub enum ParsingMessageError {
    PostcardError(postcard::Error),
}

impl Display for ParsingMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingMessageError::PostcardError(err) => write!(f, "malformed message: {err}"),
        }
    }
}

impl std::error::Error for ParsingMessageError {}

impl From<postcard::Error> for ParsingMessageError {
    fn from(value: postcard::Error) -> Self {
        ParsingMessageError::PostcardError(value)
    }
}

impl Task {
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Search { .. } => "search",
            Task::Render(_) => "render",
        }
    }

    pub fn board(&self) -> &Grid {
        match self {
            Task::Search { board } => board,
            Task::Render(request) => &request.board,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ParsingMessageError> {
        Ok(to_allocvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Task, ParsingMessageError> {
        Ok(from_bytes(bytes)?)
    }
}

impl DispatchResult {
    pub fn is_error(&self) -> bool {
        matches!(self, DispatchResult::Error(_))
    }

    pub fn column(&self) -> Option<Column> {
        match self {
            DispatchResult::Data(Payload::Column(col)) => Some(*col),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&[u8]> {
        match self {
            DispatchResult::Data(Payload::Image(bytes)) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DispatchResult::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ParsingMessageError> {
        Ok(to_allocvec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<DispatchResult, ParsingMessageError> {
        Ok(from_bytes(bytes)?)
    }
}
