use std::env;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::Instant;

use anyhow::anyhow;
use futures::stream::{FuturesUnordered, Stream};
use futures::FutureExt;
use tokio::sync::oneshot;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

use crate::core::algorithms::{Algorithm, MinMaxBot, DEFAULT_DEPTH};
use crate::core::engine::{Board, Side};
use crate::dispatch::definitions::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub search_depth: u32,
    pub computer_side: Side,
    pub thread_stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            search_depth: DEFAULT_DEPTH,
            computer_side: Side::PlayerTwo,
            thread_stack_size: None,
            thread_name_prefix: "c4-task".to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Defaults, overridden by `C4_SEARCH_DEPTH` and `C4_THREAD_STACK_SIZE`.
    pub fn from_env() -> Self {
        let mut config = DispatcherConfig::default();
        if let Some(depth) = env_number("C4_SEARCH_DEPTH") {
            config.search_depth = depth;
        }
        if let Some(size) = env_number("C4_THREAD_STACK_SIZE") {
            config.thread_stack_size = Some(size);
        }
        config
    }

    pub fn with_search_depth(mut self, depth: u32) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_computer_side(mut self, side: Side) -> Self {
        self.computer_side = side;
        self
    }

    pub fn with_thread_stack_size(mut self, size: usize) -> Self {
        self.thread_stack_size = Some(size);
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(number) => Some(number),
        Err(_) => {
            warn!("Ignoring {}={:?}, expected a number", name, value);
            None
        }
    }
}

/// Sends every task to its own short-lived thread. Cloning is cheap and
/// clones share the renderer.
#[derive(Clone, Default)]
pub struct Dispatcher {
    config: DispatcherConfig,
    renderer: Option<Arc<dyn Renderer>>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Dispatcher {
            config,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Starts `task` and returns immediately. The returned handle resolves to
    /// exactly one result.
    pub fn dispatch(&self, task: Task) -> PendingResult {
        let id = Uuid::new_v4();
        debug!("Dispatching {} task {}", task.kind(), id);

        let (sender, receiver) = oneshot::channel();
        let config = self.config.clone();
        let renderer = self.renderer.clone();

        let name = format!("{}-{}", self.config.thread_name_prefix, id.simple());
        if name.contains('\0') {
            error!("Thread name {:?} for task {} contains a NUL byte", name, id);
            return PendingResult::failed(id, "thread name contains a NUL byte");
        }
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = self.config.thread_stack_size {
            builder = builder.stack_size(size);
        }
        let spawned = builder.spawn(move || {
            let now = Instant::now();
            let result = execute_isolated(task, &config, renderer.as_deref());
            trace!(
                "Task {} finished in {}us (error: {})",
                id,
                now.elapsed().as_micros(),
                result.is_error()
            );
            if sender.send(result).is_err() {
                debug!("Result of task {} discarded, nobody is waiting", id);
            }
        });

        match spawned {
            Ok(_) => PendingResult {
                id,
                state: PendingState::Waiting(receiver),
            },
            Err(err) => {
                error!("Failed to start isolated context for task {}: {}", id, err);
                PendingResult::failed(id, err)
            }
        }
    }

    pub async fn run(&self, task: Task) -> DispatchResult {
        self.dispatch(task).await
    }

    /// Results arrive in completion order, tagged with the task's position
    /// in `tasks`.
    pub fn dispatch_all<I>(&self, tasks: I) -> impl Stream<Item = (usize, DispatchResult)>
    where
        I: IntoIterator<Item = Task>,
    {
        tasks
            .into_iter()
            .enumerate()
            .map(|(idx, task)| self.dispatch(task).map(move |result| (idx, result)))
            .collect::<FuturesUnordered<_>>()
    }
}

enum PendingState {
    Waiting(oneshot::Receiver<DispatchResult>),
    Ready(Option<DispatchResult>),
}

/// Handle to a dispatched task.
pub struct PendingResult {
    id: TaskId,
    state: PendingState,
}

impl PendingResult {
    fn failed(id: TaskId, reason: impl Display) -> Self {
        PendingResult {
            id,
            state: PendingState::Ready(Some(DispatchResult::Error(format!(
                "failed to start isolated context: {reason}"
            )))),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Blocks the current thread until the result arrives. Must not be called
    /// from inside an async runtime.
    pub fn wait(self) -> DispatchResult {
        match self.state {
            PendingState::Waiting(receiver) => {
                receiver.blocking_recv().unwrap_or_else(|_| context_lost(self.id))
            }
            PendingState::Ready(result) => result.unwrap_or_else(|| context_lost(self.id)),
        }
    }
}

impl Future for PendingResult {
    type Output = DispatchResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let id = this.id;
        match &mut this.state {
            PendingState::Waiting(receiver) => receiver
                .poll_unpin(cx)
                .map(|result| result.unwrap_or_else(|_| context_lost(id))),
            PendingState::Ready(result) => {
                Poll::Ready(result.take().unwrap_or_else(|| context_lost(id)))
            }
        }
    }
}

fn context_lost(id: TaskId) -> DispatchResult {
    error!("Isolated context of task {} exited without a result", id);
    DispatchResult::Error("isolated context exited without a result".to_string())
}

/// Runs `task` to completion, turning errors and panics into an error result.
fn execute_isolated(
    task: Task,
    config: &DispatcherConfig,
    renderer: Option<&dyn Renderer>,
) -> DispatchResult {
    let kind = task.kind();
    match panic::catch_unwind(AssertUnwindSafe(|| execute(task, config, renderer))) {
        Ok(Ok(payload)) => DispatchResult::Data(payload),
        Ok(Err(err)) => {
            warn!("The {} task failed: {:#}", kind, err);
            DispatchResult::Error(format!("{err:#}"))
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|msg| msg.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown fault".to_string());
            error!("The {} task faulted: {}", kind, message);
            DispatchResult::Error(format!("{kind} task faulted: {message}"))
        }
    }
}

fn execute(
    task: Task,
    config: &DispatcherConfig,
    renderer: Option<&dyn Renderer>,
) -> anyhow::Result<Payload> {
    match task {
        Task::Search { board } => {
            let board = Board::try_from(board)?;
            let bot = MinMaxBot::new(config.search_depth, config.computer_side);
            Ok(Payload::Column(bot.solve(&board)?))
        }
        Task::Render(request) => {
            Board::try_from(request.board)?;
            let renderer = renderer.ok_or_else(|| anyhow!("no renderer configured"))?;
            Ok(Payload::Image(renderer.render(&request)?))
        }
    }
}
