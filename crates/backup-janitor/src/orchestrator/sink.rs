use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use super::OperationError;

/// Receives progress from a running operation.
///
/// Called on the worker thread.
pub trait ProgressSink: Send + Sync {
    /// Progress in `0.0..=1.0` with a short status.
    fn on_progress(&self, _value: f32, _status: &str) {}
}

/// Receives everything a run of an operation reports.
///
/// Every method is called on the worker thread. The one exception is a worker
/// that could not be spawned, which is reported from
/// [`super::Operation::start`]. Within a run, all progress precedes exactly one
/// call to either [`Self::on_success`] or [`Self::on_error`].
pub trait OperationSink<T, E>: ProgressSink {
    /// The run returned `output`.
    fn on_success(&self, output: T);

    /// The run failed.
    fn on_error(&self, error: OperationError<E>);
}

/// Lets a unit of work report intermediate progress.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> Progress<'a> {
    /// Report to `sink`.
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink }
    }

    /// Report progress in `0.0..=1.0` with a short status.
    pub fn report(&self, value: f32, status: &str) {
        self.sink.on_progress(value.clamp(0.0, 1.0), status);
    }
}

/// Everything an operation reports, as a single stream.
#[derive(Debug)]
pub enum OperationEvent<T, E> {
    /// Intermediate progress.
    Progress {
        /// Progress in `0.0..=1.0`.
        value: f32,
        /// A short status.
        status: String,
    },

    /// The run returned a value. Always the last event of a run.
    Succeeded(T),

    /// The run failed. Always the last event of a run.
    Failed(OperationError<E>),
}

impl<T, E> OperationEvent<T, E> {
    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Forwards every report over a channel so the owning thread can handle them.
pub struct ChannelSink<T, E> {
    sender: Sender<OperationEvent<T, E>>,
}

impl<T, E> ChannelSink<T, E> {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, Receiver<OperationEvent<T, E>>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: OperationEvent<T, E>) {
        if self.sender.send(event).is_err() {
            debug!("Operation event dropped, the receiver is gone");
        }
    }
}

impl<T: Send, E: Send> ProgressSink for ChannelSink<T, E> {
    fn on_progress(&self, value: f32, status: &str) {
        self.send(OperationEvent::Progress {
            value,
            status: status.to_string(),
        });
    }
}

impl<T: Send, E: Send> OperationSink<T, E> for ChannelSink<T, E> {
    fn on_success(&self, output: T) {
        self.send(OperationEvent::Succeeded(output));
    }

    fn on_error(&self, error: OperationError<E>) {
        self.send(OperationEvent::Failed(error));
    }
}

/// Drain a run's events from a [`ChannelSink`] receiver until its outcome.
///
/// Progress is handed to `on_progress` in order. Returns `None` if every sender
/// is gone before an outcome arrived.
pub fn recv_outcome<T, E>(
    events: &Receiver<OperationEvent<T, E>>,
    mut on_progress: impl FnMut(f32, &str),
) -> Option<Result<T, OperationError<E>>> {
    for event in events {
        match event {
            OperationEvent::Progress { value, status } => on_progress(value, &status),
            OperationEvent::Succeeded(output) => return Some(Ok(output)),
            OperationEvent::Failed(error) => return Some(Err(error)),
        }
    }

    debug!("Operation events ended without an outcome");
    None
}
