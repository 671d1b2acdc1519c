//! Single-flight background execution of maintenance actions.
//!
//! An [`Operation`] wraps a unit of work and runs it on its own worker thread.
//! At most one run is in flight per operation. Starting while a run is live is
//! rejected and returns `false`; it is not queued. Each run reports progress and
//! then exactly one terminal outcome to its [`OperationSink`]. The state is
//! already `Completed` or `Failed` by the time the outcome is delivered.
//!

use core::fmt::Display;
use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::Context;

mod sink;

pub use sink::{
    ChannelSink, OperationEvent, OperationSink, Progress, ProgressSink, recv_outcome,
};

/// The unit of work an operation runs.
type Work<A, T, E> = dyn Fn(A, &Progress<'_>) -> Result<T, E> + Send + Sync;

/// Where an operation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Never started.
    Idle,
    /// A worker is executing a run.
    Running,
    /// The last run returned a value.
    Completed,
    /// The last run failed.
    Failed,
}

/// Why a run failed.
#[derive(Debug, Error)]
pub enum OperationError<E> {
    /// The unit of work returned an error.
    #[error("{0}")]
    Failed(E),

    /// The unit of work panicked.
    #[error("Operation panicked: {0}")]
    Panicked(String),

    /// The worker thread could not be spawned.
    #[error("Failed to spawn the worker thread: {0}")]
    Spawn(#[source] io::Error),
}

struct Slot {
    state: OperationState,
    worker: Option<JoinHandle<()>>,
    runs: u64,
}

/// A reusable handle that runs one unit of work at a time on a background thread.
pub struct Operation<A, T, E, S> {
    name: &'static str,
    work: Arc<Work<A, T, E>>,
    sink: Arc<S>,
    slot: Arc<Mutex<Slot>>,
}

impl<A, T, E, S> Operation<A, T, E, S>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    S: OperationSink<T, E> + 'static,
{
    /// Create an idle operation. `name` prefixes the operation's logs and
    /// worker thread names.
    pub fn new<F>(name: &'static str, work: F, sink: S) -> Self
    where
        F: Fn(A, &Progress<'_>) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name,
            work: Arc::new(work),
            sink: Arc::new(sink),
            slot: Arc::new(Mutex::new(Slot {
                state: OperationState::Idle,
                worker: None,
                runs: 0,
            })),
        }
    }

    /// Start a run with `args` on a new worker thread.
    ///
    /// Returns `false` without doing anything if a run is already in flight.
    /// Otherwise returns `true` immediately, without waiting for the run. If the
    /// worker thread cannot be spawned the sink receives
    /// [`OperationError::Spawn`] on the calling thread and the state is `Failed`.
    pub fn start(&self, args: A) -> bool {
        let mut slot = lock(&self.slot);

        if slot.state == OperationState::Running {
            warn!("[{}] Already running, start rejected", self.name);
            return false;
        }

        // The previous worker has published its final state and is at most
        // delivering its outcome, so its events stay ahead of this run's.
        if let Some(previous) = slot.worker.take() {
            if previous.join().is_err() {
                warn!("[{}] Worker panicked while reporting its outcome", self.name);
            }
        }

        slot.runs += 1;
        slot.state = OperationState::Running;
        let context = Context {
            operation: self.name,
            run: slot.runs,
        };

        let worker = {
            let work = Arc::clone(&self.work);
            let sink = Arc::clone(&self.sink);
            let slot = Arc::clone(&self.slot);

            thread::Builder::new()
                .name(format!("{}-{}", self.name, context.run))
                .spawn(move || run(context, work.as_ref(), sink.as_ref(), &slot, args))
        };

        match worker {
            Ok(worker) => {
                debug!("{context}Running");
                slot.worker = Some(worker);
            }
            Err(error) => {
                error!("{context}Could not spawn worker: {error}");
                slot.state = OperationState::Failed;
                drop(slot);

                self.sink.on_error(OperationError::Spawn(error));
            }
        }

        true
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        self.state() == OperationState::Running
    }

    /// The current state.
    pub fn state(&self) -> OperationState {
        lock(&self.slot).state
    }

    /// Block until the current run, if any, has finished.
    pub fn join(&self) {
        let worker = lock(&self.slot).worker.take();

        if let Some(worker) = worker {
            if worker.join().is_err() {
                warn!("[{}] Worker panicked while reporting its outcome", self.name);
            }
        }
    }

    /// The operation's name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn run<A, T, E, S>(context: Context, work: &Work<A, T, E>, sink: &S, slot: &Mutex<Slot>, args: A)
where
    E: Display,
    S: OperationSink<T, E>,
{
    let progress = Progress::new(sink);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        sink.on_progress(0.1, "starting");
        work(args, &progress)
    }));

    // Published before the terminal callback: an owner may restart on receipt.
    let state = match &result {
        Ok(Ok(_)) => OperationState::Completed,
        Ok(Err(_)) | Err(_) => OperationState::Failed,
    };
    lock(slot).state = state;

    match result {
        Ok(Ok(output)) => {
            debug!("{context}Completed");
            sink.on_progress(1.0, "complete");
            sink.on_success(output);
        }
        Ok(Err(error)) => {
            error!("{context}Failed: {error}");
            sink.on_error(OperationError::Failed(error));
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{context}Panicked: {message}");
            sink.on_error(OperationError::Panicked(message));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
