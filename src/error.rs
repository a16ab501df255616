//! Error types returned by the pool and its executor.
//!
//! - [`Error`]: everything [`PriorityPool`](crate::PriorityPool) reports to
//!   its callers.
//! - [`ExecutorError`]: failures of the bounded executor other than being
//!   overloaded.
//! - [`TryRunError`]: the signal an [`Executor`](crate::Executor) gives back
//!   from a refused `try_run`.

use core::fmt;
use std::io;

use parking_lot::Mutex;
use thiserror::Error;

use crate::task::Task;

/// # Errors produced by the priority pool.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// The pool was asked for a non-positive number of execution slots.
    #[error("executor capacity must be positive, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: i64,
    },

    /// Every execution slot is busy and the queue is full or disabled.
    ///
    /// The task was neither run nor retained; get it back with
    /// [`Error::into_task`].
    #[error("executor and priority queue are full")]
    QueueOverload(Rejected),

    /// The executor failed for a reason other than being overloaded.
    #[error("executor: {0}")]
    Executor(#[from] ExecutorError),
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use priopool::Error;
    ///
    /// let err = Error::InvalidCapacity { capacity: 0 };
    /// assert_eq!(err.as_label(), "invalid_capacity");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidCapacity { .. } => "invalid_capacity",
            Error::QueueOverload(_) => "queue_overload",
            Error::Executor(_) => "executor",
        }
    }

    /// Hands a rejected task back to the caller.
    pub fn into_task(self) -> Option<Task> {
        match self {
            Error::QueueOverload(rejected) => Some(rejected.into_task()),
            _ => None,
        }
    }
}

/// A task the pool refused, kept so the caller can take it back.
///
/// The lock only makes the error `Sync`, so it can travel inside
/// `Box<dyn std::error::Error + Send + Sync>`; it is never contended.
pub struct Rejected(Mutex<Task>);

impl Rejected {
    pub(crate) fn new(task: Task) -> Self {
        Self(Mutex::new(task))
    }

    pub fn into_task(self) -> Task {
        self.0.into_inner()
    }
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rejected")
    }
}

/// # Errors produced by a bounded executor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The executor was closed and accepts no more work.
    #[error("executor is closed")]
    Closed,

    /// A worker thread could not be started.
    #[error("spawning worker thread: {0}")]
    Spawn(#[source] io::Error),
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::Closed => "executor_closed",
            ExecutorError::Spawn(_) => "executor_spawn",
        }
    }
}

/// Why an executor refused to run a job.
pub enum TryRunError<J> {
    /// All slots are busy. The job is handed back untouched.
    Overload(J),

    /// The executor cannot run anything.
    Failed(ExecutorError),
}

impl<J> fmt::Debug for TryRunError<J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overload(_) => write!(f, "Overload"),
            Self::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_task() {
        let err = Error::QueueOverload(Rejected::new(Task::new(|| {})));
        assert_eq!(err.as_label(), "queue_overload");
        assert!(err.into_task().is_some());

        let err = Error::from(ExecutorError::Closed);
        assert_eq!(err.as_label(), "executor");
        assert!(err.into_task().is_none());
    }

    #[test]
    fn executor_labels() {
        assert_eq!(ExecutorError::Closed.as_label(), "executor_closed");
        let spawn = ExecutorError::Spawn(io::Error::other("no threads"));
        assert_eq!(spawn.as_label(), "executor_spawn");
        assert_eq!(spawn.to_string(), "spawning worker thread: no threads");
    }

    #[test]
    fn errors_cross_threads() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<ExecutorError>();

        fn boxed() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err(Error::QueueOverload(Rejected::new(Task::new(|| {}))).into())
        }
        let err = boxed().unwrap_err();
        assert_eq!(err.to_string(), "executor and priority queue are full");

        let err = err.downcast::<Error>().unwrap();
        assert!((*err).into_task().is_some());
    }

    #[test]
    fn display() {
        let err = Error::InvalidCapacity { capacity: -3 };
        assert_eq!(err.to_string(), "executor capacity must be positive, got -3");

        let err = Error::Executor(ExecutorError::Closed);
        assert_eq!(err.to_string(), "executor: executor is closed");
    }
}
