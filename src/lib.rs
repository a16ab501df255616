//! A non-blocking task pool with a priority queue for overflow.
//!
//! A [`PriorityPool`] runs tasks on a fixed number of execution slots. When
//! every slot is busy, new tasks wait in a bounded priority queue instead of
//! blocking the caller. Each slot that frees up keeps pulling buffered tasks,
//! highest priority first and equal priorities in submission order, until
//! the queue is empty. When both the slots and the queue are full,
//! [`submit`](PriorityPool::submit) hands the task back in
//! [`Error::QueueOverload`].
//!
//! Priority only orders waiting tasks: running tasks are never preempted.
//!
//! # Examples
//! ```rust
//! use std::sync::mpsc::channel;
//!
//! use priopool::{Error, PriorityPool};
//!
//! // Two slots, room for four waiting tasks.
//! let pool = PriorityPool::new(2, 4).unwrap();
//!
//! let (tx, rx) = channel();
//! let priority = 10;
//! pool.submit(priority, move || {
//!     tx.send(7).unwrap();
//! })
//! .unwrap();
//! assert_eq!(rx.recv(), Ok(7));
//!
//! assert!(matches!(
//!     PriorityPool::new(0, 4),
//!     Err(Error::InvalidCapacity { capacity: 0 })
//! ));
//! ```
//!
//! Any [`Executor`] with a non-blocking `try_run` can stand in for the
//! built-in [`ThreadExecutor`] through [`PriorityPool::with_executor`].

pub mod config;
pub mod error;
pub mod executor;
pub(crate) mod message;
pub mod pool;
pub(crate) mod queue;
pub mod task;
pub(crate) mod thread;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::{Builder, QueueCapacity};
pub use error::{Error, ExecutorError, Rejected, TryRunError};
pub use executor::{Executor, ThreadExecutor};
pub use pool::PriorityPool;
pub use task::{Job, Priority, Task};
