//! Pool configuration: the queue capacity policy and the [`Builder`].

use std::{num::NonZeroUsize, thread};

use crate::{
    error::Error,
    executor::{ThreadExecutor, DEFAULT_THREAD_NAME},
    pool::PriorityPool,
    queue::DEFAULT_QUEUE_CAPACITY,
};

/// Largest backing allocation made up front for a bounded queue. Bigger
/// bounds grow on demand.
const MAX_PREALLOCATED: usize = 4096;

/// How many tasks may wait for a free execution slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueCapacity {
    /// No buffering: every overload is rejected at once.
    Disabled,
    /// At most this many tasks are buffered. `Bounded(0)` behaves like
    /// [`QueueCapacity::Disabled`].
    Bounded(usize),
    /// Buffer everything.
    Unbounded,
}

impl QueueCapacity {
    /// Interpret a raw signed capacity: `0` disables the queue, a positive
    /// value bounds it, a negative value lifts the limit.
    ///
    /// ```
    /// use priopool::QueueCapacity;
    ///
    /// assert_eq!(QueueCapacity::from_raw(0), QueueCapacity::Disabled);
    /// assert_eq!(QueueCapacity::from_raw(4), QueueCapacity::Bounded(4));
    /// assert_eq!(QueueCapacity::from_raw(-1), QueueCapacity::Unbounded);
    /// ```
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Disabled,
            n if n > 0 => Self::Bounded(usize::try_from(n).unwrap_or(usize::MAX)),
            _ => Self::Unbounded,
        }
    }

    /// Whether a queue currently holding `len` tasks may take one more.
    pub fn admits(self, len: usize) -> bool {
        match self {
            Self::Disabled => false,
            Self::Bounded(limit) => len < limit,
            Self::Unbounded => true,
        }
    }

    pub(crate) fn initial_backing(self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::Bounded(limit) => limit.min(MAX_PREALLOCATED),
            Self::Unbounded => DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Default for QueueCapacity {
    fn default() -> Self {
        Self::Bounded(1024)
    }
}

/// Builds a [`PriorityPool`] running on a [`ThreadExecutor`].
///
/// # Examples
/// ```
/// use priopool::{Builder, QueueCapacity};
///
/// let pool = Builder::new()
///     .executor_capacity(2)
///     .queue_capacity(QueueCapacity::Bounded(16))
///     .thread_name("indexer")
///     .build()
///     .unwrap();
///
/// pool.submit(10, || println!("hello from the pool")).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    executor_capacity: usize,
    queue_capacity: QueueCapacity,
    thread_name: String,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            executor_capacity: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            queue_capacity: QueueCapacity::default(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that may run at the same time. Must be positive.
    pub fn executor_capacity(mut self, capacity: usize) -> Self {
        self.executor_capacity = capacity;
        self
    }

    pub fn queue_capacity(mut self, capacity: QueueCapacity) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Prefix of the worker thread names.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn build(self) -> Result<PriorityPool, Error> {
        if self.executor_capacity == 0 {
            return Err(Error::InvalidCapacity { capacity: 0 });
        }
        let executor = ThreadExecutor::with_name(self.executor_capacity, &self.thread_name);
        Ok(PriorityPool::with_executor(executor, self.queue_capacity))
    }
}
