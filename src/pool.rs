use core::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    config::{Builder, QueueCapacity},
    error::{Error, Rejected, TryRunError},
    executor::{Executor, ThreadExecutor},
    queue::{Item, PriorityQueue},
    task::{Job, Priority, Task},
};

/// A bounded executor with a priority queue for overflow.
///
/// Tasks run directly while the executor has a free slot. When every slot is
/// busy they wait in the queue, and whichever slot frees up first pulls them
/// out by priority (highest first, ties in submission order) before it is
/// handed back to the executor.
pub struct PriorityPool<E = ThreadExecutor> {
    executor: E,
    queue: Arc<Mutex<PriorityQueue>>,
    capacity: QueueCapacity,
}

impl PriorityPool {
    /// Create a pool with `executor_capacity` execution slots. Worker threads
    /// start as slots are first used.
    ///
    /// `queue_capacity` is read by [`QueueCapacity::from_raw`]: zero disables
    /// buffering and a negative value removes the limit.
    ///
    /// # Errors
    /// [`Error::InvalidCapacity`] if `executor_capacity` is not positive.
    pub fn new(executor_capacity: i64, queue_capacity: i64) -> Result<Self, Error> {
        let slots = usize::try_from(executor_capacity)
            .ok()
            .filter(|slots| *slots > 0)
            .ok_or(Error::InvalidCapacity {
                capacity: executor_capacity,
            })?;

        Builder::new()
            .executor_capacity(slots)
            .queue_capacity(QueueCapacity::from_raw(queue_capacity))
            .build()
    }

    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl PriorityPool<ThreadExecutor> {
    /// Stop accepting work. Running tasks finish and drain what is already
    /// buffered; every later [`submit`](Self::submit) fails with
    /// [`Error::Executor`].
    pub fn shutdown(&self) {
        self.executor.close();
    }
}

impl<E: Executor> PriorityPool<E> {
    pub fn with_executor(executor: E, capacity: QueueCapacity) -> Self {
        debug!(queue_capacity = ?capacity, "priority pool created");
        Self {
            executor,
            queue: Arc::new(Mutex::new(PriorityQueue::with_capacity(
                capacity.initial_backing(),
            ))),
            capacity,
        }
    }

    /// Submit a closure. See [`submit_task`](Self::submit_task).
    pub fn submit<F>(&self, priority: Priority, f: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_task(priority, Task::new(f))
    }

    /// Run `task` on a free slot, or buffer it when every slot is busy.
    ///
    /// Never blocks. `Ok(())` means the task is running or queued; nothing
    /// more is reported about it afterwards.
    ///
    /// A task that panics ends the drain it runs in. Whatever is still
    /// buffered at that point waits for the next task that gets a slot
    /// directly, which drains it as usual.
    ///
    /// # Errors
    /// - [`Error::QueueOverload`] when the slots are busy and the queue is
    ///   full or disabled. The task comes back inside the error.
    /// - [`Error::Executor`] when the executor fails for any other reason.
    pub fn submit_task(&self, priority: Priority, task: Task) -> Result<(), Error> {
        // Held for the whole decision so that concurrent submitters cannot
        // both see room in the queue and overrun the bound.
        let mut queue = self.queue.lock();

        let drain = Drain {
            task,
            queue: Arc::clone(&self.queue),
        };

        match self.executor.try_run(drain) {
            Ok(()) => {
                trace!(priority, "task dispatched");
                Ok(())
            }
            Err(TryRunError::Overload(Drain { task, .. })) => {
                if !self.capacity.admits(queue.len()) {
                    debug!(
                        priority,
                        queued = queue.len(),
                        "executor and queue full, rejecting task"
                    );
                    return Err(Error::QueueOverload(Rejected::new(task)));
                }

                let sequence = queue.next_sequence();
                queue.push(Item::new(task, priority, sequence));
                debug!(
                    priority,
                    sequence,
                    queued = queue.len(),
                    "executor full, task buffered"
                );
                Ok(())
            }
            Err(TryRunError::Failed(err)) => {
                warn!(priority, error = %err, label = err.as_label(), "executor refused task");
                Err(err.into())
            }
        }
    }

    /// Number of buffered tasks.
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<E> PriorityPool<E> {
    pub fn queue_capacity(&self) -> QueueCapacity {
        self.capacity
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E> fmt::Debug for PriorityPool<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityPool")
            .field("queue_capacity", &self.capacity)
            .field("queued", &self.queue.lock().len())
            .finish_non_exhaustive()
    }
}

/// Runs a task, then keeps its slot to empty the queue.
///
/// The lock is taken only to pop; it is never held while a task runs, so a
/// task may submit to its own pool.
struct Drain {
    task: Task,
    queue: Arc<Mutex<PriorityQueue>>,
}

impl Job for Drain {
    fn run(self) {
        let Drain { task, queue } = self;
        task.run();

        loop {
            let next = queue.lock().pop();
            let Some(item) = next else {
                break;
            };
            trace!(
                priority = item.priority(),
                sequence = item.sequence(),
                "running buffered task"
            );
            item.into_task().run();
        }
    }
}
