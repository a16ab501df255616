//! A Task is the opaque unit of work that runs on the pool.

use core::fmt;

/// Ranking of a buffered task. Higher values drain first.
pub type Priority = u32;

/// Something an [`Executor`](crate::executor::Executor) can run on one of its
/// slots.
pub trait Job: Send + 'static {
    fn run(self);
}

/// A zero-argument, no-return unit of work.
///
/// The pool never looks inside a task: it does not observe its duration,
/// its errors or its panics.
pub struct Task {
    f: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { f: Box::new(f) }
    }

    pub fn run(self) {
        (self.f)();
    }
}

impl Job for Task {
    fn run(self) {
        Task::run(self);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task")
    }
}
