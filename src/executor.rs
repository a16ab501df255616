//! Bounded executors: a fixed number of execution slots with a non-blocking
//! `try_run`.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
use sorted_channel::{sorted_channel, Receiver, Sender};
use tracing::{debug, warn};

use crate::{
    error::{ExecutorError, TryRunError},
    message::Message,
    task::Job,
    thread::Worker,
};

/// Thread name used when none is configured.
pub const DEFAULT_THREAD_NAME: &str = "priopool-worker";

/// A fixed number of concurrent execution slots.
///
/// `try_run` must return immediately: either the job starts on a free slot,
/// or the executor reports [`TryRunError::Overload`] and hands the job back
/// without any other side effect. It must never run the job on the calling
/// thread. No ordering or fairness is promised among accepted jobs.
pub trait Executor {
    fn try_run<J: Job>(&self, job: J) -> Result<(), TryRunError<J>>;
}

/// Slot and idle-worker accounting shared between a [`ThreadExecutor`] and
/// its workers.
pub(crate) struct Slots {
    capacity: usize,
    running: AtomicUsize,
    idle: AtomicUsize,
}

impl Slots {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            running: AtomicUsize::new(0),
            idle: AtomicUsize::new(0),
        }
    }

    /// Reserve a slot if one is free.
    pub fn try_acquire(&self) -> bool {
        self.running
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |running| {
                (running < self.capacity).then_some(running + 1)
            })
            .is_ok()
    }

    pub fn release(&self) {
        self.running.fetch_sub(1, Ordering::AcqRel);
    }

    /// Called by a worker once its job returned. The worker counts as idle
    /// before its slot frees up, so whoever takes the slot finds it.
    pub fn finish(&self) {
        self.idle.fetch_add(1, Ordering::AcqRel);
        self.release();
    }

    /// Claim one waiting worker for a freshly reserved slot.
    pub fn try_claim_idle(&self) -> bool {
        self.idle
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |idle| idle.checked_sub(1))
            .is_ok()
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    pub fn idle(&self) -> usize {
        self.idle.load(Ordering::Acquire)
    }
}

struct Workers {
    rx: Receiver<Message>,
    threads: Vec<Worker>,
}

/// An [`Executor`] running each slot on an OS thread.
///
/// Threads start on demand: a reserved slot reuses an idle worker when there
/// is one and spawns a new worker otherwise, so an executor never runs more
/// threads than slots it has had busy at once. A slot is released once its
/// job returns. Panicking jobs are contained and logged; the worker thread
/// and its slot survive.
pub struct ThreadExecutor {
    slots: Arc<Slots>,
    closed: AtomicBool,
    name: String,
    tx: Sender<Message>,
    workers: Mutex<Workers>,
}

impl ThreadExecutor {
    pub fn new(capacity: usize) -> Self {
        Self::with_name(capacity, DEFAULT_THREAD_NAME)
    }

    /// Executor with `capacity` slots whose worker threads are named
    /// `{name}-{index}`. No thread is started until the first job.
    pub fn with_name(capacity: usize, name: &str) -> Self {
        let (tx, rx) = sorted_channel();
        Self {
            slots: Arc::new(Slots::new(capacity)),
            closed: AtomicBool::new(false),
            name: name.to_string(),
            tx,
            workers: Mutex::new(Workers {
                rx,
                threads: Vec::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity
    }

    /// Number of slots currently reserved by running jobs.
    pub fn running(&self) -> usize {
        self.slots.running()
    }

    /// Worker threads that have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.workers
            .lock()
            .threads
            .iter()
            .filter(|worker| !worker.is_finished())
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Refuse new jobs and tell every worker to exit once the jobs already
    /// handed to it are done. Closing twice is a no-op.
    pub fn close(&self) {
        let workers = self.workers.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(
            capacity = self.capacity(),
            workers = workers.threads.len(),
            idle = self.slots.idle(),
            "closing executor"
        );
        workers.threads.iter().for_each(|_| {
            let _ = self.tx.send(Message::Close);
        });
    }

    /// Close the executor and wait for all worker threads to exit.
    pub fn join(&self) {
        self.close();
        let threads = std::mem::take(&mut self.workers.lock().threads);
        threads.into_iter().for_each(Worker::join);
    }

    /// Start one more worker. Runs under the workers lock so that a worker
    /// is never added after [`close`](Self::close) counted them.
    fn spawn_worker(&self) -> Result<(), ExecutorError> {
        let mut workers = self.workers.lock();
        if self.is_closed() {
            return Err(ExecutorError::Closed);
        }
        let name = format!("{}-{}", self.name, workers.threads.len());
        let worker = Worker::new(name, workers.rx.clone(), Arc::clone(&self.slots))
            .map_err(ExecutorError::Spawn)?;
        workers.threads.push(worker);
        Ok(())
    }
}

impl Executor for ThreadExecutor {
    fn try_run<J: Job>(&self, job: J) -> Result<(), TryRunError<J>> {
        if self.is_closed() {
            return Err(TryRunError::Failed(ExecutorError::Closed));
        }
        if !self.slots.try_acquire() {
            return Err(TryRunError::Overload(job));
        }

        if !self.slots.try_claim_idle() {
            if let Err(err) = self.spawn_worker() {
                self.slots.release();
                warn!(error = %err, label = err.as_label(), "could not start a worker");
                return Err(TryRunError::Failed(err));
            }
        }

        if self.tx.send(Message::Run(Box::new(move || job.run()))).is_err() {
            self.slots.release();
            warn!("worker channel disconnected");
            return Err(TryRunError::Failed(ExecutorError::Closed));
        }
        Ok(())
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.close();
    }
}
