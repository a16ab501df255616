//! Heap of tasks waiting for a free execution slot.
//!
//! The queue does no synchronization of its own; the pool serializes every
//! access behind its lock.

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::task::{Priority, Task};

/// Backing capacity an unbounded queue starts from.
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// A buffered task.
///
/// Items with a higher priority sort first; equal priorities sort by
/// ascending sequence, so earlier submissions drain first.
pub(crate) struct Item {
    task: Task,
    priority: Priority,
    sequence: u64,
}

impl Item {
    pub fn new(task: Task, priority: Priority, sequence: u64) -> Self {
        Self {
            task,
            priority,
            sequence,
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn into_task(self) -> Task {
        self.task
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Item {}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

pub(crate) struct PriorityQueue {
    heap: BinaryHeap<Item>,
    sequence: u64,
}

impl PriorityQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            sequence: 0,
        }
    }

    /// Hands out the tie-break number for the next buffered task.
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    /// Callers check the capacity policy before pushing.
    pub fn push(&mut self, item: Item) {
        self.heap.push(item);
    }

    pub fn pop(&mut self) -> Option<Item> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}
