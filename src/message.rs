use core::fmt;
use std::cmp::Ordering;

/// Type-erased job handed to a worker thread.
pub(crate) type Work = Box<dyn FnOnce() + Send + 'static>;

pub(crate) enum Message {
    Run(Work),
    Close,
}

impl Message {
    /// Pending work outranks a close request in the channel.
    fn rank(&self) -> u8 {
        match self {
            Message::Run(_) => 1,
            Message::Close => 0,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Message::Run(_) => "Run",
            Message::Close => "Close",
        })
    }
}

// Work carries no priority of its own: the executor gives no ordering
// guarantee among the jobs it has accepted, so all runs compare equal.
impl Ord for Message {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Message {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Message {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ranks_above_close() {
        let run = Message::Run(Box::new(|| {}));
        assert!(run > Message::Close);
        assert_eq!(Message::Close, Message::Close);
        assert_eq!(run, Message::Run(Box::new(|| {})));
        assert_eq!(format!("{run:?}"), "Run");
    }
}
