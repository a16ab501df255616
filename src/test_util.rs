use parking_lot::{Condvar, Mutex};

/// Holds jobs on their slots until the test opens it.
#[derive(Default)]
pub(crate) struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
    }

    pub fn open(&self) {
        *self.open.lock() = true;
        self.cv.notify_all();
    }
}
