use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
};

use sorted_channel::Receiver;
use tracing::{debug, error};

use crate::{executor::Slots, message::Message};

pub(crate) struct Worker {
    handle: JoinHandle<()>,
}

impl Worker {
    /// Start a named system thread that runs [`Message::Run`] jobs until it
    /// receives [`Message::Close`] or the channel disconnects. Every job
    /// hands its slot back when it returns, panicking or not, and the worker
    /// goes back to waiting as an idle worker.
    pub fn new(name: String, rx: Receiver<Message>, slots: Arc<Slots>) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || Self::serve(rx, slots))?;
        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) {
        let _ = self.handle.join();
    }

    fn serve(rx: Receiver<Message>, slots: Arc<Slots>) {
        while let Ok(Message::Run(work)) = rx.recv() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
                error!(panic = %panic_message(&*payload), "job panicked");
            }
            slots.finish();
        }
        debug!(
            thread = thread::current().name().unwrap_or_default(),
            "worker exiting"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
