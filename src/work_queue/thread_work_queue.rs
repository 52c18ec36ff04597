use super::{InlineWorkQueue, WorkItem, WorkQueue};
use crate::constants::DEFAULT_WORK_QUEUE_THREAD_NAME;
use once_cell::sync::Lazy;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

static SHARED_WORK_QUEUE: Lazy<Arc<dyn WorkQueue>> = Lazy::new(|| {
    match ThreadWorkQueue::spawn(DEFAULT_WORK_QUEUE_THREAD_NAME) {
        Ok(queue) => Arc::new(queue) as Arc<dyn WorkQueue>,
        Err(err) => {
            tracing::error!(
                error = %err,
                "failed to spawn shared work queue thread; running work inline"
            );
            Arc::new(InlineWorkQueue)
        }
    }
});

/// Serial work queue backed by one worker thread. Items run in dispatch
/// order. The worker exits once the queue is dropped and drained.
pub struct ThreadWorkQueue {
    sender: Sender<WorkItem>,
}

impl ThreadWorkQueue {
    pub fn spawn(name: &str) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<WorkItem>();

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(work) = receiver.recv() {
                    work();
                }
            })?;

        Ok(Self { sender })
    }

    /// Process-wide queue used by calls that are not configured with one.
    pub fn shared() -> Arc<dyn WorkQueue> {
        Arc::clone(&SHARED_WORK_QUEUE)
    }
}

impl WorkQueue for ThreadWorkQueue {
    fn dispatch(&self, work: WorkItem) {
        if let Err(mpsc::SendError(work)) = self.sender.send(work) {
            // Worker is gone (it panicked); keep the call moving.
            tracing::warn!("work queue worker has exited; running work inline");
            work();
        }
    }
}
