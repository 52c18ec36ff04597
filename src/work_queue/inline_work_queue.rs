use super::{WorkItem, WorkQueue};

/// Runs work immediately on the dispatching thread.
///
/// Suitable when the completion queue's event loop already runs on a thread
/// of its own, and for deterministic tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineWorkQueue;

impl WorkQueue for InlineWorkQueue {
    fn dispatch(&self, work: WorkItem) {
        work();
    }
}
