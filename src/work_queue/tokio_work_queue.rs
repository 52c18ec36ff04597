use super::{WorkItem, WorkQueue};
use tokio::runtime::{Handle, TryCurrentError};

/// Dispatches work as tasks on a Tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioWorkQueue {
    handle: Handle,
}

impl TokioWorkQueue {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Binds to the runtime the caller is currently running in.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl WorkQueue for TokioWorkQueue {
    fn dispatch(&self, work: WorkItem) {
        self.handle.spawn(async move { work() });
    }
}
