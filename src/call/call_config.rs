use crate::constants::DEFAULT_MAXIMUM_QUEUED_MESSAGES;
use crate::work_queue::{ThreadWorkQueue, WorkQueue};
use std::fmt;
use std::sync::Arc;

/// Per-call settings fixed at construction.
#[derive(Clone)]
pub struct CallConfig {
    /// Upper bound on messages waiting behind an in-flight send.
    pub maximum_queued_messages: usize,
    /// Where send continuations run. `None` selects `ThreadWorkQueue::shared()`.
    pub work_queue: Option<Arc<dyn WorkQueue>>,
}

impl CallConfig {
    pub fn with_maximum_queued_messages(mut self, maximum: usize) -> Self {
        self.maximum_queued_messages = maximum;
        self
    }

    pub fn with_work_queue(mut self, work_queue: Arc<dyn WorkQueue>) -> Self {
        self.work_queue = Some(work_queue);
        self
    }

    pub(crate) fn resolve_work_queue(&self) -> Arc<dyn WorkQueue> {
        self.work_queue.clone().unwrap_or_else(ThreadWorkQueue::shared)
    }
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            maximum_queued_messages: DEFAULT_MAXIMUM_QUEUED_MESSAGES,
            work_queue: None,
        }
    }
}

impl fmt::Debug for CallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallConfig")
            .field("maximum_queued_messages", &self.maximum_queued_messages)
            .field("custom_work_queue", &self.work_queue.is_some())
            .finish()
    }
}
