mod inline_work_queue;
mod thread_work_queue;
#[cfg(feature = "tokio_support")]
mod tokio_work_queue;

pub use inline_work_queue::InlineWorkQueue;
pub use thread_work_queue::ThreadWorkQueue;
#[cfg(feature = "tokio_support")]
pub use tokio_work_queue::TokioWorkQueue;

/// A unit of deferred work, e.g. draining the next queued message of a call.
pub type WorkItem = Box<dyn FnOnce() + Send + 'static>;

/// Executes continuations away from the engine's event-delivery context.
pub trait WorkQueue: Send + Sync {
    fn dispatch(&self, work: WorkItem);
}
