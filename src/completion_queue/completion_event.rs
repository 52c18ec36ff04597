use crate::operation::{BatchResults, OperationTag};

/// An event pulled from the engine's completion queue.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    /// The batch submitted under `tag` finished. `success` is false when any
    /// operation in it failed (e.g. the peer reset the stream).
    OperationComplete {
        tag: OperationTag,
        success: bool,
        results: BatchResults,
    },
    /// No event arrived before the engine's poll deadline.
    QueueTimeout,
    /// The queue has been shut down and drained; no further events follow.
    QueueShutdown,
}
