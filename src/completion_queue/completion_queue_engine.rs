use super::{CallHandle, CompletionEvent};
use crate::operation::{Operation, OperationTag};

/// The external engine that executes operation batches.
///
/// Implementations must be safe to share between threads. `submit_batch` is
/// always invoked under the process-wide submission lock, so it never runs
/// concurrently with itself.
pub trait CompletionQueueEngine: Send + Sync {
    /// Starts executing `operations` as one batch against `call` and returns
    /// a raw invocation code (`GRPC_CALL_OK` on acceptance).
    ///
    /// Must not block, and must not report the completion of `tag` from
    /// within this call; completions are delivered through `next_event`.
    fn submit_batch(&self, call: CallHandle, operations: &[Operation], tag: OperationTag) -> i32;

    /// Blocks until the next completion event is available.
    fn next_event(&self) -> CompletionEvent;

    /// Releases a native call previously created by the engine.
    fn destroy_call(&self, call: CallHandle);
}
