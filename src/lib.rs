pub mod call;
pub mod completion_queue;
pub mod constants;
pub mod message_buffer;
pub mod metadata;
pub mod operation;
pub mod utils;
pub mod work_queue;

pub use call::{Call, CallConfig, CallError, CallResult, SendFailure};
pub use completion_queue::{CallHandle, CompletionEvent, CompletionQueue, CompletionQueueEngine};
pub use message_buffer::MessageBuffer;
pub use metadata::Metadata;
pub use operation::{BatchResults, Operation, OperationGroup, OperationKind, OperationTag};
