mod call_handle;
mod completion_event;
mod completion_queue_engine;
mod completion_queue_struct;

pub use call_handle::CallHandle;
pub use completion_event::CompletionEvent;
pub use completion_queue_engine::CompletionQueueEngine;
pub use completion_queue_struct::CompletionQueue;
