/// Default number of outbound messages a streaming call holds behind its
/// in-flight send before `send_message` starts rejecting.
pub const DEFAULT_MAXIMUM_QUEUED_MESSAGES: usize = 10;

/// Name given to the worker thread behind the shared default work queue.
pub const DEFAULT_WORK_QUEUE_THREAD_NAME: &str = "grpc-call-work";

/// Name given to the thread spawned by `CompletionQueue::spawn_event_loop`.
pub const DEFAULT_EVENT_LOOP_THREAD_NAME: &str = "grpc-call-cq";

// Raw invocation codes returned by the engine's batch submission.
// Values follow the native `grpc_call_error` enumeration.
pub const GRPC_CALL_OK: i32 = 0;
pub const GRPC_CALL_ERROR: i32 = 1;
pub const GRPC_CALL_ERROR_NOT_ON_SERVER: i32 = 2;
pub const GRPC_CALL_ERROR_NOT_ON_CLIENT: i32 = 3;
pub const GRPC_CALL_ERROR_ALREADY_ACCEPTED: i32 = 4;
pub const GRPC_CALL_ERROR_ALREADY_INVOKED: i32 = 5;
pub const GRPC_CALL_ERROR_NOT_INVOKED: i32 = 6;
pub const GRPC_CALL_ERROR_ALREADY_FINISHED: i32 = 7;
pub const GRPC_CALL_ERROR_TOO_MANY_OPERATIONS: i32 = 8;
pub const GRPC_CALL_ERROR_INVALID_FLAGS: i32 = 9;
pub const GRPC_CALL_ERROR_INVALID_METADATA: i32 = 10;
pub const GRPC_CALL_ERROR_INVALID_MESSAGE: i32 = 11;
pub const GRPC_CALL_ERROR_NOT_SERVER_COMPLETION_QUEUE: i32 = 12;
pub const GRPC_CALL_ERROR_BATCH_TOO_BIG: i32 = 13;
pub const GRPC_CALL_ERROR_PAYLOAD_TYPE_MISMATCH: i32 = 14;
