use super::CallError;
use crate::message_buffer::MessageBuffer;

/// Report of a streaming send that could not be completed.
///
/// Once a send fails the call's pending queue is drained and its write state
/// reset, so `undelivered` lists the failed message (when it was accepted by
/// `send_message`) followed by every message that was queued behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SendFailure {
    /// Set when the engine rejected the submission of a queued message;
    /// `None` when the send batch ran but did not succeed.
    pub error: Option<CallError>,
    pub undelivered: Vec<MessageBuffer>,
}

pub trait SendFailureHandler: Fn(SendFailure) + Send + Sync {}
impl<T: Fn(SendFailure) + Send + Sync> SendFailureHandler for T {}
