use super::{BatchResults, Operation, OperationKind, OperationTag};
use crate::{
    call::Call, completion_queue::CallHandle, message_buffer::MessageBuffer, metadata::Metadata,
};
use std::fmt;
use std::sync::Arc;

/// Continuation run once the engine reports a batch as finished.
pub type OperationCompletion = Box<dyn FnOnce(&OperationGroup) + Send + 'static>;

/// One atomic batch of operations against a single call.
///
/// The group is created per batch, handed to the `CompletionQueue` before
/// submission and dropped after its continuation runs. It holds a clone of
/// its owning `Call`, so the native handle cannot be released while the batch
/// is pending.
///
/// Received fields are unset until `complete` is called, and only report
/// values for receive operations the batch actually contained.
pub struct OperationGroup {
    call: Call,
    tag: OperationTag,
    operations: Arc<[Operation]>,
    completion: Option<OperationCompletion>,
    success: bool,
    results: Option<BatchResults>,
}

impl OperationGroup {
    pub fn new<F>(call: &Call, operations: Vec<Operation>, completion: F) -> Self
    where
        F: FnOnce(&OperationGroup) + Send + 'static,
    {
        Self {
            call: call.clone(),
            tag: OperationTag::next(),
            operations: operations.into(),
            completion: Some(Box::new(completion)),
            success: false,
            results: None,
        }
    }

    pub fn tag(&self) -> OperationTag {
        self.tag
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn call_handle(&self) -> CallHandle {
        self.call.handle()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn shared_operations(&self) -> Arc<[Operation]> {
        Arc::clone(&self.operations)
    }

    pub fn contains(&self, kind: OperationKind) -> bool {
        self.operations.iter().any(|op| op.kind() == kind)
    }

    /// True once the engine reported the batch as successfully finished.
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn is_complete(&self) -> bool {
        self.results.is_some()
    }

    pub fn received_status_code(&self) -> Option<i32> {
        self.decoded(OperationKind::ReceiveStatusOnClient)
            .and_then(|r| r.status_code)
    }

    pub fn received_status_message(&self) -> Option<&str> {
        self.decoded(OperationKind::ReceiveStatusOnClient)
            .and_then(|r| r.status_message.as_deref())
    }

    pub fn received_trailing_metadata(&self) -> Option<&Metadata> {
        self.decoded(OperationKind::ReceiveStatusOnClient)
            .and_then(|r| r.trailing_metadata.as_ref())
    }

    pub fn received_initial_metadata(&self) -> Option<&Metadata> {
        self.decoded(OperationKind::ReceiveInitialMetadata)
            .and_then(|r| r.initial_metadata.as_ref())
    }

    /// `None` after a successful receive means the peer ended the stream.
    pub fn received_message(&self) -> Option<&MessageBuffer> {
        self.decoded(OperationKind::ReceiveMessage)
            .and_then(|r| r.message.as_ref())
    }

    fn decoded(&self, kind: OperationKind) -> Option<&BatchResults> {
        if self.contains(kind) {
            self.results.as_ref()
        } else {
            None
        }
    }

    /// Records the engine's outcome and runs the continuation. Consumes the
    /// group, so the continuation can only ever run once.
    pub(crate) fn complete(mut self, success: bool, results: BatchResults) {
        self.success = success;
        self.results = Some(results);

        if let Some(completion) = self.completion.take() {
            completion(&self);
        }
    }
}

impl fmt::Debug for OperationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGroup")
            .field("call", &self.call.handle())
            .field("tag", &self.tag)
            .field("operations", &self.operations)
            .field("success", &self.success)
            .field("results", &self.results)
            .finish()
    }
}
