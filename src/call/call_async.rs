use super::{Call, CallError, CallResult};
use crate::{message_buffer::MessageBuffer, metadata::Metadata};
use bytes::Bytes;
use futures::channel::oneshot;

// Future-returning wrappers over the callback API. The returned futures
// resolve from whichever thread runs the completion queue's event loop.
//
// A continuation that is dropped without running (the batch failed where the
// callback API stays silent, or the queue shut down) closes the channel; that
// surfaces here as `CallError::Unknown`.
impl Call {
    pub async fn perform_async(
        &self,
        message: impl Into<MessageBuffer>,
        metadata: Metadata,
    ) -> Result<CallResult, CallError> {
        let (tx, rx) = oneshot::channel();
        self.perform(message, metadata, move |result| {
            let _ = tx.send(result);
        })?;
        rx.await.map_err(|_| CallError::Unknown)
    }

    pub async fn start_server_streaming_async(
        &self,
        message: impl Into<MessageBuffer>,
        metadata: Metadata,
    ) -> Result<CallResult, CallError> {
        let (tx, rx) = oneshot::channel();
        self.start_server_streaming(message, metadata, move |result| {
            let _ = tx.send(result);
        })?;
        rx.await.map_err(|_| CallError::Unknown)
    }

    /// Resolves to `Ok(None)` at the end of the stream.
    pub async fn receive_message_async(&self) -> Result<Option<Bytes>, CallError> {
        let (tx, rx) = oneshot::channel();
        self.receive_message(move |message| {
            let _ = tx.send(message);
        })?;
        rx.await.map_err(|_| CallError::Unknown)
    }

    pub async fn close_async(&self) -> Result<(), CallError> {
        let (tx, rx) = oneshot::channel();
        self.close(move || {
            let _ = tx.send(());
        })?;
        rx.await.map_err(|_| CallError::Unknown)
    }
}
