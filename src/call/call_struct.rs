use super::{CallConfig, CallError, CallResult, SendFailure, SendFailureHandler};
use crate::completion_queue::{CallHandle, CompletionQueue};
use crate::message_buffer::MessageBuffer;
use crate::metadata::Metadata;
use crate::operation::{Operation, OperationGroup};
use crate::work_queue::WorkQueue;
use bytes::Bytes;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Serializes batch submission across every call in the process. The native
/// submission entry point is not safe to invoke concurrently, even for
/// unrelated calls.
static CALL_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// One RPC exchange over a native call handle.
///
/// `Call` is a cheap, cloneable reference. Every pending `OperationGroup`
/// holds a clone, so an owned handle is only released (via the engine's
/// `destroy_call`) after the last batch referencing it has completed and
/// the last user clone has been dropped.
///
/// All methods return immediately; results are pushed to the supplied
/// callbacks from the completion queue's event loop.
#[derive(Clone)]
pub struct Call {
    inner: Arc<CallInner>,
}

struct CallInner {
    handle: CallHandle,
    owned: bool,
    completion_queue: Arc<CompletionQueue>,
    work_queue: Arc<dyn WorkQueue>,
    config: CallConfig,
    send_state: Mutex<SendState>,
    send_failure_handler: Mutex<Option<Arc<dyn SendFailureHandler>>>,
}

/// `pending_messages` is only non-empty while `writing` is set.
#[derive(Default)]
struct SendState {
    pending_messages: VecDeque<MessageBuffer>,
    writing: bool,
}

impl Call {
    /// Wraps `handle`. When `owned` is true the handle is destroyed through
    /// the engine once the call is no longer referenced.
    pub fn new(handle: CallHandle, owned: bool, completion_queue: Arc<CompletionQueue>) -> Self {
        Self::with_config(handle, owned, completion_queue, CallConfig::default())
    }

    pub fn with_config(
        handle: CallHandle,
        owned: bool,
        completion_queue: Arc<CompletionQueue>,
        config: CallConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CallInner {
                handle,
                owned,
                completion_queue,
                work_queue: config.resolve_work_queue(),
                config,
                send_state: Mutex::new(SendState::default()),
                send_failure_handler: Mutex::new(None),
            }),
        }
    }

    pub fn handle(&self) -> CallHandle {
        self.inner.handle
    }

    pub fn is_owned(&self) -> bool {
        self.inner.owned
    }

    pub fn config(&self) -> &CallConfig {
        &self.inner.config
    }

    pub fn completion_queue(&self) -> &Arc<CompletionQueue> {
        &self.inner.completion_queue
    }

    /// True while a send-message batch is in flight.
    pub fn is_writing(&self) -> bool {
        self.inner.send_state().writing
    }

    pub fn pending_message_count(&self) -> usize {
        self.inner.send_state().pending_messages.len()
    }

    /// Installs the callback told about messages abandoned by a failed send.
    pub fn set_send_failure_handler<H>(&self, handler: H)
    where
        H: SendFailureHandler + 'static,
    {
        *self
            .inner
            .send_failure_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Registers `group` with the completion queue and submits its batch.
    ///
    /// Registration happens first so a completion can never arrive for an
    /// unknown tag. If the engine rejects the batch the registration is
    /// withdrawn and the group's continuation is dropped without running,
    /// even when the completion queue shuts down mid-submission.
    pub fn perform_batch(&self, group: OperationGroup) -> Result<(), CallError> {
        let tag = group.tag();
        let operations = group.shared_operations();
        let completion_queue = &self.inner.completion_queue;

        completion_queue.begin_submission(group);

        let code = {
            let _guard = CALL_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
            completion_queue
                .engine()
                .submit_batch(self.inner.handle, &operations, tag)
        };

        let checked = CallError::check(code);
        completion_queue.end_submission(tag, checked.is_ok());

        if let Err(error) = checked {
            tracing::warn!(call = %self.inner.handle, %tag, %error, "batch submission rejected");
            return Err(error);
        }

        tracing::debug!(
            call = %self.inner.handle,
            %tag,
            operations = operations.len(),
            "batch submitted"
        );

        Ok(())
    }

    /// Performs a one-shot RPC: the request, its metadata and the half-close
    /// go out in the same batch that waits for the response, its metadata and
    /// the final status.
    ///
    /// `completion` runs exactly once if submission succeeds. A failed batch
    /// yields `CallResult::default()`.
    pub fn perform<F>(
        &self,
        message: impl Into<MessageBuffer>,
        metadata: Metadata,
        completion: F,
    ) -> Result<(), CallError>
    where
        F: FnOnce(CallResult) + Send + 'static,
    {
        let operations = vec![
            Operation::SendInitialMetadata(metadata),
            Operation::SendMessage(message.into()),
            Operation::SendCloseFromClient,
            Operation::ReceiveInitialMetadata,
            Operation::ReceiveStatusOnClient,
            Operation::ReceiveMessage,
        ];

        let group = OperationGroup::new(self, operations, move |group| {
            completion(CallResult::from_operation_group(group))
        });

        self.perform_batch(group)
    }

    /// Starts a server-streaming RPC. The completion only carries the
    /// response's initial metadata; messages are read with
    /// `receive_message`.
    pub fn start_server_streaming<F>(
        &self,
        message: impl Into<MessageBuffer>,
        metadata: Metadata,
        completion: F,
    ) -> Result<(), CallError>
    where
        F: FnOnce(CallResult) + Send + 'static,
    {
        let operations = vec![
            Operation::SendInitialMetadata(metadata),
            Operation::SendMessage(message.into()),
            Operation::SendCloseFromClient,
            Operation::ReceiveInitialMetadata,
        ];

        let group = OperationGroup::new(self, operations, move |group| {
            completion(CallResult::from_operation_group(group))
        });

        self.perform_batch(group)
    }

    /// Starts a bidirectional stream, logging the peer's initial metadata and
    /// final status.
    pub fn start(&self, metadata: Metadata) -> Result<(), CallError> {
        let handle = self.inner.handle;

        self.start_with(
            metadata,
            move |initial_metadata: Option<Metadata>| {
                if let Some(initial_metadata) = initial_metadata {
                    for (key, value) in initial_metadata.iter() {
                        tracing::info!(call = %handle, key, value, "received initial metadata");
                    }
                }
            },
            move |status| {
                tracing::info!(
                    call = %handle,
                    status_code = status.status_code,
                    status_message = ?status.status_message,
                    "received status"
                );
            },
        )
    }

    /// Starts a bidirectional stream: sends initial metadata, then waits for
    /// the peer's initial metadata and for the final status.
    ///
    /// The three batches are submitted back to back. Each holds a distinct
    /// operation kind, which the engine accepts concurrently on one call, and
    /// the submission lock keeps them in this order.
    /// `on_initial_metadata` receives `None` and `on_status` the default
    /// result if their batch fails.
    pub fn start_with<M, S>(
        &self,
        metadata: Metadata,
        on_initial_metadata: M,
        on_status: S,
    ) -> Result<(), CallError>
    where
        M: FnOnce(Option<Metadata>) + Send + 'static,
        S: FnOnce(CallResult) + Send + 'static,
    {
        self.perform_batch(OperationGroup::new(
            self,
            vec![Operation::SendInitialMetadata(metadata)],
            |group| {
                if !group.success() {
                    tracing::warn!(call = %group.call_handle(), "sending initial metadata failed");
                }
            },
        ))?;

        self.perform_batch(OperationGroup::new(
            self,
            vec![Operation::ReceiveInitialMetadata],
            move |group| {
                let initial_metadata = if group.success() {
                    group.received_initial_metadata().cloned()
                } else {
                    None
                };
                on_initial_metadata(initial_metadata)
            },
        ))?;

        self.perform_batch(OperationGroup::new(
            self,
            vec![Operation::ReceiveStatusOnClient],
            move |group| on_status(CallResult::from_operation_group(group)),
        ))
    }

    /// Queues `data` for transmission on a streaming call.
    ///
    /// Returns `false` when the message is rejected: either the pending
    /// queue is full (nothing is changed) or the engine refused an
    /// immediate send. See `try_send_message` to tell the two apart.
    pub fn send_message(&self, data: impl Into<MessageBuffer>) -> bool {
        match self.try_send_message(data) {
            Ok(accepted) => accepted,
            Err(error) => {
                tracing::warn!(
                    call = %self.inner.handle,
                    %error,
                    "send_message rejected by engine"
                );
                false
            }
        }
    }

    /// Like `send_message`, but surfaces an engine rejection of an immediate
    /// send as `Err`. `Ok(false)` means the pending queue is full.
    ///
    /// At most one send-message batch is ever in flight per call; messages
    /// sent while it is outstanding are queued and transmitted in call order.
    pub fn try_send_message(&self, data: impl Into<MessageBuffer>) -> Result<bool, CallError> {
        let message = data.into();

        {
            let mut state = self.inner.send_state();

            if state.writing {
                if state.pending_messages.len() >= self.inner.config.maximum_queued_messages {
                    tracing::trace!(call = %self.inner.handle, "pending message queue full");
                    return Ok(false);
                }

                state.pending_messages.push_back(message);
                tracing::trace!(
                    call = %self.inner.handle,
                    pending = state.pending_messages.len(),
                    "message queued"
                );
                return Ok(true);
            }

            state.writing = true;
        }

        if let Err(error) = self.send_without_blocking(message) {
            // The rejected message goes back to the caller; anything queued
            // behind it in the meantime is reported as undelivered.
            self.fail_pending_sends(Some(error), None);
            return Err(error);
        }

        Ok(true)
    }

    fn send_without_blocking(&self, message: MessageBuffer) -> Result<(), CallError> {
        let retained = message.clone();

        let group = OperationGroup::new(
            self,
            vec![Operation::SendMessage(message)],
            move |group| {
                let call = group.call().clone();

                if group.success() {
                    let work_queue = Arc::clone(&call.inner.work_queue);
                    work_queue.dispatch(Box::new(move || call.send_next_pending()));
                } else {
                    call.fail_pending_sends(None, Some(retained));
                }
            },
        );

        self.perform_batch(group)
    }

    /// One drain step, run on the work queue after a send completes.
    fn send_next_pending(&self) {
        let next = {
            let mut state = self.inner.send_state();

            match state.pending_messages.pop_front() {
                Some(next) => next,
                None => {
                    state.writing = false;
                    return;
                }
            }
        };

        if let Err(error) = self.send_without_blocking(next.clone()) {
            self.fail_pending_sends(Some(error), Some(next));
        }
    }

    fn fail_pending_sends(&self, error: Option<CallError>, failed: Option<MessageBuffer>) {
        let mut undelivered: Vec<MessageBuffer> = failed.into_iter().collect();

        {
            let mut state = self.inner.send_state();
            undelivered.extend(state.pending_messages.drain(..));
            state.writing = false;
        }

        if undelivered.is_empty() {
            return;
        }

        tracing::warn!(
            call = %self.inner.handle,
            error = ?error,
            undelivered = undelivered.len(),
            "streaming send failed; pending messages abandoned"
        );

        let handler = self
            .inner
            .send_failure_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(handler) = handler {
            (*handler)(SendFailure { error, undelivered });
        }
    }

    /// Reads the next message of a stream. `callback` receives `None` when
    /// the peer has ended the stream; it is not invoked if the batch fails.
    pub fn receive_message<F>(&self, callback: F) -> Result<(), CallError>
    where
        F: FnOnce(Option<Bytes>) + Send + 'static,
    {
        let group = OperationGroup::new(self, vec![Operation::ReceiveMessage], move |group| {
            if group.success() {
                callback(group.received_message().map(MessageBuffer::data));
            } else {
                tracing::debug!(call = %group.call_handle(), "receive message failed");
            }
        });

        self.perform_batch(group)
    }

    /// Half-closes the call. `completion` only runs if the close succeeds.
    pub fn close<F>(&self, completion: F) -> Result<(), CallError>
    where
        F: FnOnce() + Send + 'static,
    {
        let group = OperationGroup::new(self, vec![Operation::SendCloseFromClient], move |group| {
            if group.success() {
                completion();
            } else {
                tracing::debug!(call = %group.call_handle(), "close failed");
            }
        });

        self.perform_batch(group)
    }
}

impl CallInner {
    fn send_state(&self) -> MutexGuard<'_, SendState> {
        self.send_state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CallInner {
    fn drop(&mut self) {
        if self.owned {
            tracing::debug!(call = %self.handle, "destroying owned call");
            self.completion_queue.engine().destroy_call(self.handle);
        }
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("handle", &self.inner.handle)
            .field("owned", &self.inner.owned)
            .field("config", &self.inner.config)
            .finish()
    }
}
