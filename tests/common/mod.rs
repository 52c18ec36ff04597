#![allow(dead_code)] // Each test binary uses a different subset of the harness.

use grpc_call::constants::GRPC_CALL_OK;
use grpc_call::work_queue::InlineWorkQueue;
use grpc_call::{
    BatchResults, Call, CallConfig, CallHandle, CompletionEvent, CompletionQueue,
    CompletionQueueEngine, Operation, OperationTag,
};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A batch the mock engine was asked to run.
#[derive(Debug, Clone)]
pub struct Submission {
    pub call: CallHandle,
    pub tag: OperationTag,
    pub operations: Vec<Operation>,
    pub accepted: bool,
}

type Responder = Box<dyn Fn(&[Operation]) -> (bool, BatchResults) + Send + Sync>;

/// Scripted stand-in for the native completion-queue engine.
///
/// Every submission is recorded. Codes queued with `reject_next` are returned
/// (one per submission) before falling back to `GRPC_CALL_OK`. With a
/// responder installed, accepted batches are answered through `next_event`,
/// otherwise the test delivers completions itself via `CompletionQueue::dispatch`.
#[derive(Default)]
pub struct MockEngine {
    submissions: Mutex<Vec<Submission>>,
    scripted_codes: Mutex<VecDeque<i32>>,
    destroyed: Mutex<Vec<CallHandle>>,
    events: Mutex<VecDeque<CompletionEvent>>,
    events_ready: Condvar,
    responder: Option<Responder>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_responder<R>(responder: R) -> Arc<Self>
    where
        R: Fn(&[Operation]) -> (bool, BatchResults) + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        })
    }

    pub fn reject_next(&self, code: i32) {
        self.scripted_codes.lock().unwrap().push_back(code);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn accepted_submissions(&self) -> Vec<Submission> {
        self.submissions()
            .into_iter()
            .filter(|submission| submission.accepted)
            .collect()
    }

    pub fn last_submission(&self) -> Submission {
        self.submissions
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no batch was submitted")
    }

    /// Payloads of every accepted send-message operation, in submission order.
    pub fn sent_messages(&self) -> Vec<Vec<u8>> {
        self.accepted_submissions()
            .iter()
            .flat_map(|submission| submission.operations.iter())
            .filter_map(|op| match op {
                Operation::SendMessage(buffer) => Some(buffer.as_slice().to_vec()),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed_calls(&self) -> Vec<CallHandle> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn push_event(&self, event: CompletionEvent) {
        self.events.lock().unwrap().push_back(event);
        self.events_ready.notify_all();
    }

    /// Polls until `condition` holds, for tests that cross threads.
    pub fn wait_until(&self, condition: impl Fn(&Self) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition(self) {
            assert!(Instant::now() < deadline, "timed out waiting on mock engine");
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl CompletionQueueEngine for MockEngine {
    fn submit_batch(&self, call: CallHandle, operations: &[Operation], tag: OperationTag) -> i32 {
        let code = self
            .scripted_codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GRPC_CALL_OK);
        let accepted = code == GRPC_CALL_OK;

        self.submissions.lock().unwrap().push(Submission {
            call,
            tag,
            operations: operations.to_vec(),
            accepted,
        });

        if accepted {
            if let Some(responder) = &self.responder {
                let (success, results) = responder(operations);
                self.push_event(CompletionEvent::OperationComplete {
                    tag,
                    success,
                    results,
                });
            }
        }

        code
    }

    fn next_event(&self) -> CompletionEvent {
        let mut events = self.events.lock().unwrap();
        loop {
            if let Some(event) = events.pop_front() {
                return event;
            }
            events = self.events_ready.wait(events).unwrap();
        }
    }

    fn destroy_call(&self, call: CallHandle) {
        self.destroyed.lock().unwrap().push(call);
    }
}

pub struct Harness {
    pub engine: Arc<MockEngine>,
    pub queue: Arc<CompletionQueue>,
    pub call: Call,
}

impl Harness {
    /// An owned call whose continuations run inline, so a test controls
    /// every step by dispatching completions itself.
    pub fn new() -> Self {
        Self::with_config(CallConfig::default())
    }

    pub fn with_config(config: CallConfig) -> Self {
        let engine = MockEngine::new();
        let queue = Arc::new(CompletionQueue::new(engine.clone()));
        let call = Call::with_config(
            CallHandle::from_raw(1),
            true,
            queue.clone(),
            config.with_work_queue(Arc::new(InlineWorkQueue)),
        );

        Self {
            engine,
            queue,
            call,
        }
    }

    pub fn complete(&self, tag: OperationTag, success: bool, results: BatchResults) {
        assert!(self.queue.dispatch(CompletionEvent::OperationComplete {
            tag,
            success,
            results,
        }));
    }

    pub fn complete_last(&self, success: bool, results: BatchResults) {
        self.complete(self.engine.last_submission().tag, success, results);
    }
}
