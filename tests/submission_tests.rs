use grpc_call::constants::{GRPC_CALL_ERROR_ALREADY_FINISHED, GRPC_CALL_OK};
use grpc_call::work_queue::InlineWorkQueue;
use grpc_call::{
    Call, CallConfig, CallError, CallHandle, CallResult, CompletionEvent, CompletionQueue,
    CompletionQueueEngine, Metadata, Operation, OperationTag, SendFailure,
};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

/// Engine that shuts its completion queue down from another thread while a
/// submission is still inside `submit_batch`, then answers with `code`.
struct ShutdownWhileSubmittingEngine {
    queue: Mutex<Weak<CompletionQueue>>,
    code: i32,
}

impl ShutdownWhileSubmittingEngine {
    fn attach(code: i32) -> (Arc<Self>, Arc<CompletionQueue>) {
        let engine = Arc::new(Self {
            queue: Mutex::new(Weak::new()),
            code,
        });
        let queue = Arc::new(CompletionQueue::new(engine.clone()));
        *engine.queue.lock().unwrap() = Arc::downgrade(&queue);
        (engine, queue)
    }
}

impl CompletionQueueEngine for ShutdownWhileSubmittingEngine {
    fn submit_batch(
        &self,
        _call: CallHandle,
        _operations: &[Operation],
        _tag: OperationTag,
    ) -> i32 {
        let queue = self.queue.lock().unwrap().upgrade().expect("queue dropped");
        thread::spawn(move || queue.dispatch(CompletionEvent::QueueShutdown))
            .join()
            .unwrap();
        self.code
    }

    fn next_event(&self) -> CompletionEvent {
        CompletionEvent::QueueShutdown
    }

    fn destroy_call(&self, _call: CallHandle) {}
}

fn inline_call(queue: Arc<CompletionQueue>, handle: u64) -> Call {
    Call::with_config(
        CallHandle::from_raw(handle),
        false,
        queue,
        CallConfig::default().with_work_queue(Arc::new(InlineWorkQueue)),
    )
}

#[test]
fn rejected_batch_never_completes_when_queue_shuts_down_mid_submit() {
    let (_engine, queue) = ShutdownWhileSubmittingEngine::attach(GRPC_CALL_ERROR_ALREADY_FINISHED);
    let call = inline_call(queue.clone(), 41);
    let completions = Arc::new(AtomicUsize::new(0));

    let outcome = {
        let completions = completions.clone();
        call.perform(b"ping", Metadata::new(), move |_| {
            completions.fetch_add(1, Ordering::SeqCst);
        })
    };

    assert_eq!(outcome, Err(CallError::AlreadyFinished));
    assert_eq!(completions.load(Ordering::SeqCst), 0);
    assert_eq!(queue.pending_operation_count(), 0);
}

#[test]
fn accepted_batch_fails_once_when_queue_shuts_down_mid_submit() {
    let (_engine, queue) = ShutdownWhileSubmittingEngine::attach(GRPC_CALL_OK);
    let call = inline_call(queue.clone(), 41);
    let results = Arc::new(Mutex::new(Vec::<CallResult>::new()));

    {
        let results = results.clone();
        call.perform(b"ping", Metadata::new(), move |result| {
            results.lock().unwrap().push(result)
        })
        .unwrap();
    }

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_empty());
    assert_eq!(queue.pending_operation_count(), 0);
}

#[test]
fn rejected_send_is_not_also_reported_undelivered_after_shutdown() {
    let (_engine, queue) = ShutdownWhileSubmittingEngine::attach(GRPC_CALL_ERROR_ALREADY_FINISHED);
    let call = inline_call(queue, 41);
    let failures = Arc::new(Mutex::new(Vec::<SendFailure>::new()));

    {
        let failures = failures.clone();
        call.set_send_failure_handler(move |failure| failures.lock().unwrap().push(failure));
    }

    assert_eq!(call.try_send_message(b"m0"), Err(CallError::AlreadyFinished));
    assert!(failures.lock().unwrap().is_empty());
    assert!(!call.is_writing());
}

/// Engine that counts submissions which overlap inside `submit_batch`.
#[derive(Default)]
struct OverlapCountingEngine {
    in_submit: AtomicBool,
    overlaps: AtomicUsize,
    submissions: AtomicUsize,
}

impl CompletionQueueEngine for OverlapCountingEngine {
    fn submit_batch(
        &self,
        _call: CallHandle,
        _operations: &[Operation],
        _tag: OperationTag,
    ) -> i32 {
        if self.in_submit.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        let pause = rand::rng().random_range(50..500);
        thread::sleep(Duration::from_micros(pause));

        self.in_submit.store(false, Ordering::SeqCst);
        self.submissions.fetch_add(1, Ordering::SeqCst);
        GRPC_CALL_OK
    }

    fn next_event(&self) -> CompletionEvent {
        CompletionEvent::QueueShutdown
    }

    fn destroy_call(&self, _call: CallHandle) {}
}

#[test]
fn submissions_from_different_calls_never_overlap() {
    const CALLS: u64 = 6;
    const RECEIVES_PER_CALL: usize = 4;

    let engine = Arc::new(OverlapCountingEngine::default());
    let queue = Arc::new(CompletionQueue::new(engine.clone()));

    let workers: Vec<_> = (0..CALLS)
        .map(|index| {
            let call = inline_call(queue.clone(), 100 + index);
            thread::spawn(move || {
                assert!(call.send_message(vec![index as u8]));
                for _ in 0..RECEIVES_PER_CALL {
                    call.receive_message(|_| {}).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    let expected = CALLS as usize * (1 + RECEIVES_PER_CALL);
    assert_eq!(engine.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(engine.submissions.load(Ordering::SeqCst), expected);
    assert_eq!(queue.pending_operation_count(), expected);

    assert!(!queue.dispatch(CompletionEvent::QueueShutdown));
    assert_eq!(queue.pending_operation_count(), 0);
}
