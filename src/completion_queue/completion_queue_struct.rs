use super::{CompletionEvent, CompletionQueueEngine};
use crate::constants::DEFAULT_EVENT_LOOP_THREAD_NAME;
use crate::operation::{BatchResults, OperationGroup, OperationTag};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Routes completion events from an engine to the `OperationGroup`s waiting
/// on them.
///
/// Groups are registered by tag before their batch is submitted and are
/// removed (and their continuation run) when the engine reports the tag as
/// finished. Continuations always run outside the registration lock, so they
/// are free to submit further batches.
pub struct CompletionQueue {
    engine: Arc<dyn CompletionQueueEngine>,
    registry: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    operation_groups: HashMap<OperationTag, OperationGroup>,
    // Tags whose `submit_batch` has not returned yet. Shutdown leaves these
    // to `end_submission`, which alone knows whether the engine accepted them.
    submitting: HashSet<OperationTag>,
    shut_down: bool,
}

impl CompletionQueue {
    pub fn new(engine: Arc<dyn CompletionQueueEngine>) -> Self {
        Self {
            engine,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn engine(&self) -> &Arc<dyn CompletionQueueEngine> {
        &self.engine
    }

    /// Holds `group` until its tag completes.
    pub fn register(&self, group: OperationGroup) {
        let tag = group.tag();
        if self.registry().operation_groups.insert(tag, group).is_some() {
            tracing::warn!(%tag, "replaced an operation group registered under the same tag");
        }
    }

    /// Registers `group` ahead of handing its batch to the engine.
    pub(crate) fn begin_submission(&self, group: OperationGroup) {
        let tag = group.tag();
        self.registry().submitting.insert(tag);
        self.register(group);
    }

    /// Settles a submission started with `begin_submission`.
    ///
    /// A rejected batch is withdrawn without running its continuation. An
    /// accepted batch stays registered, unless the queue shut down in the
    /// meantime, in which case it is completed as failed here.
    pub(crate) fn end_submission(&self, tag: OperationTag, accepted: bool) {
        let (withdrawn, abandoned) = {
            let mut registry = self.registry();
            registry.submitting.remove(&tag);

            if !accepted {
                (registry.operation_groups.remove(&tag), None)
            } else if registry.shut_down {
                (None, registry.operation_groups.remove(&tag))
            } else {
                (None, None)
            }
        };

        drop(withdrawn);

        if let Some(group) = abandoned {
            tracing::warn!(%tag, "batch accepted after completion queue shut down");
            group.complete(false, BatchResults::default());
        }
    }

    pub fn is_registered(&self, tag: OperationTag) -> bool {
        self.registry().operation_groups.contains_key(&tag)
    }

    /// Number of registered groups still waiting for their completion.
    pub fn pending_operation_count(&self) -> usize {
        self.registry().operation_groups.len()
    }

    /// Handles a single event. Returns `false` once the queue has shut down.
    ///
    /// On shutdown any groups still registered are completed as failed, so
    /// every continuation runs exactly once. Groups mid-submission are
    /// settled by their submitter instead.
    pub fn dispatch(&self, event: CompletionEvent) -> bool {
        match event {
            CompletionEvent::OperationComplete {
                tag,
                success,
                results,
            } => {
                // Bind first so the registration lock is released before the
                // continuation runs.
                let group = self.registry().operation_groups.remove(&tag);
                match group {
                    Some(group) => {
                        tracing::debug!(
                            %tag,
                            success,
                            call = %group.call_handle(),
                            "batch completed"
                        );
                        group.complete(success, results);
                    }
                    None => {
                        tracing::warn!(%tag, "completion for an unregistered tag");
                    }
                }
                true
            }
            CompletionEvent::QueueTimeout => true,
            CompletionEvent::QueueShutdown => {
                let abandoned: Vec<OperationGroup> = {
                    let mut registry = self.registry();
                    registry.shut_down = true;

                    let Registry {
                        operation_groups,
                        submitting,
                        ..
                    } = &mut *registry;
                    let tags: Vec<OperationTag> = operation_groups
                        .keys()
                        .filter(|tag| !submitting.contains(tag))
                        .copied()
                        .collect();

                    tags.iter()
                        .filter_map(|tag| operation_groups.remove(tag))
                        .collect()
                };

                if !abandoned.is_empty() {
                    tracing::warn!(
                        count = abandoned.len(),
                        "completion queue shut down with pending batches"
                    );
                }

                for group in abandoned {
                    group.complete(false, BatchResults::default());
                }
                false
            }
        }
    }

    /// Pumps engine events on the current thread until shutdown.
    pub fn run(&self) {
        tracing::debug!("completion queue event loop started");
        while self.dispatch(self.engine.next_event()) {}
        tracing::debug!("completion queue event loop stopped");
    }

    /// Runs `run` on a dedicated named thread.
    pub fn spawn_event_loop(self: &Arc<Self>) -> io::Result<JoinHandle<()>> {
        let queue = Arc::clone(self);
        thread::Builder::new()
            .name(DEFAULT_EVENT_LOOP_THREAD_NAME.to_string())
            .spawn(move || queue.run())
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
