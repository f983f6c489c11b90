use crate::registry::Cancelable;
use dashmap::DashMap;
use log::debug;
use metrics::counter;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Executes submitted request work on the tokio runtime and keeps an
/// abortable handle to everything still in flight.
///
/// This stands in for the transport's dispatcher: client-wide cancellation
/// goes through [`TaskDispatcher::cancel_all`], which also covers tasks that
/// are already past preprocessing and no longer registry-tracked.
#[derive(Clone, Default)]
pub struct TaskDispatcher {
    inflight: Arc<DashMap<Uuid, AbortHandle>>,
}

struct HandleState {
    finished: AtomicBool,
    cancelled: AtomicBool,
}

/// Cancelable handle to one dispatched piece of work.
#[derive(Clone)]
pub struct DispatchHandle {
    state: Arc<HandleState>,
    abort: AbortHandle,
    task_id: Uuid,
    inflight: Arc<DashMap<Uuid, AbortHandle>>,
}

impl TaskDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `work` and tracks it under `task_id` until it completes or is
    /// cancelled.
    pub fn dispatch<F>(&self, task_id: Uuid, work: F) -> DispatchHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = Arc::new(HandleState {
            finished: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        });
        let done_state = state.clone();
        let inflight = self.inflight.clone();
        let join = tokio::spawn(async move {
            work.await;
            done_state.finished.store(true, Ordering::SeqCst);
            inflight.remove(&task_id);
        });
        let abort = join.abort_handle();
        self.inflight.insert(task_id, abort.clone());
        // The work may have finished between spawn and insert; drop the
        // stale handle instead of tracking it forever.
        if state.finished.load(Ordering::SeqCst) {
            self.inflight.remove(&task_id);
        }
        DispatchHandle {
            state,
            abort,
            task_id,
            inflight: self.inflight.clone(),
        }
    }

    /// Aborts everything still tracked.
    pub fn cancel_all(&self) {
        let mut aborted = 0u64;
        for entry in self.inflight.iter() {
            entry.value().abort();
            aborted += 1;
        }
        self.inflight.clear();
        debug!("dispatcher aborted {aborted} in-flight tasks");
        counter!("dispatch_aborted_total").increment(aborted);
    }

    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }
}

impl Cancelable for DispatchHandle {
    fn cancel(&self) -> bool {
        if self.state.finished.load(Ordering::SeqCst) {
            return false;
        }
        if self.state.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.abort.abort();
        // Aborting kills the spawned wrapper before its own cleanup runs, so
        // the tracking entry has to go here.
        self.inflight.remove(&self.task_id);
        true
    }
}
