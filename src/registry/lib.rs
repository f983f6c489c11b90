use log::debug;
use metrics::counter;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Capability to stop an outstanding piece of work.
///
/// Must be idempotent: cancelling something already finished or already
/// cancelled is a no-op that returns `false`. The registry relies on this to
/// tolerate double-cancellation of entries it reaped late.
pub trait Cancelable: Send + Sync {
    /// Cancels the underlying work; returns whether this call actually
    /// changed its state.
    fn cancel(&self) -> bool;
}

struct TagEntry {
    tag: String,
    canceler: Arc<dyn Cancelable>,
    task_id: Uuid,
    created_at: Instant,
}

impl TagEntry {
    fn is_expired(&self, expire_after: Duration) -> bool {
        self.created_at.elapsed() > expire_after
    }
}

/// Tracks every outstanding tagged task so groups of requests can be
/// cancelled in bulk.
///
/// One coarse lock over a flat list: the registry is scanned far more often
/// than it grows large, and every scan doubles as a reaper for entries that
/// outlived any plausible request (tasks whose completion callback was never
/// wired). Reaping is routine housekeeping, never an error.
pub struct TagRegistry {
    entries: Mutex<Vec<TagEntry>>,
    expire_after: Duration,
}

impl TagRegistry {
    pub fn new(expire_after: Duration) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            expire_after,
        }
    }

    /// Registers a task under `tag` with the handle that can stop it.
    pub fn add(&self, tag: impl Into<String>, canceler: Arc<dyn Cancelable>, task_id: Uuid) {
        let entry = TagEntry {
            tag: tag.into(),
            canceler,
            task_id,
            created_at: Instant::now(),
        };
        self.entries.lock().unwrap().push(entry);
    }

    /// Removes the entry for a completed task, dropping any expired entries
    /// encountered on the way. Stops at the first task match; only one entry
    /// per task is live at a time.
    pub fn remove(&self, task_id: Uuid) {
        let mut expired = 0u64;
        {
            let mut entries = self.entries.lock().unwrap();
            let mut i = 0;
            while i < entries.len() {
                if entries[i].task_id == task_id {
                    entries.remove(i);
                    break;
                }
                if entries[i].is_expired(self.expire_after) {
                    entries.remove(i);
                    expired += 1;
                    continue;
                }
                i += 1;
            }
        }
        if expired > 0 {
            counter!("tag_task_expired_total").increment(expired);
        }
    }

    /// Cancels every entry whose tag contains `tag` as a substring and
    /// removes it; returns how many cancellations actually changed state.
    ///
    /// Substring matching supports hierarchical tagging schemes but is
    /// deliberately permissive: cancelling `"a"` also cancels `"cat"`.
    /// Choose tags accordingly. Non-matching entries found expired during
    /// the scan are reaped too.
    pub fn cancel(&self, tag: &str) -> usize {
        let mut count = 0usize;
        let mut expired = 0u64;
        {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|entry| {
                if entry.tag.contains(tag) {
                    if entry.canceler.cancel() {
                        count += 1;
                    }
                    false
                } else if entry.is_expired(self.expire_after) {
                    expired += 1;
                    false
                } else {
                    true
                }
            });
        }
        debug!("cancelled {count} tagged tasks matching {tag:?}");
        counter!("tag_task_cancelled_total").increment(count as u64);
        if expired > 0 {
            counter!("tag_task_expired_total").increment(expired);
        }
        count
    }

    /// Updates the tag of a task's live entry after reassignment.
    pub fn retag(&self, task_id: Uuid, tag: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.task_id == task_id) {
            entry.tag = tag.to_string();
        }
    }

    /// Drops every entry without cancelling. Used by client-wide
    /// cancellation, where the transport dispatcher aborts the work itself.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
