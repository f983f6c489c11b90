use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// An outbound request task as seen by the orchestration core.
///
/// The core only relies on identity (for registry removal), the tag string
/// (for bulk cancellation), and the per-task skip flags that feed the
/// preprocessing pipeline. Everything else about a request (method, headers,
/// body) belongs to the surrounding toolkit.
pub struct HttpTask {
    id: Uuid,
    url: String,
    tag: Mutex<Option<String>>,
    skip_preproc: AtomicBool,
    skip_serial_preproc: AtomicBool,
}

impl HttpTask {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            tag: Mutex::new(None),
            skip_preproc: AtomicBool::new(false),
            skip_serial_preproc: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tag(&self) -> Option<String> {
        self.tag.lock().unwrap().clone()
    }

    pub fn set_tag(&self, tag: impl Into<String>) {
        *self.tag.lock().unwrap() = Some(tag.into());
    }

    /// Skip the whole preprocessing pipeline for this task.
    pub fn skip_preproc(&self) -> &Self {
        self.skip_preproc.store(true, Ordering::Relaxed);
        self
    }

    /// Skip only serial preprocessors for this task.
    pub fn skip_serial_preproc(&self) -> &Self {
        self.skip_serial_preproc.store(true, Ordering::Relaxed);
        self
    }

    pub fn is_skip_preproc(&self) -> bool {
        self.skip_preproc.load(Ordering::Relaxed)
    }

    pub fn is_skip_serial_preproc(&self) -> bool {
        self.skip_serial_preproc.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_have_distinct_identity() {
        let a = HttpTask::new("https://example.com/a");
        let b = HttpTask::new("https://example.com/a");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn tag_can_be_reassigned() {
        let task = HttpTask::new("/users");
        assert_eq!(task.tag(), None);
        task.set_tag("profile");
        assert_eq!(task.tag().as_deref(), Some("profile"));
        task.set_tag("profile-v2");
        assert_eq!(task.tag().as_deref(), Some("profile-v2"));
    }

    #[test]
    fn skip_flags_default_off() {
        let task = HttpTask::new("/users");
        assert!(!task.is_skip_preproc());
        assert!(!task.is_skip_serial_preproc());
        task.skip_preproc().skip_serial_preproc();
        assert!(task.is_skip_preproc());
        assert!(task.is_skip_serial_preproc());
    }
}
