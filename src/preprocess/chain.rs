use super::{Preprocessor, TerminalAction};
use crate::client::HttpClient;
use crate::task::HttpTask;
use log::warn;
use std::sync::{Arc, Mutex};

/// The live cursor over the preprocessor pipeline for one request attempt.
///
/// Created fresh per attempt and handed to each preprocessor in turn; cheap
/// to clone (all clones share the same cursor). The terminal action is taken
/// out of the chain exactly once, so it can never run twice no matter how the
/// chain is driven.
#[derive(Clone)]
pub struct PreChain {
    inner: Arc<ChainInner>,
}

struct ChainInner {
    preprocessors: Arc<[Arc<dyn Preprocessor>]>,
    task: Arc<HttpTask>,
    http: HttpClient,
    terminal: Mutex<Option<TerminalAction>>,
    // Cursor into the pipeline; always one past the step currently holding
    // the chain. Guarded by a lock never held across an await.
    index: Mutex<usize>,
    skip_serial: bool,
}

impl PreChain {
    pub(crate) fn new(
        preprocessors: Arc<[Arc<dyn Preprocessor>]>,
        task: Arc<HttpTask>,
        http: HttpClient,
        terminal: TerminalAction,
        index: usize,
        skip_serial: bool,
    ) -> Self {
        debug_assert!(index >= 1);
        Self {
            inner: Arc::new(ChainInner {
                preprocessors,
                task,
                http,
                terminal: Mutex::new(Some(terminal)),
                index: Mutex::new(index),
                skip_serial,
            }),
        }
    }

    /// The task this chain is preprocessing.
    pub fn task(&self) -> &Arc<HttpTask> {
        &self.inner.task
    }

    /// The client that owns the pipeline.
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Signals that the current preprocessor is done and advances the chain:
    /// the next eligible preprocessor runs, or the terminal action when the
    /// pipeline is exhausted.
    ///
    /// In skip-serial mode every contiguous run of serial slots at the cursor
    /// is bypassed on every call. Otherwise the serial slot that just finished
    /// (if any) is notified so it can release its next queued chain.
    pub async fn proceed(&self) {
        let inner = &self.inner;
        let mut finished_serial: Option<Arc<dyn Preprocessor>> = None;
        let next = {
            let mut index = inner.index.lock().unwrap();
            if inner.skip_serial {
                while *index < inner.preprocessors.len()
                    && inner.preprocessors[*index].as_serial().is_some()
                {
                    *index += 1;
                }
            } else {
                let last = &inner.preprocessors[*index - 1];
                if last.as_serial().is_some() {
                    finished_serial = Some(last.clone());
                }
            }
            if *index < inner.preprocessors.len() {
                let next = inner.preprocessors[*index].clone();
                *index += 1;
                Some(next)
            } else {
                None
            }
        };
        if let Some(serial) = finished_serial {
            if let Some(serial) = serial.as_serial() {
                serial.after_process();
            }
        }
        match next {
            Some(preprocessor) => preprocessor.do_process(self.clone()).await,
            None => self.finish().await,
        }
    }

    async fn finish(&self) {
        let terminal = self.inner.terminal.lock().unwrap().take();
        match terminal {
            Some(terminal) => terminal().await,
            None => warn!(
                "chain already finished, ignoring extra proceed: task_id={}",
                self.inner.task.id()
            ),
        }
    }
}
