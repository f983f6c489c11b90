use super::{PreChain, Preprocessor};
use async_trait::async_trait;
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Serializing decorator around a preprocessor.
///
/// Guarantees at most one chain runs through the wrapped preprocessor at a
/// time; later arrivals queue in FIFO order and are released one by one as
/// each run proceeds. This turns a preprocessor with shared mutable side
/// effects (refreshing a shared auth token, say) into a safe critical
/// section without the preprocessor itself managing any locking.
pub struct SerialPreprocessor {
    preprocessor: Arc<dyn Preprocessor>,
    state: Mutex<SerialState>,
}

struct SerialState {
    running: bool,
    pendings: VecDeque<PreChain>,
}

impl SerialPreprocessor {
    pub fn new(preprocessor: Arc<dyn Preprocessor>) -> Self {
        Self {
            preprocessor,
            state: Mutex::new(SerialState {
                running: false,
                pendings: VecDeque::new(),
            }),
        }
    }

    /// Called by the chain when the run this slot admitted has proceeded.
    /// Releases the next queued chain, or marks the slot idle.
    pub(crate) fn after_process(&self) {
        let released = {
            let mut state = self.state.lock().unwrap();
            match state.pendings.pop_front() {
                Some(chain) => Some(chain),
                None => {
                    state.running = false;
                    None
                }
            }
        };
        if let Some(chain) = released {
            debug!(
                "serial slot releasing queued chain: task_id={}",
                chain.task().id()
            );
            // Hand the released chain to the executor; the caller advancing
            // its own chain must not wait behind a queued neighbour.
            let preprocessor = self.preprocessor.clone();
            tokio::spawn(async move {
                preprocessor.do_process(chain).await;
            });
        }
    }
}

#[async_trait]
impl Preprocessor for SerialPreprocessor {
    async fn do_process(&self, chain: PreChain) {
        let admitted = {
            let mut state = self.state.lock().unwrap();
            if state.running {
                debug!(
                    "serial slot busy, queueing chain: task_id={} pending={}",
                    chain.task().id(),
                    state.pendings.len() + 1
                );
                state.pendings.push_back(chain);
                None
            } else {
                state.running = true;
                Some(chain)
            }
        };
        if let Some(chain) = admitted {
            self.preprocessor.do_process(chain).await;
        }
    }

    fn as_serial(&self) -> Option<&SerialPreprocessor> {
        Some(self)
    }
}
