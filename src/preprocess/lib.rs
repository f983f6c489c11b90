mod chain;
mod serial;

pub use chain::PreChain;
pub use serial::SerialPreprocessor;

use async_trait::async_trait;
use futures::future::BoxFuture;

/// The action that actually performs the network call once preprocessing is
/// done. Invoked exactly once per request attempt.
pub type TerminalAction = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// A pluggable step run before a request executes.
///
/// A preprocessor receives the live [`PreChain`] and must eventually call
/// [`PreChain::proceed`] exactly once to hand the request to the next step,
/// or to the terminal action when it is the last step. It may hold the chain
/// for as long as it likes (e.g. while refreshing a token) and may proceed
/// from any task or thread; a preprocessor that never proceeds stalls the
/// request forever.
#[async_trait]
pub trait Preprocessor: Send + Sync {
    /// Processes one request attempt.
    async fn do_process(&self, chain: PreChain);

    /// Serial slots override this so the chain can coordinate with them
    /// without downcasting.
    fn as_serial(&self) -> Option<&SerialPreprocessor> {
        None
    }
}
