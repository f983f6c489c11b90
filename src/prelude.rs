// Common Traits and Structs
pub use crate::client::{HttpClient, HttpClientBuilder};
pub use crate::config::HttpConfig;
pub use crate::dispatch::{DispatchHandle, TaskDispatcher};
pub use crate::preprocess::{PreChain, Preprocessor, SerialPreprocessor, TerminalAction};
pub use crate::registry::{Cancelable, TagRegistry};
pub use crate::task::HttpTask;

// Errors
pub use crate::errors::{
    BoxError, Error, ErrorKind, RequestError, Result, TaskError, UrlError,
};

pub mod client {
    pub use crate::client::HttpClient;
    pub use crate::client::HttpClientBuilder;
}
pub mod preprocess {
    pub use crate::preprocess::PreChain;
    pub use crate::preprocess::Preprocessor;
    pub use crate::preprocess::SerialPreprocessor;
    pub use crate::preprocess::TerminalAction;
}
pub mod registry {
    pub use crate::registry::Cancelable;
    pub use crate::registry::TagRegistry;
}
pub mod dispatch {
    pub use crate::dispatch::DispatchHandle;
    pub use crate::dispatch::TaskDispatcher;
}
pub mod errors {
    pub use crate::errors::BoxError;
    pub use crate::errors::Error;
    pub use crate::errors::ErrorKind;
    pub use crate::errors::RequestError;
    pub use crate::errors::Result;
    pub use crate::errors::TaskError;
    pub use crate::errors::UrlError;
}
