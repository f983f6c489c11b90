//! reqflow: request-orchestration core of an HTTP client toolkit.
//! All subsystems are embedded as local modules under `src/`.

pub mod prelude;

#[path = "client/lib.rs"]
pub mod client;
#[path = "config/lib.rs"]
pub mod config;
#[path = "dispatch/lib.rs"]
pub mod dispatch;
#[path = "errors/lib.rs"]
pub mod errors;
#[path = "preprocess/lib.rs"]
pub mod preprocess;
#[path = "registry/lib.rs"]
pub mod registry;
#[path = "task/lib.rs"]
pub mod task;
