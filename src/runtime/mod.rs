//! # Runtime
//!
//! Process wiring around the reconciler: startup, the controller watch loop
//! and the error policy that schedules retries.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use error_policy::{classify_watch_error, error_policy, WatchErrorClass};
pub use initialization::{init_tracing, initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
