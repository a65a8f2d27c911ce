//! # Configuration
//!
//! Controller settings loaded from environment variables, with CLI overrides
//! applied by the binary.

mod controller;

pub use controller::ControllerConfig;
