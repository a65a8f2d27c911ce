//! # Status Management
//!
//! Folds readiness into a phase and writes it onto the MCPServer status.

mod phase;
mod writer;

pub use phase::{build_status, determine_phase};
pub use writer::update_status;
