//! # Prelude
//!
//! Re-exports commonly used types for convenience.
//!
//! ```rust
//! use mcp_runtime_operator::prelude::*;
//! ```
//!
//! This brings into scope:
//! - All CRD types (`MCPServer`, `MCPServerSpec`, `MCPServerStatus`, ...)
//! - The store seam (`ObjectStore`, `ClusterStore`, `KubeStore`)
//! - Reconciler types (`Reconciler`, `ReconcilerError`, `Outcome`, ...)
//! - Configuration and the structured operator error

pub use crate::crd::*;

pub use crate::controller::store::{ClusterStore, KubeStore, ObjectStore};

pub use crate::controller::reconciler::{
    apply_defaults, build_status, determine_phase, reconcile, reconcile_server, resolve_image,
    Outcome, Readiness, Reconciler, ReconcilerError,
};

pub use crate::config::ControllerConfig;

pub use crate::errors::{ErrorCategory, ErrorContext, ErrorKind, OperatorError};
