//! # Reconciler
//!
//! Core reconciliation logic for `MCPServer` resources.
//!
//! The reconciler:
//! - Watches `MCPServer` resources (optionally in a single namespace)
//! - Fills in spec defaults and persists them
//! - Creates or updates the owned Deployment, Service and Ingress
//! - Reports readiness of those objects on the status subresource
//!
//! ## Reconciliation Flow
//!
//! 1. Fetch the `MCPServer`
//! 2. Validate feature-gated fields
//! 3. Apply defaults (requeue when anything changed)
//! 4. Apply Deployment, Service, Ingress
//! 5. Evaluate readiness
//! 6. Determine the phase and update status

pub mod defaults;
pub mod image;
pub mod readiness;
pub mod reconcile;
pub mod resources;
pub mod status;
pub mod types;
pub mod validation;

// Re-export public API
pub use defaults::{apply_defaults, apply_spec_defaults};
pub use image::resolve_image;
pub use readiness::{check_resource_readiness, is_deployment_ready, Readiness};
pub use reconcile::{action_for, reconcile, reconcile_server};
pub use status::{build_status, determine_phase, update_status};
pub use types::{BackoffState, Outcome, Reconciler, ReconcilerError};
pub use validation::{is_valid_quantity, validate_server};
