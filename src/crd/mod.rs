//! # Custom Resource Definitions
//!
//! CRD types for the MCP runtime operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - The `MCPServer` resource and its spec
//! - `resources.rs` - Environment variables and container resource settings
//! - `status.rs` - Status and phase types written by the operator

mod resources;
mod spec;
mod status;

// Re-export all public types
pub use resources::{EnvVar, ResourceList, ResourceRequirements};
pub use spec::{MCPServer, MCPServerSpec};
pub use status::{MCPServerStatus, ServerPhase};
