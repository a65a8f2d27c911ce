//! MCP Runtime Operator Library
//!
//! This library provides the reconciliation core of the MCP runtime operator.
//! An `MCPServer` custom resource is converged into a Deployment, a Service and
//! an Ingress, and the aggregate readiness of those three objects is written
//! back onto the resource's status.
//!
//! ## Quick Start
//!
//! ```rust
//! use mcp_runtime_operator::prelude::*;
//! ```
//!
//! This brings commonly used types into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod observability;
pub mod prelude;
pub mod runtime;
