//! # Controller
//!
//! Core controller modules for the MCP runtime operator.
//!
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `crdgen`: CRD generation
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks
//! - `store`: Object access seam between the reconciler and the API server

pub mod backoff;
pub mod crdgen;
pub mod reconciler;
pub mod server;
pub mod store;
