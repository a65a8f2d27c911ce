//! # MCPServer Status
//!
//! Status types for reporting convergence of the managed resources.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse-grained convergence state of an MCPServer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ServerPhase {
    /// Resources are being created or are not ready yet
    #[default]
    Pending,
    /// Deployment, Service and Ingress all report ready
    Ready,
    /// A validation or reconciliation error stopped the last pass
    Failed,
}

impl ServerPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServerPhase::Pending => "Pending",
            ServerPhase::Ready => "Ready",
            ServerPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for ServerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the MCPServer resource
///
/// Written only by the operator. Readiness flags are re-derived from the
/// live cluster objects on every pass and never carried over.
///
/// Fields are always serialized (no `skip_serializing_if`) so that a merge
/// patch resets values from a previous pass, e.g. clearing `message`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MCPServerStatus {
    /// Current phase
    /// Values: Pending, Ready, Failed
    #[serde(default)]
    pub phase: Option<ServerPhase>,
    /// Human-readable description of the current state
    /// Examples: "All resources are ready", "ingressPath is required when ingressHost is set"
    #[serde(default)]
    pub message: Option<String>,
    /// Deployment exists and all desired replicas are ready
    #[serde(default)]
    pub deployment_ready: bool,
    /// Service exists
    #[serde(default)]
    pub service_ready: bool,
    /// Ingress exists
    #[serde(default)]
    pub ingress_ready: bool,
    /// `metadata.generation` this status was computed from
    #[serde(default)]
    pub observed_generation: Option<i64>,
}
