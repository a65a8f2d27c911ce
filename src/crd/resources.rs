//! # Container Settings
//!
//! Environment and compute resource types embedded in the MCPServer spec.

use serde::{Deserialize, Serialize};

/// A single container environment variable
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// CPU and memory quantities, e.g. `cpu: 250m`, `memory: 256Mi`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ResourceList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceList {
    #[must_use]
    pub fn new(cpu: Option<&str>, memory: Option<&str>) -> Self {
        Self {
            cpu: cpu.map(str::to_string),
            memory: memory.map(str::to_string),
        }
    }
}

/// Requests and limits for the server container
///
/// Each of the four values is independent: whatever is left unset falls back
/// to the operator default (requests 100m / 128Mi, limits 500m / 512Mi).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceList>,
}
