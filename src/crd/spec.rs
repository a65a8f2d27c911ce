//! # MCPServer Spec
//!
//! Main CRD specification type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crd::{EnvVar, ResourceRequirements};

/// MCPServer Custom Resource Definition
///
/// Declares a network-addressable MCP server. The operator converges every
/// MCPServer into one Deployment, one Service and one Ingress of the same name
/// in the same namespace, and reports their aggregate readiness on the status.
///
/// # Example
///
/// ```yaml
/// apiVersion: mcp-runtime.org/v1alpha1
/// kind: MCPServer
/// metadata:
///   name: demo
///   namespace: default
/// spec:
///   image: registry.example.com/demo
///   imageTag: "1.2.0"
///   ingressHost: mcp.example.com
///   envVars:
///     - name: LOG_LEVEL
///       value: debug
/// ```
///
/// Every optional field left unset is filled in by the operator on the first
/// reconciliation pass and written back to the resource.
#[derive(
    kube::CustomResource, Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema,
)]
#[kube(
    kind = "MCPServer",
    group = "mcp-runtime.org",
    version = "v1alpha1",
    plural = "mcpservers",
    namespaced,
    status = "crate::crd::MCPServerStatus",
    shortname = "mcps",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}, {"name":"DeploymentReady", "type":"boolean", "jsonPath":".status.deploymentReady"}, {"name":"Message", "type":"string", "jsonPath":".status.message"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MCPServerSpec {
    /// Container image without registry override, e.g. `nginx` or `team/server:1.0`
    #[serde(default)]
    pub image: String,
    /// Tag appended to `image` when the image does not already carry one
    /// Default: "latest" (only when the image has no tag)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    /// Registry `host[:port]` placed in front of the image path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_override: Option<String>,
    /// Number of pod replicas
    /// Default: 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Container port the server listens on
    /// Default: 8088
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    /// Port exposed by the Service, forwarded to `port`
    /// Default: 80
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<i32>,
    /// Host matched by the Ingress rule
    /// When set, `ingressPath` must be set as well. When unset the rule matches every host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
    /// Path prefix routed to the Service
    /// Default: "/<name>/mcp"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_path: Option<String>,
    /// IngressClass name
    /// Default: "traefik"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class: Option<String>,
    /// Extra Ingress annotations; these win over the operator's default entrypoint annotation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ingress_annotations: BTreeMap<String, String>,
    /// Environment variables for the server container, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvVar>,
    /// Names of Secrets used to pull the image
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<String>,
    /// CPU / memory requests and limits; unset values fall back to operator defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}
