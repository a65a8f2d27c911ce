//! # Object Store
//!
//! The Resource API the reconciler talks to.
//!
//! Every read and write of a reconciliation pass goes through [`ObjectStore`]
//! (get, create, replace per object kind) and [`ClusterStore`] (the four kinds
//! plus the MCPServer status subresource). Production code uses [`KubeStore`],
//! which forwards to `kube::Api`; tests use an in-memory implementation.
//!
//! Calls never retry. Failures are returned as `anyhow::Error` and wrapped into
//! structured operator errors by the reconciler.

mod api;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;

use crate::crd::{MCPServer, MCPServerStatus};

pub use self::api::KubeStore;

/// Get / create / replace for one namespaced object kind
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Fetch an object; `Ok(None)` when it does not exist
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<K>>;

    /// Create a new object, returning it as stored
    async fn create(&self, namespace: &str, object: &K) -> anyhow::Result<K>;

    /// Replace an existing object, returning it as stored
    async fn replace(&self, namespace: &str, name: &str, object: &K) -> anyhow::Result<K>;
}

/// All object kinds a reconciliation pass reads or writes
#[async_trait]
pub trait ClusterStore:
    ObjectStore<MCPServer> + ObjectStore<Deployment> + ObjectStore<Service> + ObjectStore<Ingress>
{
    /// Write the status subresource of an MCPServer
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &MCPServerStatus,
    ) -> anyhow::Result<()>;
}
