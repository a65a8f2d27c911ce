//! `kube::Api` backed store

use std::fmt;

use anyhow::Context;
use async_trait::async_trait;
use kube::api::{Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ClusterStore, ObjectStore};
use crate::constants::CONTROLLER_NAME;
use crate::crd::{MCPServer, MCPServerStatus};

/// Store that talks to the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeStore")
            .field("client", &"<kube::Client>")
            .finish()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(CONTROLLER_NAME.to_string()),
        ..PostParams::default()
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Serialize
        + fmt::Debug
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<K>> {
        self.api::<K>(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("failed to get {} {namespace}/{name}", K::kind(&())))
    }

    async fn create(&self, namespace: &str, object: &K) -> anyhow::Result<K> {
        self.api::<K>(namespace)
            .create(&post_params(), object)
            .await
            .with_context(|| format!("failed to create {} in {namespace}", K::kind(&())))
    }

    async fn replace(&self, namespace: &str, name: &str, object: &K) -> anyhow::Result<K> {
        self.api::<K>(namespace)
            .replace(name, &post_params(), object)
            .await
            .with_context(|| format!("failed to replace {} {namespace}/{name}", K::kind(&())))
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &MCPServerStatus,
    ) -> anyhow::Result<()> {
        let patch = serde_json::json!({ "status": status });
        self.api::<MCPServer>(namespace)
            .patch_status(name, &PatchParams::apply(CONTROLLER_NAME), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("failed to patch status of MCPServer {namespace}/{name}"))?;
        Ok(())
    }
}
