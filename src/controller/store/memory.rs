//! In-memory store for reconciler tests
//!
//! Mimics the parts of the API server the reconciler depends on: resource
//! versions, generation bumps on spec changes, status preserved across spec
//! replaces, and "not found" / "already exists" errors. Individual operations
//! can be made to fail, and deployment rollout can be simulated.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::Resource;

use super::{ClusterStore, ObjectStore};
use crate::crd::{MCPServer, MCPServerStatus};

type Key = (String, String);
type Table<K> = Mutex<BTreeMap<Key, K>>;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    servers: Table<MCPServer>,
    deployments: Table<Deployment>,
    services: Table<Service>,
    ingresses: Table<Ingress>,
    /// Injected failures, with the number of calls still allowed to succeed
    failures: Mutex<HashMap<(String, &'static str), usize>>,
    writes: Mutex<Vec<String>>,
    status_patches: Mutex<Vec<MCPServerStatus>>,
    version: AtomicU64,
}

/// Per-kind storage hooks
pub(crate) trait Stored: Resource<DynamicType = ()> + Clone + Send + Sync + 'static {
    fn table(store: &MemoryStore) -> &Table<Self>;

    /// Adjust an object being written over `live`
    fn on_replace(_live: &Self, _incoming: &mut Self) {}
}

impl Stored for MCPServer {
    fn table(store: &MemoryStore) -> &Table<Self> {
        &store.servers
    }

    fn on_replace(live: &Self, incoming: &mut Self) {
        // The main resource endpoint ignores status; spec changes bump generation
        incoming.status.clone_from(&live.status);
        let generation = live.meta().generation.unwrap_or(1);
        incoming.meta_mut().generation = Some(if incoming.spec == live.spec {
            generation
        } else {
            generation + 1
        });
    }
}

impl Stored for Deployment {
    fn table(store: &MemoryStore) -> &Table<Self> {
        &store.deployments
    }

    fn on_replace(live: &Self, incoming: &mut Self) {
        incoming.status.clone_from(&live.status);
    }
}

impl Stored for Service {
    fn table(store: &MemoryStore) -> &Table<Self> {
        &store.services
    }
}

impl Stored for Ingress {
    fn table(store: &MemoryStore) -> &Table<Self> {
        &store.ingresses
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn check_failure<K: Stored>(&self, operation: &'static str) -> anyhow::Result<()> {
        let kind = K::kind(&()).to_string();
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&(kind.clone(), operation)) {
            Some(0) => bail!("injected {operation} failure for {kind}"),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn record(&self, entry: String) {
        self.writes.lock().unwrap().push(entry);
    }

    /// Seed an MCPServer as if a user had applied it
    pub(crate) fn insert_server(&self, mut server: MCPServer) {
        let namespace = server.meta().namespace.clone().unwrap_or_default();
        let name = server.meta().name.clone().unwrap_or_default();
        let meta = server.meta_mut();
        meta.generation.get_or_insert(1);
        meta.uid.get_or_insert_with(|| format!("uid-{name}"));
        meta.resource_version = Some(self.next_version());
        self.servers
            .lock()
            .unwrap()
            .insert(key(&namespace, &name), server);
    }

    /// Make every subsequent `operation` ("get", "create", "replace", "patch_status") on `kind` fail
    pub(crate) fn fail(&self, kind: &str, operation: &'static str) {
        self.fail_after(kind, operation, 0);
    }

    /// Let `successes` more calls through, then fail like [`MemoryStore::fail`]
    pub(crate) fn fail_after(&self, kind: &str, operation: &'static str, successes: usize) {
        self.failures
            .lock()
            .unwrap()
            .insert((kind.to_string(), operation), successes);
    }

    pub(crate) fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub(crate) fn object<K: Stored>(&self, namespace: &str, name: &str) -> Option<K> {
        K::table(self)
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    pub(crate) fn server(&self, namespace: &str, name: &str) -> Option<MCPServer> {
        self.object(namespace, name)
    }

    pub(crate) fn delete<K: Stored>(&self, namespace: &str, name: &str) -> Option<K> {
        K::table(self).lock().unwrap().remove(&key(namespace, name))
    }

    /// Report every desired replica of a stored Deployment as ready
    pub(crate) fn mark_deployment_ready(&self, namespace: &str, name: &str) {
        let mut deployments = self.deployments.lock().unwrap();
        if let Some(deployment) = deployments.get_mut(&key(namespace, name)) {
            let replicas = deployment.spec.as_ref().and_then(|spec| spec.replicas);
            deployment.status = Some(DeploymentStatus {
                replicas,
                ready_replicas: replicas,
                ..DeploymentStatus::default()
            });
        }
    }

    /// Create / replace calls in order, e.g. `create Deployment demo`
    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    pub(crate) fn status_patches(&self) -> Vec<MCPServerStatus> {
        self.status_patches.lock().unwrap().clone()
    }
}

#[async_trait]
impl<K: Stored> ObjectStore<K> for MemoryStore {
    async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<Option<K>> {
        self.check_failure::<K>("get")?;
        Ok(self.object(namespace, name))
    }

    async fn create(&self, namespace: &str, object: &K) -> anyhow::Result<K> {
        self.check_failure::<K>("create")?;
        let name = object
            .meta()
            .name
            .clone()
            .ok_or_else(|| anyhow!("{} has no name", K::kind(&())))?;
        let mut stored = object.clone();
        stored.meta_mut().namespace = Some(namespace.to_string());
        stored.meta_mut().resource_version = Some(self.next_version());

        let mut table = K::table(self).lock().unwrap();
        let slot = key(namespace, &name);
        if table.contains_key(&slot) {
            bail!("{} {namespace}/{name} already exists", K::kind(&()));
        }
        table.insert(slot, stored.clone());
        drop(table);

        self.record(format!("create {} {name}", K::kind(&())));
        Ok(stored)
    }

    async fn replace(&self, namespace: &str, name: &str, object: &K) -> anyhow::Result<K> {
        self.check_failure::<K>("replace")?;
        let mut table = K::table(self).lock().unwrap();
        let slot = key(namespace, name);
        let Some(live) = table.get(&slot) else {
            bail!("{} {namespace}/{name} not found", K::kind(&()));
        };
        if object.meta().resource_version != live.meta().resource_version {
            bail!("conflict: {} {namespace}/{name} was modified", K::kind(&()));
        }
        let mut stored = object.clone();
        K::on_replace(live, &mut stored);
        stored.meta_mut().resource_version = Some(self.next_version());
        table.insert(slot, stored.clone());
        drop(table);

        self.record(format!("replace {} {name}", K::kind(&())));
        Ok(stored)
    }
}

#[async_trait]
impl ClusterStore for MemoryStore {
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &MCPServerStatus,
    ) -> anyhow::Result<()> {
        self.check_failure::<MCPServer>("patch_status")?;
        let mut servers = self.servers.lock().unwrap();
        let server = servers
            .get_mut(&key(namespace, name))
            .ok_or_else(|| anyhow!("MCPServer {namespace}/{name} not found"))?;
        server.status = Some(status.clone());
        server.meta_mut().resource_version = Some(self.next_version());
        drop(servers);

        self.status_patches.lock().unwrap().push(status.clone());
        Ok(())
    }
}
