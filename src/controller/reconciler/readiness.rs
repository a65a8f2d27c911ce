//! # Readiness
//!
//! Independently polls the three managed objects and reduces each to a flag.
//!
//! - Deployment: exists, desired replicas are reported and non-zero, and the
//!   ready replica count equals them
//! - Service: exists
//! - Ingress: exists
//!
//! A missing object is "not ready", never an error. Only store failures are
//! returned as errors.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;

use crate::controller::store::ObjectStore;
use crate::crd::MCPServer;
use crate::errors::{server_context, wrap_operator_error, ErrorKind, OperatorError};

/// Readiness flags of the managed objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub deployment: bool,
    pub service: bool,
    pub ingress: bool,
}

impl Readiness {
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.deployment && self.service && self.ingress
    }
}

/// Whether a live Deployment has rolled out all desired replicas
#[must_use]
pub fn is_deployment_ready(deployment: &Deployment) -> bool {
    let desired = deployment.spec.as_ref().and_then(|spec| spec.replicas);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas);
    match (desired, ready) {
        (Some(desired), Some(ready)) => desired > 0 && ready == desired,
        _ => false,
    }
}

fn check_failed(server: &MCPServer, resource: &str, cause: anyhow::Error) -> OperatorError {
    wrap_operator_error(
        ErrorKind::CheckReadiness,
        cause,
        format!("Failed to check {resource} readiness"),
        server_context(&server.name_any(), &server.namespace().unwrap_or_default()),
    )
    .with_context("resource", resource)
}

/// # Errors
///
/// Returns a `CheckReadiness` error when the Deployment cannot be read.
pub async fn check_deployment_ready<S>(store: &S, server: &MCPServer) -> Result<bool, OperatorError>
where
    S: ObjectStore<Deployment> + ?Sized,
{
    let namespace = server.namespace().unwrap_or_default();
    let deployment = store
        .get(&namespace, &server.name_any())
        .await
        .map_err(|e| check_failed(server, "deployment", e))?;
    Ok(deployment.as_ref().is_some_and(is_deployment_ready))
}

/// # Errors
///
/// Returns a `CheckReadiness` error when the Service cannot be read.
pub async fn check_service_ready<S>(store: &S, server: &MCPServer) -> Result<bool, OperatorError>
where
    S: ObjectStore<Service> + ?Sized,
{
    let namespace = server.namespace().unwrap_or_default();
    let service = store
        .get(&namespace, &server.name_any())
        .await
        .map_err(|e| check_failed(server, "service", e))?;
    Ok(service.is_some())
}

/// # Errors
///
/// Returns a `CheckReadiness` error when the Ingress cannot be read.
pub async fn check_ingress_ready<S>(store: &S, server: &MCPServer) -> Result<bool, OperatorError>
where
    S: ObjectStore<Ingress> + ?Sized,
{
    let namespace = server.namespace().unwrap_or_default();
    let ingress = store
        .get(&namespace, &server.name_any())
        .await
        .map_err(|e| check_failed(server, "ingress", e))?;
    Ok(ingress.is_some())
}

/// Evaluate all three flags from the live objects
///
/// # Errors
///
/// Returns the first `CheckReadiness` error.
pub async fn check_resource_readiness<S>(
    store: &S,
    server: &MCPServer,
) -> Result<Readiness, OperatorError>
where
    S: ObjectStore<Deployment> + ObjectStore<Service> + ObjectStore<Ingress> + ?Sized,
{
    Ok(Readiness {
        deployment: check_deployment_ready(store, server).await?,
        service: check_service_ready(store, server).await?,
        ingress: check_ingress_ready(store, server).await?,
    })
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};

    use super::*;
    use crate::controller::store::memory::MemoryStore;
    use crate::crd::MCPServerSpec;

    fn deployment(desired: Option<i32>, ready: Option<i32>) -> Deployment {
        Deployment {
            spec: Some(DeploymentSpec {
                replicas: desired,
                ..DeploymentSpec::default()
            }),
            status: Some(DeploymentStatus {
                ready_replicas: ready,
                ..DeploymentStatus::default()
            }),
            ..Deployment::default()
        }
    }

    fn server() -> MCPServer {
        let mut server = MCPServer::new("test-server", MCPServerSpec::default());
        server.metadata.namespace = Some("default".to_string());
        server
    }

    #[test]
    fn test_deployment_ready_requires_matching_replicas() {
        assert!(is_deployment_ready(&deployment(Some(2), Some(2))));
        assert!(!is_deployment_ready(&deployment(Some(2), Some(1))));
        assert!(!is_deployment_ready(&deployment(Some(2), None)));
        assert!(!is_deployment_ready(&deployment(None, Some(1))));
        assert!(!is_deployment_ready(&deployment(Some(0), Some(0))));
    }

    #[tokio::test]
    async fn test_check_readiness_not_found_is_not_ready() {
        let store = MemoryStore::new();
        let readiness = check_resource_readiness(&store, &server()).await.unwrap();
        assert_eq!(readiness, Readiness::default());
        assert!(!readiness.all_ready());
    }

    #[tokio::test]
    async fn test_check_service_ready_on_existence() {
        let store = MemoryStore::new();
        let service = Service {
            metadata: kube::api::ObjectMeta {
                name: Some("test-server".to_string()),
                ..Default::default()
            },
            ..Service::default()
        };
        ObjectStore::<Service>::create(&store, "default", &service)
            .await
            .unwrap();

        assert!(check_service_ready(&store, &server()).await.unwrap());
        assert!(!check_ingress_ready(&store, &server()).await.unwrap());
    }

    #[tokio::test]
    async fn test_check_readiness_surfaces_api_failures() {
        let store = MemoryStore::new();
        store.fail("Ingress", "get");

        let err = check_resource_readiness(&store, &server()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CheckReadiness);
        assert_eq!(err.context().get("resource").map(String::as_str), Some("ingress"));
    }
}
