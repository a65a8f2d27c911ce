//! # Status Writer
//!
//! Writes phase, message and readiness flags to the status subresource.

use kube::ResourceExt;
use tracing::debug;

use super::build_status;
use crate::controller::reconciler::readiness::Readiness;
use crate::controller::store::{ClusterStore, ObjectStore};
use crate::crd::{MCPServer, ServerPhase};
use crate::errors::{server_context, wrap_operator_error, ErrorKind, OperatorError};
use crate::observability::metrics;

/// Update the MCPServer status
///
/// The latest object is fetched first so `observedGeneration` reflects the
/// stored spec. The write is skipped when the stored status already matches,
/// which keeps the watch from firing on no-op passes. A server deleted in the
/// meantime is not an error.
///
/// # Errors
///
/// Returns an `UpdateStatus` error when the fetch or the status patch fails.
pub async fn update_status<S>(
    store: &S,
    server: &MCPServer,
    phase: ServerPhase,
    message: &str,
    readiness: Readiness,
) -> Result<(), OperatorError>
where
    S: ClusterStore + ?Sized,
{
    let name = server.name_any();
    let namespace = server.namespace().unwrap_or_default();
    let failed = |cause: anyhow::Error| {
        metrics::increment_status_update("error");
        wrap_operator_error(
            ErrorKind::UpdateStatus,
            cause,
            "Failed to update MCPServer status",
            server_context(&name, &namespace),
        )
        .with_context("phase", phase)
    };

    let Some(latest) = <S as ObjectStore<MCPServer>>::get(store, &namespace, &name)
        .await
        .map_err(failed)?
    else {
        debug!(name = %name, "MCPServer no longer exists, skipping status update");
        return Ok(());
    };

    let status = build_status(phase, message, readiness, latest.metadata.generation);
    if latest.status.as_ref() == Some(&status) {
        debug!(name = %name, phase = %phase, "Skipping status update - status unchanged");
        metrics::increment_status_update("skipped");
        return Ok(());
    }

    store
        .patch_status(&namespace, &name, &status)
        .await
        .map_err(failed)?;
    metrics::increment_status_update("written");
    debug!(name = %name, phase = %phase, "Updated status");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::store::memory::MemoryStore;
    use crate::crd::MCPServerSpec;

    fn seeded() -> (MemoryStore, MCPServer) {
        let store = MemoryStore::new();
        let mut server = MCPServer::new("test-server", MCPServerSpec::default());
        server.metadata.namespace = Some("default".to_string());
        store.insert_server(server);
        let server = store.server("default", "test-server").unwrap();
        (store, server)
    }

    #[tokio::test]
    async fn test_update_status_writes_phase_and_flags() {
        let (store, server) = seeded();
        let readiness = Readiness {
            deployment: true,
            service: true,
            ingress: true,
        };

        update_status(&store, &server, ServerPhase::Ready, "All resources reconciled", readiness)
            .await
            .unwrap();

        let status = store.server("default", "test-server").unwrap().status.unwrap();
        assert_eq!(status.phase, Some(ServerPhase::Ready));
        assert_eq!(status.message.as_deref(), Some("All resources reconciled"));
        assert!(status.deployment_ready && status.service_ready && status.ingress_ready);
        assert_eq!(status.observed_generation, Some(1));
    }

    #[tokio::test]
    async fn test_update_status_skips_identical_write() {
        let (store, server) = seeded();
        let readiness = Readiness::default();

        update_status(&store, &server, ServerPhase::Pending, "Waiting", readiness)
            .await
            .unwrap();
        update_status(&store, &server, ServerPhase::Pending, "Waiting", readiness)
            .await
            .unwrap();

        assert_eq!(store.status_patches().len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_ignores_deleted_server() {
        let store = MemoryStore::new();
        let mut server = MCPServer::new("gone", MCPServerSpec::default());
        server.metadata.namespace = Some("default".to_string());

        update_status(&store, &server, ServerPhase::Pending, "Waiting", Readiness::default())
            .await
            .unwrap();
        assert!(store.status_patches().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_patch_failure() {
        let (store, server) = seeded();
        store.fail("MCPServer", "patch_status");

        let err = update_status(&store, &server, ServerPhase::Pending, "Waiting", Readiness::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpdateStatus);
        assert_eq!(err.context().get("phase").map(String::as_str), Some("Pending"));
    }
}
