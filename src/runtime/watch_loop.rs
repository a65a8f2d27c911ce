//! # Watch Loop
//!
//! Controller watch loop that monitors MCPServer resources and the objects
//! they own, and triggers reconciliation when changes are detected.

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::Api;
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource};
use kube_runtime::controller::{Config as ControllerRuntimeConfig, Error as ControllerError};
use kube_runtime::{watcher, Controller};
use tracing::{debug, info, warn, Instrument};

use crate::constants::{MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::controller::server::ServerState;
use crate::controller::store::KubeStore;
use crate::crd::MCPServer;
use crate::runtime::error_policy::{error_policy, handle_watch_stream_error};

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Run the controller watch loop
///
/// Changes to a server or to any Deployment, Service or Ingress it owns
/// trigger a reconciliation. Watch errors are retried by the watcher with
/// its default backoff, so the stream only ends on SIGINT/SIGTERM, after
/// in-flight reconciliations have finished.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for startup errors.
pub async fn run_watch_loop(
    client: Client,
    servers: Api<MCPServer>,
    reconciler: Arc<Reconciler>,
    server_state: Arc<ServerState>,
) -> Result<(), anyhow::Error> {
    let namespace = reconciler.config.watch_namespace.clone();
    let concurrency = reconciler.config.max_concurrent_reconciliations;

    // Fail readiness as soon as a shutdown signal arrives
    let shutdown_server_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
        shutdown_server_state.mark_not_ready();
        info!("Marked server as not ready, waiting for in-flight reconciliations to complete...");
    });

    let watch_span = tracing::span!(
        tracing::Level::INFO,
        "controller.watch",
        operation = "watch_loop"
    );

    // Children are only watched when they carry the managed-by label
    let managed = format!("{MANAGED_BY_LABEL}={MANAGED_BY_VALUE}");
    let owned_config = || watcher::Config::default().labels(&managed);

    info!(parent: &watch_span, concurrency, "Starting controller watch loop...");
    Controller::new(servers, watcher::Config::default().any_semantic())
        .owns(
            scoped_api::<Deployment>(&client, namespace.as_deref()),
            owned_config(),
        )
        .owns(
            scoped_api::<Service>(&client, namespace.as_deref()),
            owned_config(),
        )
        .owns(
            scoped_api::<Ingress>(&client, namespace.as_deref()),
            owned_config(),
        )
        .with_config(ControllerRuntimeConfig::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(reconcile::<KubeStore>, error_policy::<KubeStore>, reconciler)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(resource = %object, action = ?action, "watch.event.reconciled");
                }
                // Already logged and scheduled by the error policy
                Err(ControllerError::ReconcilerFailed(err, object)) => {
                    debug!(resource = %object, error = %err, "watch.event.reconciliation_failed");
                }
                Err(e) => handle_watch_stream_error(&format!("{e:?}")),
            }
        })
        .instrument(watch_span)
        .await;

    server_state.mark_not_ready();
    info!("Controller stopped gracefully");
    Ok(())
}
