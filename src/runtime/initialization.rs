//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, and Kubernetes client setup.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::EnvFilter;

use crate::config::ControllerConfig;
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::controller::store::KubeStore;
use crate::crd::MCPServer;
use crate::observability;

const DEFAULT_LOG_FILTER: &str = "mcp_runtime_operator=info";

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// API for the watched MCPServers (one namespace or all)
    pub servers: Api<MCPServer>,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Install the tracing subscriber
///
/// `RUST_LOG` takes precedence over the built-in filter. `log_format` picks
/// between human-readable text and JSON lines.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(config: &ControllerConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Reconciler setup
///
/// Tracing must already be set up via [`init_tracing`].
///
/// # Errors
///
/// Returns an error when any of the steps above fails.
pub async fn initialize(config: ControllerConfig) -> Result<InitializationResult> {
    // Required for rustls 0.23+ before any TLS connection is made
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting MCP runtime operator");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e.debug_string()))
        .context("Invalid controller configuration")?;

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());

    // Start HTTP server for metrics and probes in the background, but wait
    // for it to bind before going further so probes pass immediately
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server_ready(&server_state, &server_handle, &config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let servers: Api<MCPServer> = match config.watch_namespace.as_deref() {
        Some(namespace) => {
            info!("Watching MCPServer resources in namespace {}", namespace);
            Api::namespaced(client.clone(), namespace)
        }
        None => {
            info!("Watching MCPServer resources in all namespaces");
            Api::all(client.clone())
        }
    };

    log_existing_resources(&servers).await;

    let reconciler = Arc::new(Reconciler::new(KubeStore::new(client.clone()), config));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        servers,
        reconciler,
        server_state,
    })
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    config: &ControllerConfig,
) -> Result<()> {
    let startup_timeout = config.server_startup_timeout();
    let poll_interval = config.server_poll_interval();
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }

        if server_state.ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Log a per-namespace summary of the servers that exist at startup
///
/// The controller reconciles all of them on its initial list; this only
/// checks that the CRD is installed and gives operators something to read.
async fn log_existing_resources(servers: &Api<MCPServer>) {
    let startup_span = tracing::span!(
        tracing::Level::INFO,
        "controller.startup.list_existing",
        operation = "list_existing_resources"
    );
    let listed = servers
        .list(&ListParams::default())
        .instrument(startup_span.clone())
        .await;
    let _guard = startup_span.enter();

    match listed {
        Ok(list) => {
            let by_namespace = group_by_namespace(&list.items);
            info!(
                "CRD is queryable, found {} existing MCPServer resources in {} namespaces",
                list.items.len(),
                by_namespace.len()
            );
            for (namespace, names) in &by_namespace {
                info!("  {} ({}): {}", namespace, names.len(), summarize(names));
            }
        }
        Err(e) => {
            error!("CRD is not queryable; {:?}. Is the CRD installed?", e);
            error!("Installation: cargo run --bin crdgen | kubectl apply -f -");
            warn!("Continuing despite CRD queryability check failure - controller will retry");
        }
    }
}

fn group_by_namespace(servers: &[MCPServer]) -> BTreeMap<String, Vec<String>> {
    let mut by_namespace: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for server in servers {
        by_namespace
            .entry(server.namespace().unwrap_or_default())
            .or_default()
            .push(server.name_any());
    }
    for names in by_namespace.values_mut() {
        names.sort();
    }
    by_namespace
}

fn summarize(names: &[String]) -> String {
    if names.len() <= 3 {
        names.join(", ")
    } else {
        format!("{}, ... ({} total)", names[..3].join(", "), names.len())
    }
}
