//! # MCP Runtime Operator
//!
//! A Kubernetes operator that turns `MCPServer` resources into a running
//! Deployment, a ClusterIP Service and an Ingress, and reports their
//! readiness on the resource's status.
//!
//! ## Usage
//!
//! ```bash
//! # Install the CRD
//! cargo run --bin crdgen | kubectl apply -f -
//!
//! # Run against the current kube context, watching every namespace
//! mcp-runtime-operator
//!
//! # Watch a single namespace with JSON logs
//! mcp-runtime-operator --watch-namespace mcp-servers --log-format json
//! ```
//!
//! Every flag falls back to its environment variable (see
//! [`ControllerConfig::from_env`]) and then to the built-in default.

use anyhow::Result;
use clap::Parser;

use mcp_runtime_operator::config::ControllerConfig;
use mcp_runtime_operator::runtime::{init_tracing, initialize, run_watch_loop};

/// MCP runtime operator
#[derive(Debug, Parser)]
#[command(name = "mcp-runtime-operator", version, about, long_about = None)]
struct Cli {
    /// Port for /metrics, /healthz and /readyz
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Only watch MCPServers in this namespace
    #[arg(long)]
    watch_namespace: Option<String>,

    /// Log format: text or json
    #[arg(long)]
    log_format: Option<String>,

    /// Maximum number of reconciliations running at once
    #[arg(long)]
    max_concurrent_reconciliations: Option<u16>,

    /// Seconds between resyncs of a converged server
    #[arg(long)]
    resync_interval_secs: Option<u64>,
}

impl Cli {
    fn apply(self, mut config: ControllerConfig) -> ControllerConfig {
        if let Some(port) = self.metrics_port {
            config.metrics_port = port;
        }
        if let Some(namespace) = self.watch_namespace {
            config.watch_namespace = Some(namespace);
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(concurrency) = self.max_concurrent_reconciliations {
            config.max_concurrent_reconciliations = concurrency;
        }
        if let Some(interval) = self.resync_interval_secs {
            config.resync_interval_secs = interval;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().apply(ControllerConfig::from_env());
    init_tracing(&config)?;

    let init = initialize(config).await?;
    run_watch_loop(init.client, init.servers, init.reconciler, init.server_state).await
}
