//! # Constants
//!
//! Shared constants used throughout the operator.
//!
//! Values that describe the managed objects (labels, annotations, defaults)
//! are part of the contract with other tooling and must stay stable across
//! releases. Runtime knobs can be overridden via configuration.

/// Label carrying the owning MCPServer's name; also the Service selector
pub const APP_LABEL: &str = "app";

/// Label marking objects created by this operator
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`]
pub const MANAGED_BY_VALUE: &str = "mcp-runtime";

/// Field manager / controller name used for API writes
pub const CONTROLLER_NAME: &str = "mcp-runtime-operator";

/// Default ingress controller entrypoint annotation
pub const INGRESS_ENTRYPOINTS_ANNOTATION: &str = "traefik.ingress.kubernetes.io/router.entrypoints";

/// Value of [`INGRESS_ENTRYPOINTS_ANNOTATION`] when the user does not set one
pub const DEFAULT_INGRESS_ENTRYPOINTS: &str = "web";

// Spec defaults applied by the defaulting engine

pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_PORT: i32 = 8088;
pub const DEFAULT_SERVICE_PORT: i32 = 80;
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_INGRESS_CLASS: &str = "traefik";

/// Ingress path type for the single routing rule
pub const INGRESS_PATH_TYPE: &str = "Prefix";

/// Name shared by the container port and the service port
pub const HTTP_PORT_NAME: &str = "http";

// Container resource fallbacks (used when the spec leaves a value unset)

pub const DEFAULT_REQUEST_CPU: &str = "100m";
pub const DEFAULT_REQUEST_MEMORY: &str = "128Mi";
pub const DEFAULT_LIMIT_CPU: &str = "500m";
pub const DEFAULT_LIMIT_MEMORY: &str = "512Mi";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Default periodic resync after a converged pass (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Default delay before the pass that follows a defaulting write (milliseconds)
pub const DEFAULT_REQUEUE_NOW_DELAY_MS: u64 = 0;

/// Default first error backoff (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Default error backoff cap (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Default worker concurrency of the controller
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;
