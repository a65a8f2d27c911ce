//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop.
//! This module handles reconciliation errors and watch stream errors.

use std::sync::Arc;
use std::time::Duration;

use kube::ResourceExt;
use kube_runtime::controller::Action;
use tracing::{error, info, warn};

use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::controller::store::ClusterStore;
use crate::crd::MCPServer;
use crate::observability::metrics;

/// Handle reconciliation errors with Fibonacci backoff
///
/// Backoff state is tracked per resource, so one failing server never slows
/// down the others. A successful pass clears the state again.
pub fn error_policy<S>(
    obj: Arc<MCPServer>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler<S>>,
) -> Action
where
    S: ClusterStore,
{
    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_default();

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.name = name.as_str(),
        resource.namespace = namespace.as_str(),
        error.code = error.operator_error().code()
    );
    let _error_guard = error_span.enter();

    error!(
        "Reconciliation error for {}/{}: {}",
        namespace,
        name,
        error.operator_error().debug_string()
    );
    metrics::increment_reconciliation_errors();

    let resource_key = Reconciler::<S>::resource_key(&namespace, &name);
    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(resource_key).or_insert_with(|| {
                BackoffState::new(ctx.config.backoff_min_secs, ctx.config.backoff_max_secs)
            });
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(e) => {
            warn!(
                "Failed to lock backoff_states: {}, using maximum backoff",
                e
            );
            (ctx.config.backoff_max_secs, 0)
        }
    };

    let next_trigger_time = chrono::Utc::now()
        + chrono::Duration::seconds(i64::try_from(backoff_seconds).unwrap_or(i64::MAX));

    info!(
        "🔄 Retrying with Fibonacci backoff: {}s (error count: {}, trigger source: error-backoff)",
        backoff_seconds, error_count
    );
    info!(
        "📅 Next retry scheduled: {} (in {}s)",
        next_trigger_time.to_rfc3339(),
        backoff_seconds
    );

    metrics::increment_requeue("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}

/// Watch stream error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorClass {
    /// 401: RBAC revoked or token expired
    Unauthorized,
    /// 410: resource version too old, normal after restarts
    Expired,
    /// 429: API server throttling or storage reinitializing
    Throttled,
    /// 404: CRD missing or resource deleted
    NotFound,
    Other,
}

/// Classify a watch stream error from its rendered message
///
/// 404 is checked before 401 because a plain-text 404 body surfaces as a
/// deserialization error that also mentions the failed watch.
#[must_use]
pub fn classify_watch_error(error_string: &str) -> WatchErrorClass {
    let is_not_found = error_string.contains("ObjectNotFound")
        || error_string.contains("404")
        || error_string.contains("not found");
    if is_not_found {
        return WatchErrorClass::NotFound;
    }
    if error_string.contains("401") || error_string.contains("Unauthorized") {
        return WatchErrorClass::Unauthorized;
    }
    if error_string.contains("410")
        || error_string.contains("too old resource version")
        || error_string.contains("Expired")
        || error_string.contains("Gone")
    {
        return WatchErrorClass::Expired;
    }
    if error_string.contains("429")
        || error_string.contains("storage is (re)initializing")
        || error_string.contains("TooManyRequests")
    {
        return WatchErrorClass::Throttled;
    }
    WatchErrorClass::Other
}

/// Log a watch stream error with operator-facing hints
///
/// The watcher retries on its own; this only makes the failure visible.
pub fn handle_watch_stream_error(error_string: &str) {
    let error_span = tracing::span!(
        tracing::Level::WARN,
        "controller.watch.error",
        error = %error_string
    );
    let _error_guard = error_span.enter();

    match classify_watch_error(error_string) {
        WatchErrorClass::Unauthorized => {
            error!("❌ Watch authentication failed (401 Unauthorized) - RBAC may have been revoked or token expired");
            error!("   Verify the operator's ClusterRole still grants list/watch on mcpservers, deployments, services and ingresses");
        }
        WatchErrorClass::Expired => {
            warn!(error_type = "410", "watch.error.resource_version_expired");
        }
        WatchErrorClass::Throttled => {
            warn!("API server throttling or reinitializing storage (429), watcher will back off");
        }
        WatchErrorClass::NotFound => {
            warn!(
                "Resource not found (404) - is the MCPServer CRD installed? Error: {}",
                error_string
            );
        }
        WatchErrorClass::Other => {
            error!("Controller stream error: {}", error_string);
        }
    }
}
