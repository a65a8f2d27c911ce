//! # Reconciliation Logic
//!
//! One reconciliation pass for an MCPServer:
//!
//! 1. fetch the server (gone: done)
//! 2. validate feature-gated fields (failure: `Failed` status, error, no writes to children)
//! 3. apply defaults (changed: persist the spec and requeue right away)
//! 4. apply Deployment, Service, Ingress in that order (first failure aborts)
//! 5. evaluate readiness from the live objects
//! 6. determine the phase and write status
//!
//! Every fatal branch is logged through [`log_operator_error`] under the pass's
//! span. Nothing here retries; the error policy decides when to run again.

use std::sync::Arc;
use std::time::Instant;

use kube::ResourceExt;
use kube_runtime::controller::Action;
use tracing::{debug, info, warn, Instrument, Span};

use crate::config::ControllerConfig;
use crate::controller::reconciler::defaults::apply_defaults;
use crate::controller::reconciler::readiness::{check_resource_readiness, Readiness};
use crate::controller::reconciler::resources::{
    apply, DeploymentSynthesizer, IngressSynthesizer, ServiceSynthesizer,
};
use crate::controller::reconciler::status::{determine_phase, update_status};
use crate::controller::reconciler::types::{Outcome, Reconciler, ReconcilerError};
use crate::controller::reconciler::validation::validate_server;
use crate::controller::store::{ClusterStore, ObjectStore};
use crate::crd::{MCPServer, ServerPhase};
use crate::errors::{
    log_operator_error, server_context, wrap_operator_error, ErrorKind, OperatorError,
};
use crate::observability::metrics;

/// Controller entry point
///
/// Wraps [`reconcile_server`] with the reconciliation span, metrics, backoff
/// reset and the outcome-to-[`Action`] mapping. Errors go to the error policy.
///
/// # Errors
///
/// Returns [`ReconcilerError`] when the pass failed.
pub async fn reconcile<S>(
    server: Arc<MCPServer>,
    ctx: Arc<Reconciler<S>>,
) -> Result<Action, ReconcilerError>
where
    S: ClusterStore + 'static,
{
    let start = Instant::now();
    let name = server.name_any();
    let namespace = server.namespace().unwrap_or_default();

    let span = tracing::info_span!(
        "reconcile",
        resource.name = %name,
        resource.namespace = %namespace,
        resource.kind = "MCPServer"
    );

    metrics::increment_reconciliations();
    let result = reconcile_server(&ctx.store, &namespace, &name, &span)
        .instrument(span.clone())
        .await;
    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

    let outcome = result?;
    ctx.reset_backoff(&namespace, &name);
    metrics::increment_requeue(outcome.as_str());
    Ok(action_for(outcome, &ctx.config))
}

/// Map a pass outcome to the controller's requeue action
#[must_use]
pub fn action_for(outcome: Outcome, config: &ControllerConfig) -> Action {
    match outcome {
        Outcome::Done => Action::requeue(config.resync_interval()),
        Outcome::RequeueNow => Action::requeue(config.requeue_now_delay()),
        Outcome::RequeueAfter(delay) => Action::requeue(delay),
    }
}

/// Run one reconciliation pass for `namespace/name`
///
/// # Errors
///
/// Returns the [`OperatorError`] of the first fatal step. Validation errors
/// have already been recorded on the status as `Failed`.
pub async fn reconcile_server<S>(
    store: &S,
    namespace: &str,
    name: &str,
    span: &Span,
) -> Result<Outcome, OperatorError>
where
    S: ClusterStore + ?Sized,
{
    info!(parent: span, "🔄 Reconciling MCPServer {namespace}/{name}");

    let fetched = <S as ObjectStore<MCPServer>>::get(store, namespace, name)
        .await
        .map_err(|e| {
            fatal(
                span,
                wrap_operator_error(
                    ErrorKind::FetchServer,
                    e,
                    "Failed to fetch MCPServer",
                    server_context(name, namespace),
                ),
            )
        })?;
    let Some(mut server) = fetched else {
        debug!(parent: span, "MCPServer {namespace}/{name} not found, nothing to reconcile");
        return Ok(Outcome::Done);
    };

    if let Err(err) = validate_server(&server) {
        return Err(record_failure(store, &server, fatal(span, err), span).await);
    }

    if apply_defaults(&mut server) {
        <S as ObjectStore<MCPServer>>::replace(store, namespace, name, &server)
            .await
            .map_err(|e| {
                fatal(
                    span,
                    wrap_operator_error(
                        ErrorKind::ApplyDefaults,
                        e,
                        "Failed to persist defaulted spec",
                        server_context(name, namespace),
                    ),
                )
            })?;
        info!(parent: span, "Applied defaults to MCPServer {namespace}/{name}, requeueing");
        return Ok(Outcome::RequeueNow);
    }

    if let Err(err) = apply_resources(store, &server).await {
        let err = fatal(span, err);
        if err.is_validation() {
            return Err(record_failure(store, &server, err, span).await);
        }
        return Err(err);
    }

    let readiness = check_resource_readiness(store, &server)
        .await
        .map_err(|e| fatal(span, e))?;

    let (phase, all_ready) =
        determine_phase(readiness.deployment, readiness.service, readiness.ingress);
    let message = status_message(readiness);
    update_status(store, &server, phase, &message, readiness)
        .await
        .map_err(|e| fatal(span, e))?;

    if all_ready {
        info!(parent: span, "✅ MCPServer {namespace}/{name} is ready");
    } else {
        info!(parent: span, phase = %phase, "{message}");
    }
    Ok(Outcome::Done)
}

async fn apply_resources<S>(store: &S, server: &MCPServer) -> Result<(), OperatorError>
where
    S: ClusterStore + ?Sized,
{
    apply::<DeploymentSynthesizer, S>(store, server).await?;
    apply::<ServiceSynthesizer, S>(store, server).await?;
    apply::<IngressSynthesizer, S>(store, server).await
}

fn fatal(span: &Span, err: OperatorError) -> OperatorError {
    log_operator_error(span, &err, err.kind().as_str());
    err
}

/// Write a `Failed` status for a validation error and hand the error back
///
/// The readiness flags still come from the live objects, so a server that
/// was converged before its spec broke keeps reporting what actually exists.
async fn record_failure<S>(
    store: &S,
    server: &MCPServer,
    err: OperatorError,
    span: &Span,
) -> OperatorError
where
    S: ClusterStore + ?Sized,
{
    metrics::increment_validation_failures();
    let readiness = match check_resource_readiness(store, server).await {
        Ok(readiness) => readiness,
        Err(read_err) => {
            warn!(parent: span, "Failed to read readiness for failed status: {}", read_err.debug_string());
            Readiness::default()
        }
    };
    if let Err(status_err) =
        update_status(store, server, ServerPhase::Failed, err.message(), readiness).await
    {
        warn!(parent: span, "Failed to record validation failure on status: {}", status_err.debug_string());
    }
    err
}

fn status_message(readiness: Readiness) -> String {
    if readiness.all_ready() {
        return "All resources reconciled".to_string();
    }
    let waiting: Vec<&str> = [
        (readiness.deployment, "deployment"),
        (readiness.service, "service"),
        (readiness.ingress, "ingress"),
    ]
    .into_iter()
    .filter(|(ready, _)| !ready)
    .map(|(_, resource)| resource)
    .collect();
    format!("Waiting for {} to become ready", waiting.join(", "))
}
