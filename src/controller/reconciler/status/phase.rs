//! # Phase Determination
//!
//! Pure mapping from readiness flags to a status.

use crate::controller::reconciler::readiness::Readiness;
use crate::crd::{MCPServerStatus, ServerPhase};

/// `Ready` iff all three objects are ready, otherwise `Pending`
///
/// `Failed` is never produced here; the reconciler sets it directly when
/// validation rejects a server.
#[must_use]
pub fn determine_phase(
    deployment_ready: bool,
    service_ready: bool,
    ingress_ready: bool,
) -> (ServerPhase, bool) {
    if deployment_ready && service_ready && ingress_ready {
        (ServerPhase::Ready, true)
    } else {
        (ServerPhase::Pending, false)
    }
}

/// Status for the given phase, message and readiness at `generation`
#[must_use]
pub fn build_status(
    phase: ServerPhase,
    message: impl Into<String>,
    readiness: Readiness,
    generation: Option<i64>,
) -> MCPServerStatus {
    MCPServerStatus {
        phase: Some(phase),
        message: Some(message.into()),
        deployment_ready: readiness.deployment,
        service_ready: readiness.service,
        ingress_ready: readiness.ingress,
        observed_generation: generation,
    }
}
