//! # Validation
//!
//! Checks run before a pass mutates anything, plus the resource quantity
//! grammar used by the Deployment synthesizer.

use std::sync::LazyLock;

use kube::ResourceExt;
use regex::Regex;

use crate::crd::MCPServer;
use crate::errors::{new_operator_error, server_context, ErrorKind, OperatorError};

/// Kubernetes quantity: optionally `+`-signed decimal number with an optional
/// SI, binary or exponent suffix. Negative values are not accepted.
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+|n|u|m|k|M|G|T|P|E|Ki|Mi|Gi|Ti|Pi|Ei)?$")
        .expect("Failed to compile quantity regex")
});

/// Validate the fields required by the features an MCPServer enables
///
/// - `image` must be set
/// - when `ingressHost` is set, `ingressPath` must be set too
///
/// # Errors
///
/// Returns a validation-kind [`OperatorError`] with the server's name and
/// namespace in its context.
pub fn validate_server(server: &MCPServer) -> Result<(), OperatorError> {
    let name = server.name_any();
    let namespace = server.namespace().unwrap_or_default();
    let spec = &server.spec;

    if spec.image.trim().is_empty() {
        return Err(new_operator_error(
            ErrorKind::MissingImage,
            "spec.image is required",
            server_context(&name, &namespace),
        ));
    }

    let host_set = spec.ingress_host.as_deref().is_some_and(|h| !h.trim().is_empty());
    let path_set = spec.ingress_path.as_deref().is_some_and(|p| !p.trim().is_empty());
    if host_set && !path_set {
        return Err(new_operator_error(
            ErrorKind::MissingIngressPath,
            "ingressPath is required when ingressHost is set",
            server_context(&name, &namespace),
        )
        .with_context("resource", "ingress"));
    }

    Ok(())
}

/// Whether `value` parses as a non-negative Kubernetes quantity (e.g. `100m`, `1.5Gi`, `2e3`)
#[must_use]
pub fn is_valid_quantity(value: &str) -> bool {
    QUANTITY_REGEX.is_match(value.trim())
}
