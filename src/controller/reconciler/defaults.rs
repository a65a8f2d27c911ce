//! # Defaulting
//!
//! Fills unset optional spec fields. Each field is defaulted independently and
//! only while it is at its zero value (`None`, empty string or a `0` port), so
//! running the defaults again on a defaulted spec changes nothing.
//!
//! `replicas: 0` is an explicit scale-down and is kept.

use kube::ResourceExt;

use crate::constants::{
    DEFAULT_IMAGE_TAG, DEFAULT_INGRESS_CLASS, DEFAULT_PORT, DEFAULT_REPLICAS, DEFAULT_SERVICE_PORT,
};
use crate::controller::reconciler::image::has_tag;
use crate::crd::{MCPServer, MCPServerSpec};

/// Apply defaults to an MCPServer; returns `true` if any field changed
pub fn apply_defaults(server: &mut MCPServer) -> bool {
    let name = server.name_any();
    apply_spec_defaults(&name, &mut server.spec)
}

/// Apply defaults to a spec owned by the MCPServer called `name`
///
/// The ingress path default (`/<name>/mcp`) is skipped when `name` is empty.
pub fn apply_spec_defaults(name: &str, spec: &mut MCPServerSpec) -> bool {
    let mut changed = false;

    if spec.replicas.is_none() {
        spec.replicas = Some(DEFAULT_REPLICAS);
        changed = true;
    }
    changed |= default_int(&mut spec.port, DEFAULT_PORT);
    changed |= default_int(&mut spec.service_port, DEFAULT_SERVICE_PORT);

    if !has_tag(&spec.image) {
        changed |= default_str(&mut spec.image_tag, DEFAULT_IMAGE_TAG);
    }
    if !name.is_empty() {
        changed |= default_str(&mut spec.ingress_path, &format!("/{name}/mcp"));
    }
    changed |= default_str(&mut spec.ingress_class, DEFAULT_INGRESS_CLASS);

    changed
}

fn default_int(field: &mut Option<i32>, default: i32) -> bool {
    if field.is_some_and(|value| value != 0) {
        return false;
    }
    *field = Some(default);
    true
}

/// Whitespace-only values count as unset
fn default_str(field: &mut Option<String>, default: &str) -> bool {
    if field.as_deref().is_some_and(|value| !value.trim().is_empty()) {
        return false;
    }
    *field = Some(default.to_string());
    true
}
