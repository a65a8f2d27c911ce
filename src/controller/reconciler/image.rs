//! # Image Resolver
//!
//! Computes the container image reference from the MCPServer spec.
//!
//! `image` is taken as-is, `imageTag` is appended when the image does not
//! already name a tag or digest, and `registryOverride` then becomes the
//! registry part of the reference. Pure string handling, no registry lookups.

use crate::crd::MCPServerSpec;
use crate::errors::{new_operator_error, ErrorContext, ErrorKind, OperatorError};

/// Resolve the final image reference for the server container
///
/// # Errors
///
/// Returns a `MissingImage` error when `spec.image` is empty.
pub fn resolve_image(spec: &MCPServerSpec) -> Result<String, OperatorError> {
    let image = spec.image.trim();
    if image.is_empty() {
        return Err(new_operator_error(
            ErrorKind::MissingImage,
            "spec.image is required",
            ErrorContext::new(),
        ));
    }

    let mut reference = image.to_string();
    if let Some(tag) = non_empty(spec.image_tag.as_deref()) {
        if !has_tag(&reference) {
            reference = format!("{reference}:{tag}");
        }
    }

    if let Some(registry) = non_empty(spec.registry_override.as_deref()) {
        reference = rewrite_registry(&reference, registry);
    }

    Ok(reference)
}

/// Whether the image already names a tag or digest
///
/// Only the last path segment is inspected so a registry port
/// (`reg:5000/nginx`) is not taken for a tag.
#[must_use]
pub fn has_tag(image: &str) -> bool {
    if image.contains('@') {
        return true;
    }
    let last_segment = image.rsplit('/').next().unwrap_or(image);
    last_segment.contains(':')
}

/// Point an image reference at another registry
///
/// An existing registry host (first segment containing `.` or `:`, or
/// `localhost`) is replaced; otherwise the registry is prepended.
#[must_use]
pub fn rewrite_registry(image: &str, registry: &str) -> String {
    let registry = registry.trim().trim_end_matches('/');
    if registry.is_empty() {
        return image.to_string();
    }

    let path = match image.split_once('/') {
        Some((first, rest)) if is_registry_host(first) => rest,
        _ => image,
    };
    format!("{registry}/{path}")
}

fn is_registry_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(image: &str, tag: &str, registry: &str) -> MCPServerSpec {
        MCPServerSpec {
            image: image.to_string(),
            image_tag: Some(tag.to_string()),
            registry_override: Some(registry.to_string()),
            ..MCPServerSpec::default()
        }
    }

    #[test]
    fn test_resolve_image_with_registry_override_and_tag() {
        let image = resolve_image(&spec("test-image", "v1.0.0", "test-registry")).unwrap();
        assert_eq!(image, "test-registry/test-image:v1.0.0");
    }

    #[test]
    fn test_resolve_image_rejects_empty_image() {
        let err = resolve_image(&spec("  ", "latest", "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingImage);
    }

    #[test]
    fn test_rewrite_registry_prepends_to_bare_image() {
        assert_eq!(
            rewrite_registry("test-image", "registry.registry.svc.cluster.local:5000"),
            "registry.registry.svc.cluster.local:5000/test-image"
        );
    }

    #[test]
    fn test_rewrite_registry_replaces_existing_host() {
        assert_eq!(
            rewrite_registry("docker.io/library/nginx:1.19", "reg:5000/"),
            "reg:5000/library/nginx:1.19"
        );
        assert_eq!(
            rewrite_registry("localhost/team/server", "reg:5000"),
            "reg:5000/team/server"
        );
    }

    #[test]
    fn test_rewrite_registry_keeps_organisation_segment() {
        assert_eq!(rewrite_registry("team/server", "reg:5000"), "reg:5000/team/server");
    }

    #[test]
    fn test_has_tag_ignores_registry_port() {
        assert!(!has_tag("reg:5000/nginx"));
        assert!(has_tag("reg:5000/nginx:1.19"));
        assert!(has_tag("nginx@sha256:abcdef"));
        assert!(!has_tag("nginx"));
    }
}
