//! # Image Resolution Tests
//!
//! Table-driven checks of how `image`, `imageTag` and `registryOverride`
//! compose into the container image reference.

use mcp_runtime_operator::crd::MCPServerSpec;
use mcp_runtime_operator::errors::ErrorKind;
use mcp_runtime_operator::prelude::resolve_image;

fn spec(image: &str, tag: &str, registry: &str) -> MCPServerSpec {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
    MCPServerSpec {
        image: image.to_string(),
        image_tag: non_empty(tag),
        registry_override: non_empty(registry),
        ..MCPServerSpec::default()
    }
}

#[test]
fn test_image_resolution_table() {
    let cases = [
        ("nginx", "", "", "nginx"),
        ("nginx", "1.19", "", "nginx:1.19"),
        ("nginx", "", "reg:5000", "reg:5000/nginx"),
        ("nginx", "1.19", "reg:5000", "reg:5000/nginx:1.19"),
        ("nginx:1.19", "latest", "", "nginx:1.19"),
    ];

    for (image, tag, registry, expected) in cases {
        assert_eq!(
            resolve_image(&spec(image, tag, registry)).unwrap(),
            expected,
            "image={image:?} tag={tag:?} registry={registry:?}"
        );
    }
}

#[test]
fn test_registry_override_replaces_existing_registry_host() {
    assert_eq!(
        resolve_image(&spec("docker.io/library/nginx", "1.25", "registry.local:5000")).unwrap(),
        "registry.local:5000/library/nginx:1.25"
    );
    assert_eq!(
        resolve_image(&spec("localhost/tools/server", "", "reg:5000/")).unwrap(),
        "reg:5000/tools/server"
    );
}

#[test]
fn test_port_in_registry_is_not_mistaken_for_a_tag() {
    assert_eq!(
        resolve_image(&spec("reg:5000/team/server", "v2", "")).unwrap(),
        "reg:5000/team/server:v2"
    );
}

#[test]
fn test_digest_references_are_left_alone() {
    let digest = "ghcr.io/acme/server@sha256:0123456789abcdef";
    assert_eq!(resolve_image(&spec(digest, "latest", "")).unwrap(), digest);
}

#[test]
fn test_empty_image_is_rejected() {
    let err = resolve_image(&spec("", "1.0", "reg:5000")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingImage);
    assert!(err.is_validation());
}
