//! # CRD Generator
//!
//! Renders the `MCPServer` CustomResourceDefinition from the Rust types via
//! `kube`'s `CustomResourceExt`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > config/crd/mcpserver.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;

use crate::crd::MCPServer;

const HEADER: &str = "\
# This file is auto-generated by crdgen
# DO NOT EDIT THIS FILE MANUALLY
# Change the types in src/crd/ and regenerate
#
---
";

/// CRD YAML with the generated-file header
///
/// # Errors
///
/// Returns an error when the CRD cannot be serialized.
pub fn generate_crd_yaml() -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(&MCPServer::crd())?;
    Ok(format!("{HEADER}{yaml}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_crd_names_the_resource() {
        let yaml = generate_crd_yaml().unwrap();
        assert!(yaml.starts_with("# This file is auto-generated by crdgen"));
        assert!(yaml.contains("name: mcpservers.mcp-runtime.org"));
        assert!(yaml.contains("kind: MCPServer"));
        assert!(yaml.contains("- mcps"));
        assert!(yaml.contains("status: {}"));
    }
}
