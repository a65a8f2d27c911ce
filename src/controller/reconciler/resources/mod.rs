//! # Resource Synthesizers
//!
//! Desired-state builders for the Deployment, Service and Ingress of an
//! MCPServer, and the get / create / update primitive that applies them.
//!
//! Each kind implements [`Synthesizer`]:
//! - `desired` builds the object from the (defaulted) spec
//! - `merge_owned` copies only the fields this operator owns from the desired
//!   object onto the live one; everything else on the live object (resource
//!   version, fields defaulted by the API server, foreign labels/annotations,
//!   extra containers) is left as found
//!
//! [`apply`] creates the object when absent, and otherwise replaces it only if
//! the owned-field merge actually changed something.

mod deployment;
mod ingress;
mod service;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use tracing::{debug, info};

use crate::constants::{APP_LABEL, MANAGED_BY_LABEL, MANAGED_BY_VALUE};
use crate::controller::store::ObjectStore;
use crate::crd::MCPServer;
use crate::errors::{server_context, wrap_operator_error, ErrorKind, OperatorError};
use crate::observability::metrics;

pub use deployment::{
    apply_container_resources, build_env_vars, build_image_pull_secrets, DeploymentSynthesizer,
};
pub use ingress::{build_ingress_annotations, IngressSynthesizer};
pub use service::ServiceSynthesizer;

/// Desired-state strategy for one managed object kind
pub trait Synthesizer {
    type Object: Resource<DynamicType = ()> + Clone + PartialEq + Send + Sync + 'static;

    /// Lowercase resource name used in logs, metrics and error context
    const RESOURCE: &'static str;

    /// Error kind reported when applying this object fails
    const ERROR_KIND: ErrorKind;

    /// Build the desired object for `server`
    ///
    /// # Errors
    ///
    /// Returns a validation error when the spec cannot be turned into a valid object.
    fn desired(server: &MCPServer) -> Result<Self::Object, OperatorError>;

    /// Copy the operator-owned fields of `desired` onto `live`
    fn merge_owned(live: &mut Self::Object, desired: &Self::Object);
}

/// Create the object if it does not exist, else update its owned fields in place
///
/// # Errors
///
/// Returns the synthesizer's validation error, or an error of kind
/// [`Synthesizer::ERROR_KIND`] wrapping the failed store call.
pub async fn apply<Syn, S>(store: &S, server: &MCPServer) -> Result<(), OperatorError>
where
    Syn: Synthesizer,
    S: ObjectStore<Syn::Object> + ?Sized,
{
    let name = server.name_any();
    let namespace = server.namespace().unwrap_or_default();
    let desired = Syn::desired(server)?;

    let failed = |operation: &str, cause: anyhow::Error| {
        wrap_operator_error(
            Syn::ERROR_KIND,
            cause,
            format!("Failed to {operation} {}", Syn::RESOURCE),
            server_context(&name, &namespace),
        )
        .with_context("resource", Syn::RESOURCE)
        .with_context("operation", operation)
    };

    let live = store
        .get(&namespace, &name)
        .await
        .map_err(|e| failed("get", e))?;

    match live {
        None => {
            store
                .create(&namespace, &desired)
                .await
                .map_err(|e| failed("create", e))?;
            metrics::increment_resource_operation(Syn::RESOURCE, "create");
            info!(resource = Syn::RESOURCE, name = %name, "Created {}", Syn::RESOURCE);
        }
        Some(live) => {
            let mut merged = live.clone();
            Syn::merge_owned(&mut merged, &desired);
            if merged == live {
                debug!(resource = Syn::RESOURCE, name = %name, "{} is up to date", Syn::RESOURCE);
                return Ok(());
            }
            store
                .replace(&namespace, &name, &merged)
                .await
                .map_err(|e| failed("update", e))?;
            metrics::increment_resource_operation(Syn::RESOURCE, "update");
            info!(resource = Syn::RESOURCE, name = %name, "Updated {}", Syn::RESOURCE);
        }
    }

    Ok(())
}

/// Identity labels carried by every managed object and pod template
#[must_use]
pub fn resource_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (APP_LABEL.to_string(), name.to_string()),
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
    ])
}

/// Metadata for a managed object: same name and namespace as the MCPServer,
/// identity labels, and a controller owner reference when the server has a UID
pub(crate) fn object_meta(server: &MCPServer) -> ObjectMeta {
    let name = server.name_any();
    ObjectMeta {
        labels: Some(resource_labels(&name)),
        namespace: server.namespace(),
        owner_references: server.controller_owner_ref(&()).map(|owner| vec![owner]),
        name: Some(name),
        ..ObjectMeta::default()
    }
}

/// Merge the operator-owned metadata (labels, annotations, owner reference)
pub(crate) fn merge_meta(live: &mut ObjectMeta, desired: &ObjectMeta) {
    merge_map(&mut live.labels, desired.labels.as_ref());
    merge_map(&mut live.annotations, desired.annotations.as_ref());

    for owner in desired.owner_references.iter().flatten() {
        let owners = live.owner_references.get_or_insert_with(Vec::new);
        if !owners.iter().any(|existing| existing.uid == owner.uid) {
            owners.push(owner.clone());
        }
    }
}

/// Insert every entry of `source` into `target`, keeping unrelated keys
pub(crate) fn merge_map(
    target: &mut Option<BTreeMap<String, String>>,
    source: Option<&BTreeMap<String, String>>,
) {
    let Some(source) = source.filter(|map| !map.is_empty()) else {
        return;
    };
    let target = target.get_or_insert_with(BTreeMap::new);
    for (key, value) in source {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_map_keeps_foreign_keys() {
        let mut live = Some(BTreeMap::from([
            ("team".to_string(), "a".to_string()),
            (APP_LABEL.to_string(), "old".to_string()),
        ]));
        merge_map(&mut live, Some(&resource_labels("demo")));

        let live = live.unwrap();
        assert_eq!(live.get("team").map(String::as_str), Some("a"));
        assert_eq!(live.get(APP_LABEL).map(String::as_str), Some("demo"));
        assert_eq!(live.get(MANAGED_BY_LABEL).map(String::as_str), Some("mcp-runtime"));
    }

    #[test]
    fn test_merge_map_ignores_empty_source() {
        let mut live = None;
        merge_map(&mut live, Some(&BTreeMap::new()));
        assert!(live.is_none());
    }

    #[test]
    fn test_object_meta_sets_owner_reference_when_uid_present() {
        let mut server = MCPServer::new("demo", crate::crd::MCPServerSpec::default());
        server.metadata.namespace = Some("default".to_string());
        assert!(object_meta(&server).owner_references.is_none());

        server.metadata.uid = Some("1234".to_string());
        let meta = object_meta(&server);
        let owners = meta.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "MCPServer");
        assert_eq!(owners[0].controller, Some(true));
        assert_eq!(meta.namespace.as_deref(), Some("default"));
    }
}
