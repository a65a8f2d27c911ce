//! Ingress synthesizer

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use kube::ResourceExt;

use super::{merge_meta, object_meta, Synthesizer};
use crate::constants::{
    DEFAULT_INGRESS_CLASS, DEFAULT_INGRESS_ENTRYPOINTS, DEFAULT_SERVICE_PORT,
    INGRESS_ENTRYPOINTS_ANNOTATION, INGRESS_PATH_TYPE,
};
use crate::crd::{MCPServer, MCPServerSpec};
use crate::errors::{ErrorKind, OperatorError};

/// Single-rule Ingress routing `ingressHost` + `ingressPath` to the Service
///
/// A missing host produces a rule without `host`, which matches every host.
#[derive(Debug)]
pub struct IngressSynthesizer;

impl Synthesizer for IngressSynthesizer {
    type Object = Ingress;

    const RESOURCE: &'static str = "ingress";
    const ERROR_KIND: ErrorKind = ErrorKind::ReconcileIngress;

    fn desired(server: &MCPServer) -> Result<Ingress, OperatorError> {
        let name = server.name_any();
        let spec = &server.spec;

        let host = spec
            .ingress_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        let path = spec
            .ingress_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map_or_else(|| format!("/{name}/mcp"), str::to_string);
        let class = spec
            .ingress_class
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_INGRESS_CLASS.to_string());

        let mut metadata = object_meta(server);
        metadata.annotations = Some(build_ingress_annotations(spec));

        Ok(Ingress {
            metadata,
            spec: Some(IngressSpec {
                ingress_class_name: Some(class),
                rules: Some(vec![IngressRule {
                    host,
                    http: Some(HTTPIngressRuleValue {
                        paths: vec![HTTPIngressPath {
                            path: Some(path),
                            path_type: INGRESS_PATH_TYPE.to_string(),
                            backend: IngressBackend {
                                service: Some(IngressServiceBackend {
                                    name,
                                    port: Some(ServiceBackendPort {
                                        number: Some(
                                            spec.service_port.unwrap_or(DEFAULT_SERVICE_PORT),
                                        ),
                                        ..ServiceBackendPort::default()
                                    }),
                                }),
                                ..IngressBackend::default()
                            },
                        }],
                    }),
                }]),
                ..IngressSpec::default()
            }),
            ..Ingress::default()
        })
    }

    fn merge_owned(live: &mut Ingress, desired: &Ingress) {
        merge_meta(&mut live.metadata, &desired.metadata);

        let Some(desired_spec) = desired.spec.as_ref() else {
            return;
        };
        // tls and defaultBackend are left to whoever set them
        let live_spec = live.spec.get_or_insert_with(IngressSpec::default);
        live_spec
            .ingress_class_name
            .clone_from(&desired_spec.ingress_class_name);
        live_spec.rules.clone_from(&desired_spec.rules);
    }
}

/// User annotations plus the default entrypoint annotation when the user did not set it
#[must_use]
pub fn build_ingress_annotations(spec: &MCPServerSpec) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::from([(
        INGRESS_ENTRYPOINTS_ANNOTATION.to_string(),
        DEFAULT_INGRESS_ENTRYPOINTS.to_string(),
    )]);
    annotations.extend(
        spec.ingress_annotations
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    annotations
}
