//! Deployment synthesizer

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar as K8sEnvVar, LocalObjectReference, PodSpec, PodTemplateSpec,
    ResourceRequirements as K8sResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::ResourceExt;

use super::{merge_map, merge_meta, object_meta, resource_labels, Synthesizer};
use crate::constants::{
    APP_LABEL, DEFAULT_LIMIT_CPU, DEFAULT_LIMIT_MEMORY, DEFAULT_PORT, DEFAULT_REPLICAS,
    DEFAULT_REQUEST_CPU, DEFAULT_REQUEST_MEMORY, HTTP_PORT_NAME,
};
use crate::controller::reconciler::image::resolve_image;
use crate::controller::reconciler::validation::is_valid_quantity;
use crate::crd::{EnvVar, MCPServer, ResourceRequirements};
use crate::errors::{new_operator_error, ErrorContext, ErrorKind, OperatorError};

#[derive(Debug)]
pub struct DeploymentSynthesizer;

impl Synthesizer for DeploymentSynthesizer {
    type Object = Deployment;

    const RESOURCE: &'static str = "deployment";
    const ERROR_KIND: ErrorKind = ErrorKind::ReconcileDeployment;

    fn desired(server: &MCPServer) -> Result<Deployment, OperatorError> {
        let name = server.name_any();
        let namespace = server.namespace().unwrap_or_default();
        let spec = &server.spec;
        let with_server = |err: OperatorError| {
            err.with_context("mcpServer", &name)
                .with_context("namespace", &namespace)
                .with_context("resource", "deployment")
        };

        let image = resolve_image(spec).map_err(with_server)?;
        let labels = resource_labels(&name);

        let env = build_env_vars(&spec.env_vars);
        let mut container = Container {
            name: name.clone(),
            image: Some(image),
            ports: Some(vec![ContainerPort {
                name: Some(HTTP_PORT_NAME.to_string()),
                container_port: spec.port.unwrap_or(DEFAULT_PORT),
                protocol: Some("TCP".to_string()),
                ..ContainerPort::default()
            }]),
            env: (!env.is_empty()).then_some(env),
            ..Container::default()
        };
        apply_container_resources(&mut container, spec.resources.as_ref()).map_err(with_server)?;

        let pull_secrets = build_image_pull_secrets(&spec.image_pull_secrets);

        Ok(Deployment {
            metadata: object_meta(server),
            spec: Some(DeploymentSpec {
                replicas: Some(spec.replicas.unwrap_or(DEFAULT_REPLICAS)),
                selector: LabelSelector {
                    match_labels: Some(BTreeMap::from([(APP_LABEL.to_string(), name)])),
                    ..LabelSelector::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..ObjectMeta::default()
                    }),
                    spec: Some(PodSpec {
                        containers: vec![container],
                        image_pull_secrets: (!pull_secrets.is_empty()).then_some(pull_secrets),
                        ..PodSpec::default()
                    }),
                },
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        })
    }

    fn merge_owned(live: &mut Deployment, desired: &Deployment) {
        merge_meta(&mut live.metadata, &desired.metadata);

        let Some(desired_spec) = desired.spec.as_ref() else {
            return;
        };
        let live_spec = live.spec.get_or_insert_with(DeploymentSpec::default);
        live_spec.replicas = desired_spec.replicas;

        // The selector is immutable after creation and is never touched here
        if let Some(desired_meta) = desired_spec.template.metadata.as_ref() {
            let live_meta = live_spec
                .template
                .metadata
                .get_or_insert_with(ObjectMeta::default);
            merge_map(&mut live_meta.labels, desired_meta.labels.as_ref());
        }

        let Some(desired_pod) = desired_spec.template.spec.as_ref() else {
            return;
        };
        let live_pod = live_spec.template.spec.get_or_insert_with(PodSpec::default);
        live_pod
            .image_pull_secrets
            .clone_from(&desired_pod.image_pull_secrets);

        for desired_container in &desired_pod.containers {
            match live_pod
                .containers
                .iter_mut()
                .find(|c| c.name == desired_container.name)
            {
                Some(container) => {
                    container.image.clone_from(&desired_container.image);
                    container.ports.clone_from(&desired_container.ports);
                    container.env.clone_from(&desired_container.env);
                    container.resources.clone_from(&desired_container.resources);
                }
                None => live_pod.containers.push(desired_container.clone()),
            }
        }
    }
}

/// Copy environment variables 1:1, preserving order
#[must_use]
pub fn build_env_vars(env_vars: &[EnvVar]) -> Vec<K8sEnvVar> {
    env_vars
        .iter()
        .map(|var| K8sEnvVar {
            name: var.name.clone(),
            value: Some(var.value.clone()),
            ..K8sEnvVar::default()
        })
        .collect()
}

/// Turn secret names into pod image pull secret references
#[must_use]
pub fn build_image_pull_secrets(secrets: &[String]) -> Vec<LocalObjectReference> {
    secrets
        .iter()
        .map(|secret| LocalObjectReference {
            name: secret.clone(),
        })
        .collect()
}

/// Set CPU / memory requests and limits on `container`
///
/// Each of the four values takes the user override when present and the
/// operator default otherwise.
///
/// # Errors
///
/// Returns an `InvalidCpuRequest` / `InvalidMemoryRequest` / `InvalidCpuLimit` /
/// `InvalidMemoryLimit` error for an override that is not a valid quantity.
pub fn apply_container_resources(
    container: &mut Container,
    resources: Option<&ResourceRequirements>,
) -> Result<(), OperatorError> {
    let requests = resources.and_then(|r| r.requests.as_ref());
    let limits = resources.and_then(|r| r.limits.as_ref());

    let request_cpu = quantity(
        requests.and_then(|r| r.cpu.as_deref()),
        DEFAULT_REQUEST_CPU,
        ErrorKind::InvalidCpuRequest,
        "resources.requests.cpu",
    )?;
    let request_memory = quantity(
        requests.and_then(|r| r.memory.as_deref()),
        DEFAULT_REQUEST_MEMORY,
        ErrorKind::InvalidMemoryRequest,
        "resources.requests.memory",
    )?;
    let limit_cpu = quantity(
        limits.and_then(|l| l.cpu.as_deref()),
        DEFAULT_LIMIT_CPU,
        ErrorKind::InvalidCpuLimit,
        "resources.limits.cpu",
    )?;
    let limit_memory = quantity(
        limits.and_then(|l| l.memory.as_deref()),
        DEFAULT_LIMIT_MEMORY,
        ErrorKind::InvalidMemoryLimit,
        "resources.limits.memory",
    )?;

    container.resources = Some(K8sResourceRequirements {
        requests: Some(resource_map(request_cpu, request_memory)),
        limits: Some(resource_map(limit_cpu, limit_memory)),
        ..K8sResourceRequirements::default()
    });
    Ok(())
}

fn resource_map(cpu: Quantity, memory: Quantity) -> BTreeMap<String, Quantity> {
    BTreeMap::from([("cpu".to_string(), cpu), ("memory".to_string(), memory)])
}

fn quantity(
    value: Option<&str>,
    default: &str,
    kind: ErrorKind,
    field: &str,
) -> Result<Quantity, OperatorError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(Quantity(default.to_string()));
    };
    if !is_valid_quantity(value) {
        return Err(new_operator_error(
            kind,
            format!("{field} '{value}' is not a valid quantity"),
            ErrorContext::new(),
        )
        .with_context("field", field)
        .with_context("value", value));
    }
    Ok(Quantity(value.to_string()))
}
