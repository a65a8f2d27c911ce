//! Service synthesizer

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

use super::{merge_meta, object_meta, Synthesizer};
use crate::constants::{APP_LABEL, DEFAULT_PORT, DEFAULT_SERVICE_PORT, HTTP_PORT_NAME};
use crate::crd::MCPServer;
use crate::errors::{ErrorKind, OperatorError};

/// ClusterIP Service forwarding `servicePort` to the container port
#[derive(Debug)]
pub struct ServiceSynthesizer;

impl Synthesizer for ServiceSynthesizer {
    type Object = Service;

    const RESOURCE: &'static str = "service";
    const ERROR_KIND: ErrorKind = ErrorKind::ReconcileService;

    fn desired(server: &MCPServer) -> Result<Service, OperatorError> {
        let spec = &server.spec;
        Ok(Service {
            metadata: object_meta(server),
            spec: Some(ServiceSpec {
                type_: Some("ClusterIP".to_string()),
                selector: Some(BTreeMap::from([(APP_LABEL.to_string(), server.name_any())])),
                ports: Some(vec![ServicePort {
                    name: Some(HTTP_PORT_NAME.to_string()),
                    port: spec.service_port.unwrap_or(DEFAULT_SERVICE_PORT),
                    target_port: Some(IntOrString::Int(spec.port.unwrap_or(DEFAULT_PORT))),
                    protocol: Some("TCP".to_string()),
                    ..ServicePort::default()
                }]),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        })
    }

    fn merge_owned(live: &mut Service, desired: &Service) {
        merge_meta(&mut live.metadata, &desired.metadata);

        let Some(desired_spec) = desired.spec.as_ref() else {
            return;
        };
        // clusterIP and friends are assigned by the API server and stay as they are
        let live_spec = live.spec.get_or_insert_with(ServiceSpec::default);
        live_spec.type_.clone_from(&desired_spec.type_);
        live_spec.selector.clone_from(&desired_spec.selector);
        live_spec.ports.clone_from(&desired_spec.ports);
    }
}
