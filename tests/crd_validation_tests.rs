//! # CRD Validation Tests
//!
//! Sample manifests deserialize into the Rust types and the generated CRD
//! carries the names and subresources the operator relies on.

use mcp_runtime_operator::controller::crdgen::generate_crd_yaml;
use mcp_runtime_operator::crd::{MCPServer, MCPServerStatus, ServerPhase};

#[test]
fn test_full_manifest_deserializes() {
    let yaml = r#"
apiVersion: mcp-runtime.org/v1alpha1
kind: MCPServer
metadata:
  name: weather
  namespace: tools
spec:
  image: ghcr.io/acme/weather
  imageTag: "1.4.0"
  registryOverride: registry.local:5000
  replicas: 2
  port: 9000
  servicePort: 8080
  ingressHost: mcp.example.com
  ingressPath: /weather/mcp
  ingressClass: nginx
  ingressAnnotations:
    nginx.ingress.kubernetes.io/proxy-read-timeout: "3600"
  envVars:
    - name: LOG_LEVEL
      value: debug
    - name: REGION
      value: eu-west-1
  imagePullSecrets:
    - regcred
  resources:
    requests:
      cpu: 250m
    limits:
      memory: 1Gi
"#;

    let server: MCPServer =
        serde_yaml::from_str(yaml).expect("Should deserialize a fully populated MCPServer");

    let spec = &server.spec;
    assert_eq!(spec.image, "ghcr.io/acme/weather");
    assert_eq!(spec.image_tag.as_deref(), Some("1.4.0"));
    assert_eq!(spec.registry_override.as_deref(), Some("registry.local:5000"));
    assert_eq!(spec.replicas, Some(2));
    assert_eq!(spec.port, Some(9000));
    assert_eq!(spec.service_port, Some(8080));
    assert_eq!(spec.ingress_host.as_deref(), Some("mcp.example.com"));
    assert_eq!(
        spec.ingress_annotations["nginx.ingress.kubernetes.io/proxy-read-timeout"],
        "3600"
    );
    let env: Vec<(&str, &str)> = spec
        .env_vars
        .iter()
        .map(|var| (var.name.as_str(), var.value.as_str()))
        .collect();
    assert_eq!(env, vec![("LOG_LEVEL", "debug"), ("REGION", "eu-west-1")]);
    assert_eq!(spec.image_pull_secrets, vec!["regcred".to_string()]);

    let resources = spec.resources.as_ref().unwrap();
    assert_eq!(
        resources.requests.as_ref().unwrap().cpu.as_deref(),
        Some("250m")
    );
    assert_eq!(resources.requests.as_ref().unwrap().memory, None);
    assert_eq!(
        resources.limits.as_ref().unwrap().memory.as_deref(),
        Some("1Gi")
    );
}

#[test]
fn test_minimal_manifest_leaves_optionals_unset() {
    let yaml = r"
apiVersion: mcp-runtime.org/v1alpha1
kind: MCPServer
metadata:
  name: demo
spec:
  image: test-image
";

    let server: MCPServer = serde_yaml::from_str(yaml).expect("Should deserialize minimal MCPServer");
    assert_eq!(server.spec.replicas, None);
    assert_eq!(server.spec.ingress_host, None);
    assert!(server.spec.env_vars.is_empty());
    assert!(server.status.is_none());
}

#[test]
fn test_status_serializes_camel_case_flags() {
    let status = MCPServerStatus {
        phase: Some(ServerPhase::Ready),
        message: Some("All resources reconciled".to_string()),
        deployment_ready: true,
        service_ready: true,
        ingress_ready: true,
        observed_generation: Some(4),
    };

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["phase"], "Ready");
    assert_eq!(value["deploymentReady"], true);
    assert_eq!(value["serviceReady"], true);
    assert_eq!(value["ingressReady"], true);
    assert_eq!(value["observedGeneration"], 4);
}

#[test]
fn test_generated_crd_matches_group_and_kind() {
    let yaml = generate_crd_yaml().expect("Should render the CRD");
    assert!(yaml.contains("group: mcp-runtime.org"));
    assert!(yaml.contains("kind: MCPServer"));
    assert!(yaml.contains("plural: mcpservers"));
    assert!(yaml.contains("name: v1alpha1"));
    assert!(yaml.contains("scope: Namespaced"));
}

#[test]
fn test_printer_columns_name_deployment_readiness() {
    use kube::CustomResourceExt;

    let crd = MCPServer::crd();
    let columns = crd.spec.versions[0]
        .additional_printer_columns
        .clone()
        .unwrap_or_default();
    let names: Vec<(&str, &str)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.json_path.as_str()))
        .collect();

    assert_eq!(
        names,
        vec![
            ("Phase", ".status.phase"),
            ("DeploymentReady", ".status.deploymentReady"),
            ("Message", ".status.message"),
        ]
    );
}
