//! Prints the `MCPServer` CRD as YAML on stdout.

use mcp_runtime_operator::controller::crdgen::generate_crd_yaml;

fn main() {
    match generate_crd_yaml() {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => {
            eprintln!("Failed to serialize CRD to YAML: {e}");
            std::process::exit(1);
        }
    }
}
