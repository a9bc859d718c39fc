//! ---
//! flk_section: "05-networking-external-interfaces"
//! flk_subsection: "module"
//! flk_type: "source"
//! flk_scope: "build"
//! flk_description: "gRPC code generation for the orchestrator control plane."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
fn main() {
    let protoc = protoc_bin_vendored::protoc_bin_path().expect("failed to locate protoc");
    std::env::set_var("PROTOC", protoc);
    let include = protoc_bin_vendored::include_path().expect("failed to locate protoc includes");
    std::env::set_var("PROTOC_INCLUDE", include);

    println!("cargo:rerun-if-changed=proto/fleetlink.proto");
    println!("cargo:rerun-if-changed=proto");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/fleetlink.proto"], &["proto"])
        .expect("failed to compile gRPC definitions");
}
