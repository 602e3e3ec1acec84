//! Generates the `protocol` module from `proto/thermal.proto`.
//!
//! A `protoc` found through `PROTOC` wins; otherwise the vendored binary is
//! used so the crate builds on machines without protobuf tooling.

use std::env;
use std::error::Error;
use std::path::PathBuf;

const PROTO: &str = "proto/thermal.proto";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={}", PROTO);
    println!("cargo:rerun-if-env-changed=PROTOC");

    if env::var_os("PROTOC").is_none() {
        env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }
    let well_known = protoc_bin_vendored::include_path()?;

    tonic_prost_build::configure()
        .build_client(false)
        .build_server(env::var_os("CARGO_FEATURE_SERVER").is_some())
        .type_attribute(
            ".protocol.FanTable",
            "#[derive(serde::Serialize, serde::Deserialize)]",
        )
        .type_attribute(
            ".protocol.FanTable",
            "#[serde(try_from = \"String\", into = \"String\")]",
        )
        .type_attribute(
            ".protocol.Profile",
            "#[derive(serde::Serialize, serde::Deserialize)]",
        )
        .type_attribute(".protocol.Profile", "#[serde(rename_all = \"camelCase\")]")
        .field_attribute(".protocol.Profile.windows_power_plan", "#[serde(default)]")
        .field_attribute(".protocol.Profile.throttle_plan", "#[serde(default)]")
        .field_attribute(".protocol.Profile.cpu_fan_curve", "#[serde(default)]")
        .field_attribute(".protocol.Profile.gpu_fan_curve", "#[serde(default)]")
        .field_attribute(".protocol.Profile.fast_switch", "#[serde(default)]")
        .compile_protos(&[PathBuf::from(PROTO)], &[PathBuf::from("proto"), well_known])?;

    Ok(())
}
