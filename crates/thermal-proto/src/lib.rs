//! Protocol definitions for the device thermal-profile service.
//!
//! The `protocol` module is generated from `proto/thermal.proto` at build
//! time; it mirrors the `protocol.Thermal` schema spoken by the local
//! device-management service.
//!
//! Besides the wire types this crate carries the fan-curve text format
//! (`"39c:0%,49c:0%,..."`) and the built-in default profiles, and, behind the
//! `server` feature, the generated `thermal_server` module for implementing
//! the service.

pub mod defaults;
pub mod fan_table;

/// Generated `protocol.Thermal` messages and service code.
pub mod protocol {
    tonic::include_proto!("protocol");
}

pub use defaults::{default_profile, default_profiles, throttle_plan};
pub use fan_table::{FanCurveError, FAN_CURVE_POINTS};
pub use protocol::{FanTable, Profile, ThermalResponse, UpdateProfileRequest};

#[cfg(feature = "server")]
pub use protocol::thermal_server;

/// Fully qualified gRPC service name
pub const SERVICE_NAME: &str = "protocol.Thermal";

/// HTTP/2 paths of the service procedures
pub mod paths {
    pub const GET_CURRENT_PROFILE: &str = "/protocol.Thermal/GetCurrentProfile";
    pub const UPDATE_PROFILE: &str = "/protocol.Thermal/UpdateProfile";
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    fn sample_profile() -> Profile {
        Profile {
            name: "Balanced".to_string(),
            windows_power_plan: "Balanced".to_string(),
            throttle_plan: 0,
            cpu_fan_curve: Some(
                FanTable::parse("20c:0%,50c:10%,55c:10%,60c:10%,65c:31%,70c:49%,75c:56%,98c:56%")
                    .unwrap(),
            ),
            gpu_fan_curve: None,
            fast_switch: true,
        }
    }

    #[test]
    fn test_profile_wire_round_trip() {
        let profile = sample_profile();
        let bytes = profile.encode_to_vec();
        let decoded = Profile::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn test_response_wraps_profile() {
        let response = ThermalResponse {
            success: true,
            profile: Some(sample_profile()),
        };
        let decoded = ThermalResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert!(decoded.success);
        assert_eq!(decoded.profile.unwrap().name, "Balanced");
    }

    #[test]
    fn test_default_response_encodes_to_nothing() {
        assert!(ThermalResponse::default().encode_to_vec().is_empty());
    }

    #[test]
    fn test_profile_json_uses_textual_fan_curves() {
        let json = serde_json::to_value(sample_profile()).unwrap();
        assert_eq!(json["windowsPowerPlan"], "Balanced");
        assert_eq!(
            json["cpuFanCurve"],
            "20c:0%,50c:10%,55c:10%,60c:10%,65c:31%,70c:49%,75c:56%,98c:56%"
        );
        assert!(json["gpuFanCurve"].is_null());

        let back: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_profile());
    }

    #[test]
    fn test_profile_json_rejects_bad_curve() {
        let json = r#"{"name": "Broken", "cpuFanCurve": "20c:0%,50c:10%"}"#;
        let err = serde_json::from_str::<Profile>(json).unwrap_err();
        assert!(err.to_string().contains("expected 8 points"));
    }

    #[test]
    fn test_paths_name_the_service() {
        for path in [paths::GET_CURRENT_PROFILE, paths::UPDATE_PROFILE] {
            assert!(path.starts_with(&format!("/{}/", SERVICE_NAME)));
        }
    }
}
