//! Built-in thermal profiles shipped with the device service

use crate::{FanTable, Profile};

/// Firmware throttle plans
pub mod throttle_plan {
    pub const PERFORMANCE: u32 = 0x00;
    pub const TURBO: u32 = 0x01;
    pub const SILENT: u32 = 0x02;
}

struct DefaultProfile {
    name: &'static str,
    windows_power_plan: &'static str,
    throttle_plan: u32,
    cpu_fan_curve: &'static str,
    gpu_fan_curve: &'static str,
    fast_switch: bool,
}

const DEFAULTS: [DefaultProfile; 6] = [
    DefaultProfile {
        name: "Fanless",
        windows_power_plan: "Balanced",
        throttle_plan: throttle_plan::SILENT,
        cpu_fan_curve: "39c:0%,49c:0%,59c:0%,69c:0%,79c:31%,89c:49%,99c:56%,109c:56%",
        gpu_fan_curve: "39c:0%,49c:0%,59c:0%,69c:0%,79c:34%,89c:51%,99c:61%,109c:61%",
        fast_switch: false,
    },
    DefaultProfile {
        name: "Quiet",
        windows_power_plan: "Balanced",
        throttle_plan: throttle_plan::SILENT,
        cpu_fan_curve: "39c:0%,49c:0%,59c:0%,69c:0%,79c:31%,89c:49%,99c:56%,109c:56%",
        gpu_fan_curve: "39c:0%,49c:0%,59c:0%,69c:0%,79c:34%,89c:51%,99c:61%,109c:61%",
        fast_switch: true,
    },
    DefaultProfile {
        name: "Balanced",
        windows_power_plan: "Balanced",
        throttle_plan: throttle_plan::PERFORMANCE,
        cpu_fan_curve: "20c:0%,50c:10%,55c:10%,60c:10%,65c:31%,70c:49%,75c:56%,98c:56%",
        gpu_fan_curve: "20c:0%,50c:10%,55c:10%,60c:10%,65c:34%,70c:51%,75c:61%,98c:61%",
        fast_switch: true,
    },
    DefaultProfile {
        name: "Performance",
        windows_power_plan: "High performance",
        throttle_plan: throttle_plan::PERFORMANCE,
        cpu_fan_curve: "20c:10%,50c:20%,55c:25%,60c:40%,65c:45%,70c:55%,75c:90%,98c:100%",
        gpu_fan_curve: "20c:10%,50c:20%,55c:25%,60c:40%,65c:45%,70c:55%,75c:90%,98c:100%",
        fast_switch: true,
    },
    DefaultProfile {
        name: "Turbo",
        windows_power_plan: "High performance",
        throttle_plan: throttle_plan::TURBO,
        cpu_fan_curve: "20c:10%,40c:25%,50c:30%,60c:80%,65c:90%,70c:100%,75c:100%,98c:100%",
        gpu_fan_curve: "20c:10%,40c:35%,50c:45%,60c:80%,65c:90%,70c:100%,75c:100%,98c:100%",
        fast_switch: true,
    },
    DefaultProfile {
        name: "Full Speed",
        windows_power_plan: "High performance",
        throttle_plan: throttle_plan::TURBO,
        cpu_fan_curve: "20c:100%,40c:100%,50c:100%,60c:100%,65c:100%,70c:100%,75c:100%,98c:100%",
        gpu_fan_curve: "20c:100%,40c:100%,50c:100%,60c:100%,65c:100%,70c:100%,75c:100%,98c:100%",
        fast_switch: false,
    },
];

impl DefaultProfile {
    fn to_profile(&self) -> Profile {
        Profile {
            name: self.name.to_string(),
            windows_power_plan: self.windows_power_plan.to_string(),
            throttle_plan: self.throttle_plan,
            cpu_fan_curve: FanTable::parse(self.cpu_fan_curve).ok(),
            gpu_fan_curve: FanTable::parse(self.gpu_fan_curve).ok(),
            fast_switch: self.fast_switch,
        }
    }
}

/// The six profiles the service ships with, in cycling order.
pub fn default_profiles() -> Vec<Profile> {
    DEFAULTS.iter().map(DefaultProfile::to_profile).collect()
}

/// Look up a built-in profile by name, ignoring case.
pub fn default_profile(name: &str) -> Option<Profile> {
    DEFAULTS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
        .map(DefaultProfile::to_profile)
}
