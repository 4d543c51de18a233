//! Per-platform input corrections

use crate::config::InputConfig;

/// Switch Controller profile with A/B and X/Y moved to their printed positions
pub const SWITCH_CONTROLLER_MAPPING: &str = concat!(
    "53776974636820436F6E74726F6C6C65,Switch Controller,",
    "a:b0,b:b1,back:b11,",
    "dpdown:b15,dpleft:b12,dpright:b14,dpup:b13,",
    "leftshoulder:b6,leftstick:b4,lefttrigger:b8,leftx:a0,lefty:a1,",
    "rightshoulder:b7,rightstick:b5,righttrigger:b9,rightx:a2,righty:a3,",
    "start:b10,x:b2,y:b3"
);

/// Corrections applied by the gamepad backend for the running platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformQuirks {
    /// Mappings registered before the subsystem is initialized
    pub mappings: Vec<String>,
    /// Browsers can report a fully-down Y axis as -32768 instead of 32767
    pub axis_overflow_fix: bool,
}

impl PlatformQuirks {
    /// Quirks of the platform this binary was compiled for
    pub fn current() -> Self {
        let mut mappings = Vec::new();
        if cfg!(target_os = "horizon") {
            mappings.push(SWITCH_CONTROLLER_MAPPING.to_string());
        }

        Self {
            mappings,
            axis_overflow_fix: cfg!(target_arch = "wasm32"),
        }
    }

    /// No corrections at all
    pub fn none() -> Self {
        Self {
            mappings: Vec::new(),
            axis_overflow_fix: false,
        }
    }

    /// Platform quirks extended with configured mappings and overrides
    pub fn from_config(config: &InputConfig) -> Self {
        let mut quirks = Self::current();
        quirks.mappings.extend(config.mappings.iter().cloned());
        if let Some(fix) = config.axis_overflow_fix {
            quirks.axis_overflow_fix = fix;
        }
        quirks
    }
}

/// Map the -32768 overflow sentinel back to full positive deflection
pub fn fix_axis_overflow(value: i16) -> i16 {
    if value == i16::MIN {
        i16::MAX
    } else {
        value
    }
}
