//! Configuration management for contpad
//!
//! Handles loading, parsing, validation and hot-reloading of YAML configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::fs;

use crate::input::gamepad::subsystem::validate_mapping;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Backend selection and gamepad tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InputConfig {
    /// Backends in the order they contribute to the pad each frame
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendKind>,
    /// Left stick deadzone radius in raw axis units (0-32767)
    #[serde(default = "default_deadzone")]
    pub deadzone: u16,
    /// Start with the mouse driving the camera
    #[serde(default)]
    pub mouse_look: bool,
    /// Force the "-32768 means fully down" axis fix on or off (None = platform default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_overflow_fix: Option<bool>,
    /// Extra SDL-format controller mappings registered before init
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            deadzone: default_deadzone(),
            mouse_look: false,
            axis_overflow_fix: None,
            mappings: Vec::new(),
        }
    }
}

/// Input backend kind
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Gamepad,
    Keyboard,
    Null,
}

/// Keyboard binding overrides (scancodes per action)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KeyboardConfig {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub bindings: HashMap<KeyAction, Vec<u32>>,
}

/// Bindable keyboard action
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    A,
    B,
    Z,
    Start,
    L,
    R,
    CUp,
    CDown,
    CLeft,
    CRight,
    StickUp,
    StickDown,
    StickLeft,
    StickRight,
}

/// Poll loop configuration (binary only)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.input.backends.is_empty() {
            anyhow::bail!("At least one input backend must be listed (use 'null' to disable input)");
        }

        let mut seen = HashSet::new();
        for backend in &self.input.backends {
            if !seen.insert(backend) {
                anyhow::bail!("Input backend {:?} is listed more than once", backend);
            }
        }

        if self.input.deadzone > i16::MAX as u16 {
            anyhow::bail!(
                "Deadzone {} is out of range (must be 0-{})",
                self.input.deadzone,
                i16::MAX
            );
        }

        for (idx, mapping) in self.input.mappings.iter().enumerate() {
            validate_mapping(mapping).with_context(|| format!("Controller mapping {}", idx))?;
        }

        // A scancode may only drive one action
        let mut owners: HashMap<u32, KeyAction> = HashMap::new();
        for (action, scancodes) in &self.keyboard.bindings {
            for scancode in scancodes {
                if let Some(other) = owners.insert(*scancode, *action) {
                    if other != *action {
                        anyhow::bail!(
                            "Scancode {:#06x} is bound to both {:?} and {:?}",
                            scancode,
                            other,
                            action
                        );
                    }
                }
            }
        }

        if self.poll.rate_hz == 0 {
            anyhow::bail!("Poll rate must be at least 1 Hz");
        }

        Ok(())
    }
}

fn default_backends() -> Vec<BackendKind> { vec![BackendKind::Gamepad, BackendKind::Keyboard] }
fn default_deadzone() -> u16 { 4960 }
fn default_rate_hz() -> u32 { 30 }
