//! Persisted registry schema and its YAML load/save mechanics.
//!
//! The on-disk form is deliberately loose: every bind field is optional so
//! a hand-edited or stale file still loads, and malformed entries are
//! pruned with a log line instead of failing the whole registry.

pub mod path;


use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::input::bind::{Bind, BindInput, BindOutput, DEFAULT_DEADZONE};
use crate::input::capability::{DeviceAxis, GameAction, GameAxis, HatDirection};
use crate::input::device::InputDevice;
use crate::input::registry::InputRegistry;

/// Represents all possible errors loading or saving a [RegistryConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// The whole persisted registry: device list plus global settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct RegistryConfig {
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    #[serde(default = "default_input_active")]
    pub input_active_by_default: bool,
    #[serde(default = "default_throttle")]
    pub throttle_multiplier: u16,
}

fn default_input_active() -> bool {
    true
}

fn default_throttle() -> u16 {
    1
}

impl Default for RegistryConfig {
    /// Matches the field defaults used during deserialization, so a
    /// missing file and an empty file load identically.
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            input_active_by_default: default_input_active(),
            throttle_multiplier: default_throttle(),
        }
    }
}

/// One persisted device: identity, calibration overrides, binds.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct DeviceConfig {
    pub name: String,
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisRangeConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<BindConfig>,
}

/// A persisted axis calibration range. Either bound may be omitted to keep
/// the device-reported value.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AxisRangeConfig {
    pub axis: DeviceAxis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
}

/// The loose on-disk form of a bind. Exactly one input selector
/// (`axis`/`button`/`hat_axis`) and one output selector
/// (`output_axis`/`output_action`) must be present for the entry to be
/// valid; anything else is pruned at load time.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BindConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<DeviceAxis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat_axis: Option<HatDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_axis: Option<GameAxis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_action: Option<GameAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<f32>,
}

impl BindConfig {
    /// Convert to a structurally valid [Bind]. Returns `None` when the
    /// entry is missing a selector on either side; selector precedence is
    /// axis, then button, then hat.
    pub fn to_bind(&self) -> Option<Bind> {
        let input = if let Some(axis) = self.axis {
            BindInput::Axis {
                axis,
                invert: self.invert.unwrap_or(false),
            }
        } else if let Some(button) = self.button {
            BindInput::Button { button }
        } else if let Some(direction) = self.hat_axis {
            BindInput::Hat {
                hat: self.hat.unwrap_or(0),
                direction,
            }
        } else {
            return None;
        };

        let output = if let Some(axis) = self.output_axis {
            BindOutput::Axis(axis)
        } else if let Some(action) = self.output_action {
            BindOutput::Action(action)
        } else {
            return None;
        };

        let bind = Bind::new(input, output).with_shaping(
            self.deadzone.unwrap_or(DEFAULT_DEADZONE),
            self.curve.unwrap_or(0.0),
        );
        Some(bind)
    }

    pub fn from_bind(bind: &Bind) -> Self {
        let mut config = BindConfig::default();
        match bind.input {
            BindInput::Axis { axis, invert } => {
                config.axis = Some(axis);
                if invert {
                    config.invert = Some(true);
                }
                if bind.deadzone != DEFAULT_DEADZONE {
                    config.deadzone = Some(bind.deadzone);
                }
                if bind.curve != 0.0 {
                    config.curve = Some(bind.curve);
                }
            }
            BindInput::Button { button } => config.button = Some(button),
            BindInput::Hat { hat, direction } => {
                config.hat = Some(hat);
                config.hat_axis = Some(direction);
            }
        }
        match bind.output {
            BindOutput::Axis(axis) => config.output_axis = Some(axis),
            BindOutput::Action(action) => config.output_action = Some(action),
        }
        config
    }
}

impl RegistryConfig {
    /// Load a [RegistryConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<RegistryConfig, LoadError> {
        let config: RegistryConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [RegistryConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<RegistryConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: RegistryConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Write the config to the given YAML file, creating parent
    /// directories as needed.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LoadError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self).map_err(LoadError::from)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the registry file, failing soft: a missing file yields the
    /// defaults, and a corrupted file is renamed aside with a timestamp so
    /// the next save starts clean. This never raises past the call.
    pub fn load_or_quarantine<P: AsRef<Path>>(path: P) -> RegistryConfig {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No registry file at {path:?}, using defaults");
            return RegistryConfig::default();
        }

        match Self::from_yaml_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load registry file {path:?}: {e}");
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                let mut quarantined = path.as_os_str().to_os_string();
                quarantined.push(format!(".corrupt-{secs}"));
                match std::fs::rename(path, &quarantined) {
                    Ok(()) => log::warn!("Moved corrupt registry aside to {quarantined:?}"),
                    Err(rename_err) => {
                        log::warn!("Unable to quarantine corrupt registry: {rename_err}")
                    }
                }
                RegistryConfig::default()
            }
        }
    }

    /// Build the runtime registry. Malformed binds are pruned here, with a
    /// log line each, so they are never evaluated.
    pub fn into_registry(self) -> InputRegistry {
        let mut registry = InputRegistry::new();
        registry.input_active_by_default = self.input_active_by_default;
        registry.throttle_multiplier = self.throttle_multiplier.max(1);

        for device_config in self.devices {
            let mut device = InputDevice::from_config(device_config.name, device_config.id);
            for range in device_config.axes {
                device
                    .calibration
                    .set_override(range.axis, range.min, range.max);
            }
            for bind_config in device_config.binds {
                match bind_config.to_bind() {
                    Some(bind) => device.binds.push(bind),
                    None => log::warn!(
                        "Pruning invalid bind on '{}': {bind_config:?}",
                        device.name()
                    ),
                }
            }
            registry.devices.push(device);
        }
        registry
    }

    pub fn from_registry(registry: &InputRegistry) -> RegistryConfig {
        let devices = registry
            .devices
            .iter()
            .map(|device| DeviceConfig {
                name: device.name().to_string(),
                id: device.uuid(),
                axes: device
                    .calibration
                    .persisted_entries()
                    .into_iter()
                    .map(|(axis, min, max)| AxisRangeConfig { axis, min, max })
                    .collect(),
                binds: device.binds.iter().map(BindConfig::from_bind).collect(),
            })
            .collect();

        RegistryConfig {
            devices,
            input_active_by_default: registry.input_active_by_default,
            throttle_multiplier: registry.throttle_multiplier,
        }
    }
}
