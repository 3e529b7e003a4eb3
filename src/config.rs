//! Configuration structures for the converter
//!
//! Supports TOML serialization for persistent config storage. The config is
//! loaded and validated once at startup; the axis set is read-only for the
//! life of the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Logical output axis identifiers, in frame order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    X,
    Y,
    RX,
    RY,
}

impl AxisId {
    /// Get display name for the axis
    pub fn display_name(&self) -> &'static str {
        match self {
            AxisId::X => "X",
            AxisId::Y => "Y",
            AxisId::RX => "RX",
            AxisId::RY => "RY",
        }
    }

    /// All output axes, in the order sinks expect them
    pub const ALL: &'static [AxisId] = &[AxisId::X, AxisId::Y, AxisId::RX, AxisId::RY];
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Errors from configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Axis {axis}: unknown source axis \"{name}\" (device has: {available})")]
    UnknownSourceAxis {
        axis: AxisId,
        name: String,
        available: String,
    },

    #[error("Axis {axis}: sensitivity must be positive, got {value}")]
    InvalidSensitivity { axis: AxisId, value: f32 },

    #[error("Axis {axis}: expo must be finite, got {value}")]
    InvalidExpo { axis: AxisId, value: f32 },

    #[error("Tick rate must be at least 1 Hz")]
    InvalidTickRate,
}

/// How one output axis is derived from one physical input axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Name of the physical axis feeding this output (e.g. "x", "ry")
    pub source_axis: String,
    /// If true, flips the sign of the scaled, clamped sample
    #[serde(default)]
    pub inverted: bool,
    /// Raw sample multiplier applied before clamping (>1 amplifies
    /// near-center motion reach)
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Weight of the cubic term in the response curve, 0.0 (linear)
    /// to 1.0 (pure cubic). Clamped into range at use time.
    #[serde(default = "default_expo")]
    pub expo: f32,
}

fn default_sensitivity() -> f32 {
    1.5
}
fn default_expo() -> f32 {
    1.0
}

impl AxisConfig {
    fn new(source_axis: &str, inverted: bool) -> Self {
        Self {
            source_axis: source_axis.to_string(),
            inverted,
            sensitivity: default_sensitivity(),
            expo: default_expo(),
        }
    }
}

/// Which virtual-device backend to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    /// Two-stick device with signed 16-bit axes and batched stick commits
    XInput,
    /// Four independent unsigned 8-bit channels, no explicit flush
    Hid,
}

/// Per-axis configuration for the four output axes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSet {
    #[serde(default = "default_axis_x")]
    pub x: AxisConfig,
    #[serde(default = "default_axis_y")]
    pub y: AxisConfig,
    #[serde(default = "default_axis_rx")]
    pub rx: AxisConfig,
    #[serde(default = "default_axis_ry")]
    pub ry: AxisConfig,
}

// Default wiring matches a typical RC transmitter in joystick mode:
// roll on x, throttle on z, pitch on ry, yaw on y, all but yaw inverted.
fn default_axis_x() -> AxisConfig {
    AxisConfig::new("x", true)
}
fn default_axis_y() -> AxisConfig {
    AxisConfig::new("z", true)
}
fn default_axis_rx() -> AxisConfig {
    AxisConfig::new("ry", true)
}
fn default_axis_ry() -> AxisConfig {
    AxisConfig::new("y", false)
}

impl Default for AxisSet {
    fn default() -> Self {
        Self {
            x: default_axis_x(),
            y: default_axis_y(),
            rx: default_axis_rx(),
            ry: default_axis_ry(),
        }
    }
}

impl AxisSet {
    /// Get the config for one output axis
    pub fn get(&self, id: AxisId) -> &AxisConfig {
        match id {
            AxisId::X => &self.x,
            AxisId::Y => &self.y,
            AxisId::RX => &self.rx,
            AxisId::RY => &self.ry,
        }
    }
}

/// Complete converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Name for the virtual gamepad device
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Which connected joystick to read (0 = first)
    #[serde(default)]
    pub joystick_index: usize,
    /// Virtual-device backend
    #[serde(default = "default_backend")]
    pub backend: OutputBackend,
    /// Update rate of the conversion loop in Hz
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Axis configurations
    #[serde(default)]
    pub axes: AxisSet,
}

fn default_device_name() -> String {
    "Flyjoy".to_string()
}
fn default_backend() -> OutputBackend {
    OutputBackend::XInput
}
fn default_tick_hz() -> u32 {
    30
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            joystick_index: 0,
            backend: default_backend(),
            tick_hz: default_tick_hz(),
            axes: AxisSet::default(),
        }
    }
}

impl ConverterConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flyjoy")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ConverterConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &PathBuf) -> anyhow::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the numeric fields.
    ///
    /// Source-axis names are validated separately when the pipeline is
    /// constructed, since they depend on the connected joystick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &id in AxisId::ALL {
            let axis = self.axes.get(id);
            // The negated comparison also rejects NaN
            if !(axis.sensitivity > 0.0) || !axis.sensitivity.is_finite() {
                return Err(ConfigError::InvalidSensitivity {
                    axis: id,
                    value: axis.sensitivity,
                });
            }
            // A NaN expo would survive the use-time clamp and poison
            // every frame; out-of-range finite values are fine (clamped)
            if !axis.expo.is_finite() {
                return Err(ConfigError::InvalidExpo {
                    axis: id,
                    value: axis.expo,
                });
            }
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = ConverterConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("Flyjoy"));
        assert!(toml_str.contains("backend = \"xinput\""));
        assert!(toml_str.contains("source_axis = \"ry\""));
    }

    #[test]
    fn test_roundtrip() {
        let config = ConverterConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConverterConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.device_name, config.device_name);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.axes.y.source_axis, "z");
        assert!(parsed.axes.y.inverted);
        assert!(!parsed.axes.ry.inverted);
    }

    #[test]
    fn test_partial_config_gets_defaults() {
        let toml_str = r#"
backend = "hid"

[axes.x]
source_axis = "rx"
sensitivity = 2.0
"#;
        let config: ConverterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend, OutputBackend::Hid);
        assert_eq!(config.tick_hz, 30);
        assert_eq!(config.axes.x.source_axis, "rx");
        assert_eq!(config.axes.x.sensitivity, 2.0);
        assert_eq!(config.axes.x.expo, 1.0);
        // Untouched axes keep their full defaults
        assert_eq!(config.axes.ry.source_axis, "y");
    }

    #[test]
    fn test_validate_rejects_non_positive_sensitivity() {
        let mut config = ConverterConfig::default();
        config.axes.rx.sensitivity = 0.0;
        match config.validate() {
            Err(ConfigError::InvalidSensitivity { axis, value }) => {
                assert_eq!(axis, AxisId::RX);
                assert_eq!(value, 0.0);
            }
            other => panic!("Expected InvalidSensitivity, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_nan_sensitivity() {
        let mut config = ConverterConfig::default();
        config.axes.x.sensitivity = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSensitivity { axis: AxisId::X, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_expo() {
        let mut config = ConverterConfig::default();
        config.axes.ry.expo = f32::NAN;
        match config.validate() {
            Err(ConfigError::InvalidExpo { axis, value }) => {
                assert_eq!(axis, AxisId::RY);
                assert!(value.is_nan());
            }
            other => panic!("Expected InvalidExpo, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_infinite_expo() {
        let mut config = ConverterConfig::default();
        config.axes.x.expo = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExpo { axis: AxisId::X, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_tick_rate() {
        let mut config = ConverterConfig::default();
        config.tick_hz = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTickRate)));
    }

    #[test]
    fn test_out_of_range_expo_passes_validation() {
        // Expo is clamped at use time, not rejected at load time
        let mut config = ConverterConfig::default();
        config.axes.x.expo = 3.0;
        assert!(config.validate().is_ok());
    }
}
