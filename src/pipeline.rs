//! Axis transformation pipeline
//!
//! Binds the four configured output axes to physical input axes at
//! construction time and produces one normalized output frame per tick.

use crate::config::{AxisConfig, AxisId, ConfigError, ConverterConfig};
use crate::source::{SampleSource, SourceAxis};
use crate::transform;
use tracing::debug;

/// One tick's command to the virtual device, all values in [-1, 1].
/// Built once per tick and consumed once by a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputFrame {
    pub x: f32,
    pub y: f32,
    pub rx: f32,
    pub ry: f32,
}

impl OutputFrame {
    /// The four channels in fixed (x, y, rx, ry) order
    pub fn channels(&self) -> [(AxisId, f32); 4] {
        [
            (AxisId::X, self.x),
            (AxisId::Y, self.y),
            (AxisId::RX, self.rx),
            (AxisId::RY, self.ry),
        ]
    }
}

/// A resolved output axis: source token plus response settings
#[derive(Debug)]
struct AxisBinding {
    source_axis: SourceAxis,
    cfg: AxisConfig,
}

/// Produces one [`OutputFrame`] per tick from a raw-sample source.
///
/// All `source_axis` names are resolved against the joystick's control list
/// here, once; an unknown name fails construction rather than surfacing
/// per tick.
#[derive(Debug)]
pub struct AxisPipeline {
    bindings: [AxisBinding; 4],
}

impl AxisPipeline {
    /// Validate the config against `source` and resolve all four axes
    pub fn new<S: SampleSource + ?Sized>(
        config: &ConverterConfig,
        source: &S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let bind = |id: AxisId| -> Result<AxisBinding, ConfigError> {
            let cfg = config.axes.get(id).clone();
            let source_axis =
                source
                    .resolve(&cfg.source_axis)
                    .ok_or_else(|| ConfigError::UnknownSourceAxis {
                        axis: id,
                        name: cfg.source_axis.clone(),
                        available: source.axis_names().join(", "),
                    })?;
            debug!(
                "Axis {} <- {} (inverted: {}, sensitivity: {}, expo: {})",
                id, cfg.source_axis, cfg.inverted, cfg.sensitivity, cfg.expo
            );
            Ok(AxisBinding { source_axis, cfg })
        };

        Ok(Self {
            bindings: [
                bind(AxisId::X)?,
                bind(AxisId::Y)?,
                bind(AxisId::RX)?,
                bind(AxisId::RY)?,
            ],
        })
    }

    /// Read all four source axes and apply the response transform
    pub fn produce_frame<S: SampleSource + ?Sized>(&self, source: &S) -> OutputFrame {
        let mut values = [0.0f32; 4];
        for (value, binding) in values.iter_mut().zip(&self.bindings) {
            *value = transform::transform(source.read(binding.source_axis), &binding.cfg);
        }
        OutputFrame {
            x: values[0],
            y: values[1],
            rx: values[2],
            ry: values[3],
        }
    }
}
