//! Flyjoy TX-to-Virtual-Joystick Input Converter
//!
//! Reads a physical RC transmitter (or any joystick) and drives a virtual
//! gamepad through uinput, with per-axis inversion, sensitivity scaling and
//! an exponential response curve.

pub mod config;
pub mod converter;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod transform;

pub use config::{AxisConfig, AxisId, AxisSet, ConfigError, ConverterConfig, OutputBackend};
pub use converter::{Converter, LoopState};
pub use pipeline::{AxisPipeline, OutputFrame};
pub use sink::{HidSink, OutputSink, SinkError, XInputSink};
pub use source::{GilrsSource, SampleSource, SourceAxis, SourceError};
