//! Virtual gamepad output devices using evdev/uinput
//!
//! Two backend flavors consume the pipeline's output frames: an
//! XInput-style device with signed 16-bit stick axes committed as one
//! batched write, and a plain HID-style device with independent unsigned
//! 8-bit channels.

use crate::config::AxisId;
use crate::pipeline::OutputFrame;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use thiserror::Error;
use tracing::warn;

/// Stick axis range for the XInput-style device
pub const XINPUT_AXIS_MIN: i32 = -32767;
pub const XINPUT_AXIS_MAX: i32 = 32767;

/// Channel range for the HID-style device
pub const HID_CHANNEL_MIN: i32 = 0;
pub const HID_CHANNEL_MAX: i32 = 255;

/// Errors from virtual device operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),

    #[error("Virtual device unavailable: {0}")]
    DeviceUnavailable(#[source] std::io::Error),

    /// A NaN or out-of-range sample reached the sink. The transform
    /// guarantees its output range, so this is a pipeline bug; it is
    /// rejected loudly instead of clamped here.
    #[error("Non-finite or out-of-range sample on {axis}: {value}")]
    NumericContract { axis: AxisId, value: f32 },
}

/// One-frame-per-tick consumer of pipeline output.
///
/// `emit` commits synchronously: the OS device reflects the new state
/// before the call returns. `DeviceUnavailable` is never retried here;
/// the caller decides (and in practice stops the loop).
pub trait OutputSink {
    fn emit(&mut self, frame: &OutputFrame) -> Result<(), SinkError>;
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn emit(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        (**self).emit(frame)
    }
}

/// Scale a normalized sample to the signed 16-bit stick range.
/// Rounds half away from zero (`f32::round`).
pub fn scale_xinput(sample: f32) -> i32 {
    (sample * XINPUT_AXIS_MAX as f32).round() as i32
}

/// Scale a normalized sample to the unsigned 8-bit channel range.
/// Zero input lands on mid-scale 128 under the same rounding rule.
pub fn scale_hid(sample: f32) -> i32 {
    ((sample / 2.0 + 0.5) * HID_CHANNEL_MAX as f32).round() as i32
}

/// Output axes in frame order
const OUTPUT_AXES: [AbsoluteAxisType; 4] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
];

/// Reject frames the transform contract should make impossible
fn check_frame(frame: &OutputFrame) -> Result<(), SinkError> {
    for (axis, value) in frame.channels() {
        if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
            return Err(SinkError::NumericContract { axis, value });
        }
    }
    Ok(())
}

fn build_device(name: &str, min: i32, max: i32, rest: i32) -> Result<VirtualDevice, SinkError> {
    let mut builder = VirtualDeviceBuilder::new()
        .map_err(SinkError::CreateDevice)?
        .name(name);

    // Face buttons so Steam and games accept the device as a gamepad
    let mut keys = AttributeSet::<Key>::new();
    keys.insert(Key::BTN_SOUTH);
    keys.insert(Key::BTN_EAST);
    keys.insert(Key::BTN_NORTH);
    keys.insert(Key::BTN_WEST);
    builder = builder.with_keys(&keys).map_err(SinkError::CreateDevice)?;

    for code in OUTPUT_AXES {
        let abs_setup = UinputAbsSetup::new(code, AbsInfo::new(rest, min, max, 0, 0, 1));
        builder = builder
            .with_absolute_axis(&abs_setup)
            .map_err(SinkError::CreateDevice)?;
    }

    builder.build().map_err(SinkError::CreateDevice)
}

/// XInput-style virtual gamepad: (x, y) is the left stick, (rx, ry) the
/// right stick, both committed in a single batched write so the device
/// state updates atomically.
pub struct XInputSink {
    device: VirtualDevice,
}

impl XInputSink {
    pub fn new(name: &str) -> Result<Self, SinkError> {
        let device = build_device(name, XINPUT_AXIS_MIN, XINPUT_AXIS_MAX, 0)?;
        Ok(Self { device })
    }

    /// Get the device path (e.g. /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device.enumerate_dev_nodes_blocking().ok()?.next()?.ok()
    }
}

impl OutputSink for XInputSink {
    fn emit(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        check_frame(frame)?;

        let events: Vec<InputEvent> = OUTPUT_AXES
            .iter()
            .zip(frame.channels())
            .map(|(code, (_, value))| {
                InputEvent::new_now(EventType::ABSOLUTE, code.0, scale_xinput(value))
            })
            .collect();

        // One write, one sync: both sticks land together
        self.device
            .emit(&events)
            .map_err(SinkError::DeviceUnavailable)
    }
}

/// HID-style virtual device: four independent unsigned 8-bit channels,
/// written one at a time; the driver batches on its own schedule.
pub struct HidSink {
    device: VirtualDevice,
}

impl HidSink {
    pub fn new(name: &str) -> Result<Self, SinkError> {
        let device = build_device(name, HID_CHANNEL_MIN, HID_CHANNEL_MAX, 128)?;
        Ok(Self { device })
    }

    /// Get the device path (e.g. /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device.enumerate_dev_nodes_blocking().ok()?.next()?.ok()
    }
}

impl OutputSink for HidSink {
    fn emit(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        check_frame(frame)?;

        for (written, (code, (_, value))) in OUTPUT_AXES.iter().zip(frame.channels()).enumerate() {
            let event = InputEvent::new_now(EventType::ABSOLUTE, code.0, scale_hid(value));
            if let Err(e) = self.device.emit(&[event]) {
                if written > 0 {
                    warn!(
                        "Device write failed with {written} of 4 channels already applied this tick"
                    );
                }
                return Err(SinkError::DeviceUnavailable(e));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xinput_scaling_fixed_points() {
        assert_eq!(scale_xinput(0.0), 0);
        assert_eq!(scale_xinput(1.0), 32767);
        assert_eq!(scale_xinput(-1.0), -32767);
        // 0.5 * 32767 = 16383.5, rounds away from zero
        assert_eq!(scale_xinput(0.5), 16384);
        assert_eq!(scale_xinput(-0.5), -16384);
    }

    #[test]
    fn test_hid_scaling_fixed_points() {
        // 0.0 -> 127.5 -> rounds to 128 (half away from zero)
        assert_eq!(scale_hid(0.0), 128);
        assert_eq!(scale_hid(1.0), 255);
        assert_eq!(scale_hid(-1.0), 0);
        assert_eq!(scale_hid(0.5), 191);
    }

    #[test]
    fn test_check_frame_rejects_nan() {
        let frame = OutputFrame {
            x: 0.0,
            y: f32::NAN,
            rx: 0.0,
            ry: 0.0,
        };
        match check_frame(&frame) {
            Err(SinkError::NumericContract { axis, value }) => {
                assert_eq!(axis, AxisId::Y);
                assert!(value.is_nan());
            }
            other => panic!("Expected NumericContract, got {:?}", other),
        }
    }

    #[test]
    fn test_check_frame_rejects_out_of_range() {
        let frame = OutputFrame {
            x: 0.0,
            y: 0.0,
            rx: 1.5,
            ry: 0.0,
        };
        assert!(matches!(
            check_frame(&frame),
            Err(SinkError::NumericContract {
                axis: AxisId::RX,
                ..
            })
        ));
    }

    #[test]
    fn test_check_frame_accepts_range_edges() {
        let frame = OutputFrame {
            x: -1.0,
            y: 1.0,
            rx: 0.0,
            ry: -0.999999,
        };
        assert!(check_frame(&frame).is_ok());
    }

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_sinks() {
        assert!(XInputSink::new("Flyjoy Test XInput").is_ok());
        assert!(HidSink::new("Flyjoy Test HID").is_ok());
    }
}
