//! Physical joystick input
//!
//! The converter core reads axes through the `SampleSource` trait. The
//! gilrs-backed implementation services the OS event queue without blocking
//! and reads the library's cached gamepad state.

use gilrs::{Axis, GamepadId, Gilrs};
use thiserror::Error;

/// Errors from joystick discovery and selection
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to initialize joystick backend: {0}")]
    Backend(String),

    #[error("No joysticks found")]
    NoJoystickFound,

    #[error("Joystick index {index} out of range ({count} connected)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Opaque axis token minted by [`SampleSource::resolve`].
///
/// Only meaningful to the source that issued it; passing a token to a
/// different source is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceAxis(u16);

impl SourceAxis {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

/// Raw-sample provider contract.
///
/// Axis names are resolved once at startup; per-tick reads go through the
/// resolved tokens only.
pub trait SampleSource {
    /// Resolve an axis name against the device's control list
    fn resolve(&self, name: &str) -> Option<SourceAxis>;

    /// Names of all axes the device exposes (for error reporting)
    fn axis_names(&self) -> Vec<String>;

    /// Service the OS event queue. Non-blocking; drains whatever is pending.
    fn poll(&mut self);

    /// Current position of a resolved axis, in [-1, 1]
    fn read(&self, axis: SourceAxis) -> f32;
}

/// Axis names as they appear in config files, with their gilrs mapping.
/// Follows the conventional x/y/z/rx/ry/rz joystick channel naming.
const AXIS_TABLE: [(&str, Axis); 6] = [
    ("x", Axis::LeftStickX),
    ("y", Axis::LeftStickY),
    ("z", Axis::LeftZ),
    ("rx", Axis::RightStickX),
    ("ry", Axis::RightStickY),
    ("rz", Axis::RightZ),
];

/// A physical joystick read through gilrs
pub struct GilrsSource {
    gilrs: Gilrs,
    id: GamepadId,
}

impl GilrsSource {
    /// Open the joystick at `joystick_index` among connected devices
    pub fn new(joystick_index: usize) -> Result<Self, SourceError> {
        let gilrs = Gilrs::new().map_err(|e| SourceError::Backend(e.to_string()))?;

        let mut ids: Vec<GamepadId> = gilrs.gamepads().map(|(id, _)| id).collect();
        ids.sort_by_key(|&id| usize::from(id));

        if ids.is_empty() {
            return Err(SourceError::NoJoystickFound);
        }

        let id = *ids
            .get(joystick_index)
            .ok_or(SourceError::IndexOutOfRange {
                index: joystick_index,
                count: ids.len(),
            })?;

        Ok(Self { gilrs, id })
    }

    /// Human-readable name of the selected joystick
    pub fn name(&self) -> String {
        self.gilrs.gamepad(self.id).name().to_string()
    }
}

impl SampleSource for GilrsSource {
    fn resolve(&self, name: &str) -> Option<SourceAxis> {
        let pad = self.gilrs.gamepad(self.id);
        AXIS_TABLE
            .iter()
            .position(|&(n, axis)| n == name && pad.axis_code(axis).is_some())
            .map(|i| SourceAxis(i as u16))
    }

    fn axis_names(&self) -> Vec<String> {
        let pad = self.gilrs.gamepad(self.id);
        AXIS_TABLE
            .iter()
            .filter(|&&(_, axis)| pad.axis_code(axis).is_some())
            .map(|&(name, _)| name.to_string())
            .collect()
    }

    fn poll(&mut self) {
        // gilrs caches axis state internally; draining the queue is enough
        while self.gilrs.next_event().is_some() {}
    }

    fn read(&self, axis: SourceAxis) -> f32 {
        let (_, gilrs_axis) = AXIS_TABLE[axis.raw() as usize];
        self.gilrs
            .gamepad(self.id)
            .axis_data(gilrs_axis)
            .map(|data| data.value())
            .unwrap_or(0.0)
    }
}

/// One entry per connected joystick, for `--list-devices`
pub struct DeviceSummary {
    pub index: usize,
    pub name: String,
    pub axes: Vec<String>,
}

/// Enumerate connected joysticks and the axes each exposes
pub fn list_devices() -> Result<Vec<DeviceSummary>, SourceError> {
    let gilrs = Gilrs::new().map_err(|e| SourceError::Backend(e.to_string()))?;

    let mut ids: Vec<GamepadId> = gilrs.gamepads().map(|(id, _)| id).collect();
    ids.sort_by_key(|&id| usize::from(id));

    Ok(ids
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            let pad = gilrs.gamepad(id);
            DeviceSummary {
                index,
                name: pad.name().to_string(),
                axes: AXIS_TABLE
                    .iter()
                    .filter(|&&(_, axis)| pad.axis_code(axis).is_some())
                    .map(|&(name, _)| name.to_string())
                    .collect(),
            }
        })
        .collect())
}
