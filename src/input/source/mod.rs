//! Provider abstraction over the platform's raw device API.
//!
//! The engine never talks to hardware directly; the host supplies a
//! [SourceDriver] that enumerates attached devices and hands out opaque
//! [RawDevice] handles that deliver one [RawState] sample per tick.

use thiserror::Error;
use uuid::Uuid;

use crate::input::capability::{DeviceAxis, HatDirection};
use crate::input::value::InputRange;

/// Errors reported by a [SourceDriver] or [RawDevice].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),
    #[error("Failed to acquire device: {0}")]
    Acquire(String),
    #[error("Failed to read device state: {0}")]
    Sample(String),
}

/// Capability counts reported by a device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub buttons: usize,
    pub hats: usize,
}

/// One raw sample: every control's value at a single instant. Axis values
/// are raw integers in the device's calibrated range; hats are POV angles
/// in centidegrees (`0..36000`), `None` when centered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawState {
    pub axes: [i32; DeviceAxis::COUNT],
    pub buttons: Vec<bool>,
    pub hats: Vec<Option<u16>>,
}

impl RawState {
    pub fn axis(&self, axis: DeviceAxis) -> i32 {
        self.axes[axis.index()]
    }

    /// Button state, or `None` when the index is out of range for this
    /// device.
    pub fn button(&self, index: usize) -> Option<bool> {
        self.buttons.get(index).copied()
    }

    /// Whether the given hat is deflected in the given direction. Each
    /// direction covers a 90° arc with the diagonals shared, mirroring how
    /// DirectInput-style POV values are read.
    pub fn hat_direction(&self, hat: usize, direction: HatDirection) -> Option<bool> {
        let angle = match self.hats.get(hat)? {
            Some(angle) => *angle,
            None => return Some(false),
        };
        let active = match direction {
            HatDirection::Up => angle >= 31500 || angle <= 4500,
            HatDirection::Right => (4500..=13500).contains(&angle),
            HatDirection::Down => (13500..=22500).contains(&angle),
            HatDirection::Left => (22500..=31500).contains(&angle),
        };
        Some(active)
    }
}

/// An opaque handle to one attached physical device.
pub trait RawDevice {
    /// Take exclusive access to the device for polling.
    fn acquire(&mut self) -> Result<(), SourceError>;

    /// Give up access. Providers may fail here; callers treat it as
    /// best-effort.
    fn unacquire(&mut self) -> Result<(), SourceError>;

    /// Button and hat counts.
    fn capabilities(&self) -> Capabilities;

    /// The raw range for one axis, or `None` when the device does not have
    /// the axis or the range could not be read.
    fn axis_range(&self, axis: DeviceAxis) -> Option<InputRange>;

    /// Fetch the current state of every control.
    fn poll(&mut self) -> Result<RawState, SourceError>;
}

/// One device found during enumeration, with its identity fields and a
/// live handle.
pub struct DiscoveredDevice {
    pub name: String,
    pub uuid: Uuid,
    pub handle: Box<dyn RawDevice>,
}

impl std::fmt::Debug for DiscoveredDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveredDevice")
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .finish_non_exhaustive()
    }
}

/// Enumerates currently attached devices. Implemented by the host over
/// whatever platform input API it uses.
pub trait SourceDriver {
    /// List every attached device, in the provider's discovery order. The
    /// order matters: identity fallback matching claims by it.
    fn devices(&mut self) -> Result<Vec<DiscoveredDevice>, SourceError>;
}
