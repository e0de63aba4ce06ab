//! Per-device axis calibration.

use std::collections::HashMap;

use crate::input::capability::DeviceAxis;
use crate::input::value::InputRange;

/// The calibrated raw ranges for one device's axes.
///
/// Ranges are read from the device at init time, best effort; axes the
/// device failed to report fall back to [InputRange::default]. Persisted
/// overrides from the registry file are layered on top of the reported
/// ranges so user calibration survives restarts.
#[derive(Clone, Debug, Default)]
pub struct Calibration {
    ranges: HashMap<DeviceAxis, InputRange>,
    /// User-tuned min/max loaded from the registry, applied over the
    /// device-reported range once the axis is known to exist.
    overrides: HashMap<DeviceAxis, (Option<i32>, Option<i32>)>,
    default_range: InputRange,
}

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// The effective range for an axis. Uncalibrated axes use the default
    /// range so normalization still produces sane values.
    pub fn range(&self, axis: DeviceAxis) -> InputRange {
        self.ranges.get(&axis).copied().unwrap_or(self.default_range)
    }

    /// Whether the device actually reported this axis.
    pub fn has_axis(&self, axis: DeviceAxis) -> bool {
        self.ranges.contains_key(&axis)
    }

    /// Axes the device reported, in declared order.
    pub fn axes(&self) -> impl Iterator<Item = DeviceAxis> + '_ {
        DeviceAxis::ALL.into_iter().filter(|a| self.has_axis(*a))
    }

    pub fn axis_count(&self) -> usize {
        self.ranges.len()
    }

    /// Record the device-reported range for an axis, then layer any
    /// persisted override for it on top.
    pub fn set_reported(&mut self, axis: DeviceAxis, range: InputRange) {
        let mut range = range;
        if let Some((min, max)) = self.overrides.get(&axis) {
            if let Some(min) = min {
                range.minimum = *min;
            }
            if let Some(max) = max {
                range.maximum = *max;
            }
        }
        self.ranges.insert(axis, range);
    }

    /// Record a user override loaded from the registry file. Takes effect
    /// when [Calibration::set_reported] sees the axis.
    pub fn set_override(&mut self, axis: DeviceAxis, minimum: Option<i32>, maximum: Option<i32>) {
        self.overrides.insert(axis, (minimum, maximum));
    }

    /// The ranges to persist, in declared axis order. Axes the device has
    /// reported use the effective range; axes known only from loaded
    /// overrides keep the override bounds, so an unplugged device's
    /// calibration survives a save.
    pub fn persisted_entries(&self) -> Vec<(DeviceAxis, Option<i32>, Option<i32>)> {
        DeviceAxis::ALL
            .into_iter()
            .filter_map(|axis| {
                if let Some(range) = self.ranges.get(&axis) {
                    return Some((axis, Some(range.minimum), Some(range.maximum)));
                }
                self.overrides
                    .get(&axis)
                    .map(|(min, max)| (axis, *min, *max))
            })
            .collect()
    }

    /// Drop everything learned from the device, keeping user overrides so a
    /// re-init can apply them again.
    pub fn clear_reported(&mut self) {
        self.ranges.clear();
    }
}
