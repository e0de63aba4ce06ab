//! Lifecycle and polling for one physical input device.

use uuid::Uuid;

use crate::input::bind::{Bind, BindInput, BindOutput};
use crate::input::calibration::Calibration;
use crate::input::capability::{ActionSet, DeviceAxis, HatDirection};
use crate::input::source::{DiscoveredDevice, RawDevice, RawState};

/// Detection thresholds for axis movement when listening for a new bind.
const DETECT_LOW: f32 = 0.25;
const DETECT_HIGH: f32 = 0.75;

/// Result of one per-tick device update.
#[derive(Debug, PartialEq, Eq)]
pub enum DeviceUpdate {
    /// No bind produced data this tick (also returned for zero-effect
    /// baseline samples).
    NoData,
    /// At least one bind produced data.
    Data,
    /// Sampling failed and the device was torn down. Carries the actions
    /// this device's binds were holding active so the aggregator can clear
    /// them.
    Lost(ActionSet),
}

/// One physical input device: identity, its binds, its calibration, and
/// the provider handle while one is attached.
///
/// Devices are created at discovery time and never dropped automatically;
/// an unplugged device keeps its binds in the registry so the
/// configuration survives replug.
pub struct InputDevice {
    name: String,
    uuid: Uuid,
    pub binds: Vec<Bind>,
    pub calibration: Calibration,

    handle: Option<Box<dyn RawDevice>>,
    initialized: bool,
    acquired: bool,
    buttons: usize,
    hats: usize,

    current_state: RawState,
    last_state: RawState,
    baseline: Option<RawState>,
    /// Axes that have not moved since the acquire-time baseline. Some
    /// devices report a spurious non-center value until the driver
    /// delivers a real sample; binds on these axes are skipped until the
    /// value changes.
    bogus_axes: Vec<DeviceAxis>,
}

impl InputDevice {
    /// A device shell holding persisted configuration, before any hardware
    /// has been matched to it.
    pub fn from_config(name: String, uuid: Uuid) -> Self {
        Self {
            name,
            uuid,
            binds: Vec::new(),
            calibration: Calibration::new(),
            handle: None,
            initialized: false,
            acquired: false,
            buttons: 0,
            hats: 0,
            current_state: RawState::default(),
            last_state: RawState::default(),
            baseline: None,
            bogus_axes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some() && self.initialized
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    pub fn has_binds(&self) -> bool {
        !self.binds.is_empty()
    }

    pub fn buttons(&self) -> usize {
        self.buttons
    }

    pub fn hats(&self) -> usize {
        self.hats
    }

    /// Attach a freshly enumerated handle: record identity, read capability
    /// counts, and read per-axis ranges. A missing range simply leaves that
    /// axis uncalibrated; it is not fatal.
    pub fn init(&mut self, discovered: DiscoveredDevice) {
        log::debug!("{}/{} - Initializing", discovered.name, discovered.uuid);

        self.name = discovered.name;
        self.uuid = discovered.uuid;

        let caps = discovered.handle.capabilities();
        self.buttons = caps.buttons;
        self.hats = caps.hats;

        self.calibration.clear_reported();
        for axis in DeviceAxis::ALL {
            match discovered.handle.axis_range(axis) {
                Some(range) => self.calibration.set_reported(axis, range),
                None => log::debug!("{} - No range for axis {axis:?}", self.name),
            }
        }

        self.handle = Some(discovered.handle);
        self.initialized = true;

        log::debug!(
            "{} - Has {} button(s), {} hat(s), and {} axis(es)",
            self.name,
            self.buttons,
            self.hats,
            self.calibration.axis_count()
        );
    }

    /// Tear the device down to its persisted shell. The handle is dropped;
    /// binds and calibration overrides stay so a rescan can reclaim the
    /// hardware.
    pub fn uninit(&mut self) {
        if self.acquired {
            self.unacquire();
        }
        self.handle = None;
        self.initialized = false;
    }

    /// Take exclusive access and prime the polling state: an initial
    /// sample becomes the bogus-axis baseline and every calibrated axis
    /// starts suspect.
    pub fn acquire(&mut self) -> bool {
        if self.acquired {
            return true;
        }
        if !self.is_valid() {
            log::info!("{} - Acquire failed", self.name);
            return false;
        }
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };

        if let Err(e) = handle.acquire() {
            log::info!("{} - Acquire failed: {e}", self.name);
            return false;
        }
        let state = match handle.poll() {
            Ok(state) => state,
            Err(e) => {
                log::info!("{} - Acquire failed reading initial state: {e}", self.name);
                return false;
            }
        };

        self.last_state = state.clone();
        self.current_state = state.clone();
        self.baseline = Some(state);
        self.bogus_axes = self.calibration.axes().collect();
        self.acquired = true;

        self.reset_binds();
        log::info!("{} - Acquired", self.name);
        true
    }

    /// Release the device. Provider errors are tolerated; binds are reset
    /// so no stale value survives. Returns the actions this device's binds
    /// were holding active, for the aggregator to clear.
    pub fn unacquire(&mut self) -> ActionSet {
        if !self.acquired {
            return ActionSet::new();
        }

        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.unacquire() {
                log::debug!("{} - Unacquire reported: {e}", self.name);
            }
        }
        self.acquired = false;
        log::info!("{} - Unacquired", self.name);

        let actions = self.active_actions();
        self.reset_binds();
        actions
    }

    /// Actions currently held active by this device's binds.
    fn active_actions(&self) -> ActionSet {
        let mut actions = ActionSet::new();
        for bind in &self.binds {
            if let BindOutput::Action(action) = bind.output {
                if bind.is_active() {
                    actions.insert(action);
                }
            }
        }
        actions
    }

    pub fn is_potentially_bogus(&self, axis: DeviceAxis) -> bool {
        self.bogus_axes.contains(&axis)
    }

    /// Fetch a new sample and, when `run_binds` is set, evaluate every
    /// bind against it. A provider failure tears the device down rather
    /// than leaving it half-acquired; the caller learns which actions to
    /// clear via [DeviceUpdate::Lost].
    pub fn update(&mut self, run_binds: bool) -> DeviceUpdate {
        if !self.is_valid() || !self.acquired {
            return DeviceUpdate::NoData;
        }
        let Some(handle) = self.handle.as_mut() else {
            return DeviceUpdate::NoData;
        };

        let state = match handle.poll() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("{} - Failed to update state, disabling: {e}", self.name);
                let actions = self.active_actions();
                self.uninit();
                return DeviceUpdate::Lost(actions);
            }
        };

        self.last_state = std::mem::replace(&mut self.current_state, state);

        if let Some(baseline) = self.baseline.as_ref() {
            let current = &self.current_state;
            self.bogus_axes
                .retain(|axis| current.axis(*axis) == baseline.axis(*axis));
        }

        if !run_binds {
            return DeviceUpdate::NoData;
        }

        let mut has_data = false;
        for bind in &mut self.binds {
            bind.reset();

            if let BindInput::Axis { axis, .. } = bind.input {
                if self.bogus_axes.contains(&axis) {
                    continue;
                }
            }
            if bind.apply(&self.current_state, &self.calibration) {
                has_data = true;
            }
        }

        if has_data {
            DeviceUpdate::Data
        } else {
            DeviceUpdate::NoData
        }
    }

    pub fn reset_binds(&mut self) {
        for bind in &mut self.binds {
            bind.reset();
        }
    }

    /// Listen for the first control the user moves, for the
    /// press-any-control capture flow. Takes a zero-effect sample and
    /// scans buttons, then axes in declared order, then hat directions for
    /// a transition since the previous sample. Returns a skeleton input
    /// selector; the caller supplies the output half.
    pub fn detect_bind(&mut self) -> Option<BindInput> {
        if !self.is_valid() || !self.acquired {
            return None;
        }

        if let DeviceUpdate::Lost(_) = self.update(false) {
            return None;
        }

        for button in 0..self.buttons {
            let pressed = self.current_state.button(button).unwrap_or(false);
            let was_pressed = self.last_state.button(button).unwrap_or(false);
            if pressed && !was_pressed {
                return Some(BindInput::Button { button });
            }
        }

        for axis in self.calibration.axes() {
            let range = self.calibration.range(axis);
            let current = crate::input::value::normalize(self.current_state.axis(axis), range);
            let last = crate::input::value::normalize(self.last_state.axis(axis), range);

            if (current < DETECT_LOW && last > DETECT_LOW)
                || (current > DETECT_HIGH && last < DETECT_HIGH)
            {
                return Some(BindInput::Axis { axis, invert: false });
            }
        }

        for hat in 0..self.hats {
            for direction in HatDirection::ALL {
                let active = self
                    .current_state
                    .hat_direction(hat, direction)
                    .unwrap_or(false);
                let was_active = self
                    .last_state
                    .hat_direction(hat, direction)
                    .unwrap_or(false);
                if active && !was_active {
                    return Some(BindInput::Hat { hat, direction });
                }
            }
        }

        None
    }
}

impl std::fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDevice")
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .field("binds", &self.binds.len())
            .field("initialized", &self.initialized)
            .field("acquired", &self.acquired)
            .finish()
    }
}
