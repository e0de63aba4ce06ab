//! Merges every device's bind outputs into one per-tick control frame.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::input::bind::BindOutput;
use crate::input::capability::{ActionSet, GameAction, GameAxis};
use crate::input::device::{DeviceUpdate, InputDevice};

/// How long the invert-forward action must be held before its release
/// toggles the multiplier back (hold-to-invert instead of tap-to-toggle).
pub const INVERT_HOLD_WINDOW: Duration = Duration::from_millis(500);

/// Full deflection of a rotation input in the host's angular units.
const ROTATION_SCALE: f32 = 40.0;

/// An action edge raised during one aggregation pass. At most one edge per
/// action per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionEvent {
    /// Rising edge, fired before [ActionEvent::Begin].
    Triggered(GameAction),
    /// Rising edge.
    Begin(GameAction),
    /// Falling edge.
    End(GameAction),
}

/// The aggregated outputs for one tick. Continuous slots are fully
/// recomputed every tick so a lost device cannot leave a stale value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlFrame {
    /// X = left/right, Y = up/down, Z = forward/backward (forward is
    /// negative Z).
    pub movement: [f32; 3],
    /// X = pitch, Y = yaw, Z = roll.
    pub rotation: [f32; 3],
    /// X = pitch, Y = yaw.
    pub camera: [f32; 2],
    pub brake: f32,
    pub accel: f32,
    pub actions: ActionSet,
}

/// Folds all registered devices' binds into a [ControlFrame], diffs the
/// action set between ticks for edge events, and runs the small modifier
/// state machines.
pub struct InputAggregate {
    /// Whether analog input is currently applied to the controlled object.
    /// Toggled by [GameAction::SwitchAnalogInputActive].
    pub analog_input_active: bool,

    frame: ControlFrame,
    last_actions: ActionSet,
    events: Vec<ActionEvent>,

    /// Devices to sample, in registration order.
    registered: Vec<Uuid>,

    /// Sign applied to [GameAxis::StrafeForward]; starts at -1 because the
    /// host's forward is negative Z.
    forward_mult: f32,
    forward_inverted_at: Option<Instant>,
    hold_window: Duration,
}

impl Default for InputAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl InputAggregate {
    pub fn new() -> Self {
        Self {
            analog_input_active: false,
            frame: ControlFrame::default(),
            last_actions: ActionSet::new(),
            events: Vec::new(),
            registered: Vec::new(),
            forward_mult: -1.0,
            forward_inverted_at: None,
            hold_window: INVERT_HOLD_WINDOW,
        }
    }

    pub fn register_device(&mut self, device: &InputDevice) {
        if self.registered.contains(&device.uuid()) {
            return;
        }
        log::debug!("InputAggregate - Registering {}", device.name());
        self.registered.push(device.uuid());
    }

    pub fn unregister_device(&mut self, device: &InputDevice) {
        let uuid = device.uuid();
        if !self.registered.contains(&uuid) {
            return;
        }
        log::debug!("InputAggregate - Unregistering {}", device.name());
        self.registered.retain(|id| *id != uuid);
        self.on_device_unacquired(device_actions(device));
    }

    /// Clear action bits a device was holding when it went away, so a
    /// disconnect cannot leave an action stuck on.
    pub fn on_device_unacquired(&mut self, actions: ActionSet) {
        self.frame.actions.remove_all(actions);
    }

    /// Drop registrations that no longer name a known device. An identity
    /// reclaim can change a device's id, leaving the old registration
    /// behind to be scanned uselessly every tick.
    pub fn prune_registrations(&mut self, devices: &[InputDevice]) {
        self.registered.retain(|uuid| {
            let live = devices.iter().any(|d| d.uuid() == *uuid);
            if !live {
                log::debug!("InputAggregate - Dropping stale registration {uuid}");
            }
            live
        });
    }

    /// Devices the aggregator samples, in registration order.
    pub fn registered_devices(&self) -> &[Uuid] {
        &self.registered
    }

    pub fn frame(&self) -> &ControlFrame {
        &self.frame
    }

    pub fn movement_vector(&self) -> [f32; 3] {
        self.frame.movement
    }

    pub fn rotation_vector(&self) -> [f32; 3] {
        self.frame.rotation
    }

    pub fn camera_rotation_vector(&self) -> [f32; 2] {
        self.frame.camera
    }

    pub fn brake_force(&self) -> f32 {
        self.frame.brake
    }

    pub fn accel_force(&self) -> f32 {
        self.frame.accel
    }

    /// Edges raised by the most recent aggregation pass.
    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    pub fn is_action_active(&self, action: GameAction) -> bool {
        self.frame.actions.contains(action)
    }

    pub fn was_action_active(&self, action: GameAction) -> bool {
        self.last_actions.contains(action)
    }

    /// True only on the first tick the action becomes active.
    pub fn just_activated(&self, action: GameAction) -> bool {
        self.is_action_active(action) && !self.was_action_active(action)
    }

    pub fn just_deactivated(&self, action: GameAction) -> bool {
        self.was_action_active(action) && !self.is_action_active(action)
    }

    /// Snapshot the action set as "last tick" and zero everything else.
    pub fn reset(&mut self) {
        self.last_actions = self.frame.actions;
        self.frame.actions.clear();
        self.frame.movement = [0.0; 3];
        self.frame.rotation = [0.0; 3];
        self.frame.camera = [0.0; 2];
        self.frame.brake = 0.0;
        self.frame.accel = 0.0;
        self.events.clear();
    }

    /// Run one aggregation pass over the given devices.
    pub fn update_inputs(&mut self, devices: &mut [InputDevice]) {
        self.update_inputs_at(devices, Instant::now());
    }

    pub(crate) fn update_inputs_at(&mut self, devices: &mut [InputDevice], now: Instant) {
        self.reset();

        for uuid in self.registered.clone() {
            let Some(device) = devices.iter_mut().find(|d| d.uuid() == uuid) else {
                continue;
            };
            if !device.is_valid() || !device.is_acquired() || !device.has_binds() {
                continue;
            }

            match device.update(true) {
                DeviceUpdate::Data => {}
                DeviceUpdate::NoData => continue,
                DeviceUpdate::Lost(actions) => {
                    self.frame.actions.remove_all(actions);
                    continue;
                }
            }

            for bind in &device.binds {
                match bind.output {
                    BindOutput::Axis(axis) => self.fold_axis(axis, bind.value()),
                    BindOutput::Action(action) => {
                        if bind.is_active() {
                            self.frame.actions.insert(action);
                        }
                    }
                }
            }
        }

        self.raise_edges();
        self.update_modifiers(now);
    }

    /// Shape one bind's `[0, 1]` value into the output's units and fold it
    /// into the frame. When several binds drive the same slot, the one
    /// with the larger magnitude wins for the tick; a resting, imperfectly
    /// centered stick cannot drown out an intentionally actuated one.
    fn fold_axis(&mut self, axis: GameAxis, value: f32) {
        let mut value = value.clamp(-1.0, 1.0);
        match axis {
            GameAxis::StrafeForward => value *= self.forward_mult,
            GameAxis::StrafeForwardBackward
            | GameAxis::StrafeLeftRight
            | GameAxis::StrafeUpDown => value = (value - 0.5) * 2.0,
            // Pitch is inverted compared to how joysticks usually handle it
            GameAxis::TurnPitch | GameAxis::CameraPitch => {
                value = (value - 0.5) * -ROTATION_SCALE;
            }
            GameAxis::TurnYaw | GameAxis::TurnRoll | GameAxis::CameraYaw => {
                value = (value - 0.5) * ROTATION_SCALE;
            }
            GameAxis::Accelerate | GameAxis::Brake => value = value.clamp(0.0, 1.0),
        }

        let slot = match axis {
            GameAxis::StrafeForward | GameAxis::StrafeForwardBackward => {
                &mut self.frame.movement[2]
            }
            GameAxis::StrafeLeftRight => &mut self.frame.movement[0],
            GameAxis::StrafeUpDown => &mut self.frame.movement[1],
            GameAxis::Accelerate => &mut self.frame.accel,
            GameAxis::Brake => &mut self.frame.brake,
            GameAxis::TurnPitch => &mut self.frame.rotation[0],
            GameAxis::TurnYaw => &mut self.frame.rotation[1],
            GameAxis::TurnRoll => &mut self.frame.rotation[2],
            GameAxis::CameraPitch => &mut self.frame.camera[0],
            GameAxis::CameraYaw => &mut self.frame.camera[1],
        };
        // Magnitude-dominant fold; ties go to the later bind in iteration
        // order.
        if value.abs() >= slot.abs() {
            *slot = value;
        }
    }

    /// Diff the action set against last tick and raise one edge per
    /// transition.
    fn raise_edges(&mut self) {
        for action in GameAction::ALL {
            if self.just_activated(action) {
                log::debug!("StartActive {action:?}");
                self.events.push(ActionEvent::Triggered(action));
                self.events.push(ActionEvent::Begin(action));
            }
            if self.just_deactivated(action) {
                log::debug!("StopActive {action:?}");
                self.events.push(ActionEvent::End(action));
            }
        }
    }

    /// The two stateful meta actions: forward-invert (tap toggles, hold
    /// inverts temporarily) and the analog-input master toggle.
    fn update_modifiers(&mut self, now: Instant) {
        if self.just_activated(GameAction::InvertStrafeForward) {
            log::info!("Inverting forward strafe");
            self.forward_mult = -self.forward_mult;
            self.forward_inverted_at = Some(now);
        } else if self.just_deactivated(GameAction::InvertStrafeForward) {
            let held_past_window = self
                .forward_inverted_at
                .map(|at| now.duration_since(at) > self.hold_window)
                .unwrap_or(false);
            if held_past_window {
                log::info!("Forward invert released after hold, re-inverting");
                self.forward_mult = -self.forward_mult;
            }
        }

        if self.just_activated(GameAction::SwitchAnalogInputActive) {
            self.analog_input_active = !self.analog_input_active;
            log::info!("Analog input active: {}", self.analog_input_active);
        }
    }

    /// Current sign applied to forward strafe.
    pub fn forward_multiplier(&self) -> f32 {
        self.forward_mult
    }
}

fn device_actions(device: &InputDevice) -> ActionSet {
    let mut actions = ActionSet::new();
    for bind in &device.binds {
        if let BindOutput::Action(action) = bind.output {
            if bind.is_active() {
                actions.insert(action);
            }
        }
    }
    actions
}
