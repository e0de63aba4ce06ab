//! One mapping from a physical control to one host control.

use std::fmt;

use crate::input::calibration::Calibration;
use crate::input::capability::{DeadzonePoint, DeviceAxis, GameAction, GameAxis, HatDirection};
use crate::input::source::RawState;
use crate::input::value;

/// A continuous bind value at or above this is treated as a discrete
/// press, so an axis can drive an action.
pub const ACTIVE_THRESHOLD: f32 = 0.75;

/// Default deadzone applied to new axis binds.
pub const DEFAULT_DEADZONE: f32 = 0.05;

/// The physical control a bind reads. Exactly one selector by
/// construction; a bind with no input cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindInput {
    Axis { axis: DeviceAxis, invert: bool },
    Button { button: usize },
    Hat { hat: usize, direction: HatDirection },
}

impl fmt::Display for BindInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindInput::Axis { axis, invert: false } => write!(f, "{axis:?}"),
            BindInput::Axis { axis, invert: true } => write!(f, "{axis:?} (inverted)"),
            BindInput::Button { button } => write!(f, "Btn[{}]", button + 1),
            BindInput::Hat { hat, direction } => write!(f, "Hat[{}] {direction:?}", hat + 1),
        }
    }
}

/// The host control a bind drives. Exactly one selector by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindOutput {
    Axis(GameAxis),
    Action(GameAction),
}

impl BindOutput {
    /// Deadzone placement follows the output's semantics. Actions driven
    /// by an axis behave like a zero-based output: the press threshold
    /// lives at the top of the range.
    pub fn deadzone_point(&self) -> DeadzonePoint {
        match self {
            BindOutput::Axis(axis) => axis.deadzone_point(),
            BindOutput::Action(_) => DeadzonePoint::End,
        }
    }
}

/// One input-control → output-control mapping with shaping parameters.
///
/// Binds are value types: the configuration UI edits a detached copy and
/// the owning device swaps the whole bind in atomically, so the polling
/// path never observes a half-edited mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Bind {
    pub input: BindInput,
    pub output: BindOutput,
    /// Fraction of the range treated as no input, `[0, 1]`.
    pub deadzone: f32,
    /// Linear/cubic response blend, `[0, 1]`; 0 is linear.
    pub curve: f32,

    value: f32,
    active: bool,
}

impl Bind {
    pub fn new(input: BindInput, output: BindOutput) -> Self {
        Self {
            input,
            output,
            deadzone: DEFAULT_DEADZONE,
            curve: 0.0,
            value: 0.0,
            active: false,
        }
    }

    pub fn with_shaping(mut self, deadzone: f32, curve: f32) -> Self {
        self.deadzone = deadzone;
        self.curve = curve;
        self
    }

    /// The shaped value from the last successful [Bind::apply], `[0, 1]`.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether the bind currently counts as pressed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_axis_mapping(&self) -> bool {
        matches!(self.output, BindOutput::Axis(_))
    }

    pub fn is_action_mapping(&self) -> bool {
        matches!(self.output, BindOutput::Action(_))
    }

    /// Zero the derived state. Callers reset every bind once per tick
    /// before re-applying so a control with no data this tick degrades to
    /// neutral instead of holding a stale value.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.active = false;
    }

    /// Evaluate the bind against one raw sample. Returns whether a value
    /// was obtainable; on success `value`/`active` are updated. A selector
    /// pointing at a control the device does not have returns false and
    /// leaves the reset state in place.
    pub fn apply(&mut self, state: &RawState, calibration: &Calibration) -> bool {
        let value = match self.input {
            BindInput::Axis { axis, invert } => {
                let mut t = value::normalize(state.axis(axis), calibration.range(axis));
                if invert {
                    t = 1.0 - t;
                }
                let point = self.output.deadzone_point();
                t = value::apply_deadzone(t, self.deadzone, point);
                value::apply_curve(t, self.curve, point)
            }
            BindInput::Button { button } => match state.button(button) {
                Some(pressed) => pressed as u8 as f32,
                None => return false,
            },
            BindInput::Hat { hat, direction } => match state.hat_direction(hat, direction) {
                Some(active) => active as u8 as f32,
                None => return false,
            },
        };

        self.value = value;
        self.active = value >= ACTIVE_THRESHOLD;
        true
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => ", self.input)?;
        match self.output {
            BindOutput::Axis(axis) => write!(f, "{axis:?}"),
            BindOutput::Action(action) => write!(f, "{action:?}"),
        }
    }
}
