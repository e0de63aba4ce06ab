use serde::{Deserialize, Serialize};

/// A physical axis a source device is capable of reporting. Identity only;
/// the meaning of the raw values comes from the device's calibration.
///
/// Serialized by variant name to match existing registry files ("RX",
/// "Slider0", etc).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAxis {
    X,
    Y,
    Z,
    RX,
    RY,
    RZ,
    Slider0,
    Slider1,
}

impl DeviceAxis {
    /// All axes in declared order. Bind detection and calibration iterate
    /// in this order to stay deterministic.
    pub const ALL: [DeviceAxis; 8] = [
        DeviceAxis::X,
        DeviceAxis::Y,
        DeviceAxis::Z,
        DeviceAxis::RX,
        DeviceAxis::RY,
        DeviceAxis::RZ,
        DeviceAxis::Slider0,
        DeviceAxis::Slider1,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Index into a raw state's axis array.
    pub fn index(&self) -> usize {
        match self {
            DeviceAxis::X => 0,
            DeviceAxis::Y => 1,
            DeviceAxis::Z => 2,
            DeviceAxis::RX => 3,
            DeviceAxis::RY => 4,
            DeviceAxis::RZ => 5,
            DeviceAxis::Slider0 => 6,
            DeviceAxis::Slider1 => 7,
        }
    }
}

/// One direction of a POV hat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatDirection {
    Up,
    Right,
    Down,
    Left,
}

impl HatDirection {
    pub const ALL: [HatDirection; 4] = [
        HatDirection::Up,
        HatDirection::Right,
        HatDirection::Down,
        HatDirection::Left,
    ];
}

/// Where on the input range a bind's deadzone sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadzonePoint {
    /// No deadzone applied anywhere on the range.
    None,
    /// Deadzone near the lower/upper end-stops, for outputs that are
    /// naturally zero-based (throttle, brake).
    End,
    /// Deadzone in the middle of the range, for outputs that are naturally
    /// centered (pitch, yaw, bidirectional strafe).
    Mid,
}

/// A continuous output control understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAxis {
    /// One-directional forward strafe for HOTAS/pedal use; direction is
    /// swapped by the [GameAction::InvertStrafeForward] modifier.
    StrafeForward,
    StrafeForwardBackward,
    StrafeLeftRight,
    StrafeUpDown,
    /// Wheeled acceleration, zero-based like [GameAxis::Brake].
    Accelerate,
    Brake,
    TurnPitch,
    TurnYaw,
    TurnRoll,
    CameraPitch,
    CameraYaw,
}

impl GameAxis {
    /// Deadzone placement is decided by what the output means, not by the
    /// physical input driving it.
    pub fn deadzone_point(&self) -> DeadzonePoint {
        match self {
            GameAxis::StrafeForward | GameAxis::Accelerate | GameAxis::Brake => DeadzonePoint::End,
            GameAxis::StrafeForwardBackward
            | GameAxis::StrafeLeftRight
            | GameAxis::StrafeUpDown
            | GameAxis::TurnPitch
            | GameAxis::TurnYaw
            | GameAxis::TurnRoll
            | GameAxis::CameraPitch
            | GameAxis::CameraYaw => DeadzonePoint::Mid,
        }
    }
}

/// A discrete action understood by the host. The enum is closed so the
/// aggregator can track the active set as a bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum GameAction {
    /// Flip the sign of [GameAxis::StrafeForward]; tap toggles, hold
    /// inverts temporarily.
    InvertStrafeForward,
    /// Toggle whether analog input is applied to the controlled object.
    SwitchAnalogInputActive,

    FirePrimary,
    FireSecondary,
    Target,
    ReleaseTarget,
    WheelJump,
    Brake,

    SwitchLights,
    SwitchDamping,
    SwitchHandbrake,
    SwitchReactors,
    SwitchLandingGears,

    ToolbarAction1,
    ToolbarAction2,
    ToolbarAction3,
    ToolbarAction4,
    ToolbarAction5,
    ToolbarAction6,
    ToolbarAction7,
    ToolbarAction8,
    ToolbarAction9,
    ToolbarActionHolster,

    ToolbarSwitchNext,
    ToolbarSwitchPrev,
    ToolbarActionNext,
    ToolbarActionPrev,
}

impl GameAction {
    pub const ALL: [GameAction; 27] = [
        GameAction::InvertStrafeForward,
        GameAction::SwitchAnalogInputActive,
        GameAction::FirePrimary,
        GameAction::FireSecondary,
        GameAction::Target,
        GameAction::ReleaseTarget,
        GameAction::WheelJump,
        GameAction::Brake,
        GameAction::SwitchLights,
        GameAction::SwitchDamping,
        GameAction::SwitchHandbrake,
        GameAction::SwitchReactors,
        GameAction::SwitchLandingGears,
        GameAction::ToolbarAction1,
        GameAction::ToolbarAction2,
        GameAction::ToolbarAction3,
        GameAction::ToolbarAction4,
        GameAction::ToolbarAction5,
        GameAction::ToolbarAction6,
        GameAction::ToolbarAction7,
        GameAction::ToolbarAction8,
        GameAction::ToolbarAction9,
        GameAction::ToolbarActionHolster,
        GameAction::ToolbarSwitchNext,
        GameAction::ToolbarSwitchPrev,
        GameAction::ToolbarActionNext,
        GameAction::ToolbarActionPrev,
    ];

    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

/// Fixed-size set of [GameAction]s with O(1) membership. The aggregator
/// diffs the set between ticks to derive rising/falling edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionSet(u32);

impl ActionSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, action: GameAction) {
        self.0 |= action.bit();
    }

    pub fn remove(&mut self, action: GameAction) {
        self.0 &= !action.bit();
    }

    /// Remove every action present in `other`.
    pub fn remove_all(&mut self, other: ActionSet) {
        self.0 &= !other.0;
    }

    pub fn contains(&self, action: GameAction) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = GameAction> + '_ {
        GameAction::ALL.into_iter().filter(|a| self.contains(*a))
    }
}
