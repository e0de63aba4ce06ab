//! Analog input mapping and aggregation for grid control.
//!
//! The crate turns raw joystick, throttle and pedal state into a single
//! per-tick control frame. The [InputManager](input::manager::InputManager)
//! owns the pipeline: an [InputRegistry](input::registry::InputRegistry)
//! matches discovered hardware against persisted device entries, each
//! [InputDevice](input::device::InputDevice) runs its binds over polled
//! state, and the [InputAggregate](input::aggregate::InputAggregate)
//! folds every bound value into movement, rotation, camera and action
//! outputs. The [config] module persists the registry as YAML and the
//! [network] module mirrors the derived brake force to the server in
//! multiplayer.

pub mod config;
pub mod input;
pub mod network;
