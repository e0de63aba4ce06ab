use uuid::Uuid;

use crate::input::bind::{Bind, BindInput, BindOutput};
use crate::input::capability::{DeviceAxis, GameAction, GameAxis, HatDirection};
use crate::input::device::{DeviceUpdate, InputDevice};
use crate::input::testing::{discovered, FakeRaw};

const EPSILON: f32 = 1e-6;

fn axis_bind(axis: DeviceAxis, output: GameAxis) -> Bind {
    Bind::new(
        BindInput::Axis {
            axis,
            invert: false,
        },
        BindOutput::Axis(output),
    )
    .with_shaping(0.0, 0.0)
}

fn button_bind(button: usize, action: GameAction) -> Bind {
    Bind::new(BindInput::Button { button }, BindOutput::Action(action))
}

fn device_with(raw: &FakeRaw) -> InputDevice {
    crate::input::testing::init_logging();
    let uuid = Uuid::new_v4();
    let mut device = InputDevice::from_config("Test Stick".to_string(), uuid);
    device.init(discovered("Test Stick", uuid, raw.clone()));
    device
}

#[test]
fn test_init_reads_capabilities_and_ranges() {
    let raw = FakeRaw::new(&[DeviceAxis::X, DeviceAxis::RZ], 6, 1);
    let device = device_with(&raw);

    assert!(device.is_initialized());
    assert_eq!(device.buttons(), 6);
    assert_eq!(device.hats(), 1);
    assert!(device.calibration.has_axis(DeviceAxis::X));
    assert!(device.calibration.has_axis(DeviceAxis::RZ));
    assert!(!device.calibration.has_axis(DeviceAxis::Y));
}

#[test]
fn test_bogus_axis_suppressed_until_it_moves() {
    let raw = FakeRaw::new(&[DeviceAxis::X], 0, 0);
    // The driver reports a spurious off-center value before delivering
    // real samples.
    raw.set_axis(DeviceAxis::X, 750);

    let mut device = device_with(&raw);
    device
        .binds
        .push(axis_bind(DeviceAxis::X, GameAxis::StrafeLeftRight));
    assert!(device.acquire());
    assert!(device.is_potentially_bogus(DeviceAxis::X));

    // Unchanged since the baseline: the bind stays suppressed.
    assert_eq!(device.update(true), DeviceUpdate::NoData);
    assert_eq!(device.binds[0].value(), 0.0);

    // Real motion clears the suspicion permanently.
    raw.set_axis(DeviceAxis::X, 800);
    assert_eq!(device.update(true), DeviceUpdate::Data);
    assert!(!device.is_potentially_bogus(DeviceAxis::X));
    assert!((device.binds[0].value() - 0.8).abs() < EPSILON);

    // Returning to the old baseline value is now just input.
    raw.set_axis(DeviceAxis::X, 750);
    assert_eq!(device.update(true), DeviceUpdate::Data);
    assert!((device.binds[0].value() - 0.75).abs() < EPSILON);
}

#[test]
fn test_poll_failure_tears_down_and_reports_held_actions() {
    let raw = FakeRaw::new(&[], 2, 0);
    let mut device = device_with(&raw);
    device.binds.push(button_bind(0, GameAction::FirePrimary));
    assert!(device.acquire());

    raw.set_button(0, true);
    assert_eq!(device.update(true), DeviceUpdate::Data);
    assert!(device.binds[0].is_active());

    raw.fail_polls();
    match device.update(true) {
        DeviceUpdate::Lost(actions) => {
            assert!(actions.contains(GameAction::FirePrimary));
        }
        other => panic!("expected Lost, got {other:?}"),
    }
    assert!(!device.is_initialized());
    assert!(!device.is_acquired());
    assert!(!device.binds[0].is_active());
}

#[test]
fn test_unacquire_returns_held_actions_and_resets_binds() {
    let raw = FakeRaw::new(&[], 2, 0);
    let mut device = device_with(&raw);
    device.binds.push(button_bind(1, GameAction::Brake));
    assert!(device.acquire());

    raw.set_button(1, true);
    assert_eq!(device.update(true), DeviceUpdate::Data);

    let actions = device.unacquire();
    assert!(actions.contains(GameAction::Brake));
    assert!(!device.is_acquired());
    assert!(!device.binds[0].is_active());
}

#[test]
fn test_detect_bind_prefers_buttons_over_axes() {
    let raw = FakeRaw::new(&[DeviceAxis::X], 2, 0);
    let mut device = device_with(&raw);
    assert!(device.acquire());

    // Prime: one quiet sample so edge detection has a previous state.
    assert!(device.detect_bind().is_none());

    raw.set_button(1, true);
    raw.set_axis(DeviceAxis::X, 900);
    assert_eq!(device.detect_bind(), Some(BindInput::Button { button: 1 }));
}

#[test]
fn test_detect_bind_axis_threshold_crossing() {
    let raw = FakeRaw::new(&[DeviceAxis::X, DeviceAxis::Y], 0, 0);
    raw.set_axis(DeviceAxis::X, 500);
    raw.set_axis(DeviceAxis::Y, 500);
    let mut device = device_with(&raw);
    assert!(device.acquire());
    assert!(device.detect_bind().is_none());

    // Small jitter does not register.
    raw.set_axis(DeviceAxis::Y, 600);
    assert!(device.detect_bind().is_none());

    // Pushing Y past the high threshold does.
    raw.set_axis(DeviceAxis::Y, 900);
    assert_eq!(
        device.detect_bind(),
        Some(BindInput::Axis {
            axis: DeviceAxis::Y,
            invert: false
        })
    );
}

#[test]
fn test_detect_bind_hat_direction() {
    let raw = FakeRaw::new(&[], 0, 1);
    let mut device = device_with(&raw);
    assert!(device.acquire());
    assert!(device.detect_bind().is_none());

    raw.set_hat(0, Some(18000));
    assert_eq!(
        device.detect_bind(),
        Some(BindInput::Hat {
            hat: 0,
            direction: HatDirection::Down
        })
    );
}

#[test]
fn test_update_without_acquire_is_no_data() {
    let raw = FakeRaw::new(&[DeviceAxis::X], 0, 0);
    let mut device = device_with(&raw);
    assert_eq!(device.update(true), DeviceUpdate::NoData);
}
