use uuid::Uuid;

use crate::input::bind::{Bind, BindInput, BindOutput};
use crate::input::capability::{DeviceAxis, GameAxis};
use crate::input::device::InputDevice;
use crate::input::registry::InputRegistry;
use crate::input::testing::{FakeDriver, FakeRaw};

fn stick(name: &str, uuid: Uuid) -> (String, Uuid, FakeRaw) {
    (name.to_string(), uuid, FakeRaw::new(&[DeviceAxis::X], 2, 0))
}

fn persisted(name: &str, uuid: Uuid) -> InputDevice {
    let mut device = InputDevice::from_config(name.to_string(), uuid);
    device.binds.push(
        Bind::new(
            BindInput::Axis {
                axis: DeviceAxis::X,
                invert: false,
            },
            BindOutput::Axis(GameAxis::StrafeLeftRight),
        ),
    );
    device
}

#[test]
fn test_new_hardware_creates_a_record() {
    let mut registry = InputRegistry::new();
    let uuid = Uuid::new_v4();
    let mut driver = FakeDriver {
        attached: vec![stick("Flight Stick", uuid)],
    };

    let dirty = registry.discover(&mut driver, false).unwrap();
    assert!(dirty);
    assert_eq!(registry.devices.len(), 1);
    assert_eq!(registry.devices[0].name(), "Flight Stick");
    assert_eq!(registry.devices[0].uuid(), uuid);
    assert!(registry.devices[0].is_initialized());
}

#[test]
fn test_exact_identity_beats_name_fallback() {
    let id1 = Uuid::new_v4();
    let id2 = Uuid::new_v4();
    let mut registry = InputRegistry::new();
    registry.devices.push(persisted("Flight Stick", id1));
    registry.devices.push(persisted("Flight Stick", id2));

    let mut driver = FakeDriver {
        attached: vec![stick("Flight Stick", id2)],
    };
    registry.discover(&mut driver, false).unwrap();

    assert_eq!(registry.devices.len(), 2);
    assert!(!registry.devices[0].is_initialized());
    assert!(registry.devices[1].is_initialized());
    assert_eq!(registry.devices[1].uuid(), id2);
}

#[test]
fn test_name_fallback_claims_first_unclaimed_entry() {
    let id1 = Uuid::new_v4();
    let id2 = Uuid::new_v4();
    let id3 = Uuid::new_v4();
    let mut registry = InputRegistry::new();
    registry.devices.push(persisted("Flight Stick", id1));
    registry.devices.push(persisted("Flight Stick", id2));

    // Same hardware after the driver reassigned its instance id.
    let mut driver = FakeDriver {
        attached: vec![stick("Flight Stick", id3)],
    };
    registry.discover(&mut driver, false).unwrap();

    assert_eq!(registry.devices.len(), 2, "no new record for a replug");
    assert!(registry.devices[0].is_initialized());
    assert_eq!(registry.devices[0].uuid(), id3, "claimed entry follows the hardware");
    assert!(!registry.devices[1].is_initialized());
    assert_eq!(registry.devices[1].uuid(), id2);
}

#[test]
fn test_unplugged_devices_keep_their_configuration() {
    let uuid = Uuid::new_v4();
    let mut registry = InputRegistry::new();
    registry.devices.push(persisted("Flight Stick", uuid));

    let mut driver = FakeDriver { attached: vec![] };
    let dirty = registry.discover(&mut driver, false).unwrap();

    assert!(!dirty);
    assert_eq!(registry.devices.len(), 1);
    assert!(!registry.devices[0].is_initialized());
    assert!(registry.devices[0].has_binds());
}

#[test]
fn test_rediscovery_keeps_existing_handle() {
    let uuid = Uuid::new_v4();
    let mut registry = InputRegistry::new();
    let mut driver = FakeDriver {
        attached: vec![stick("Flight Stick", uuid)],
    };

    assert!(registry.discover(&mut driver, false).unwrap());
    assert!(registry.devices[0].acquire());

    // A rescan enumerating the same hardware must not disturb the
    // acquired device.
    assert!(!registry.discover(&mut driver, true).unwrap());
    assert_eq!(registry.devices.len(), 1);
    assert!(registry.devices[0].is_acquired());
}

#[test]
fn test_cleanup_prunes_only_bindless_disconnected_devices() {
    let mut registry = InputRegistry::new();
    registry.devices.push(persisted("Keep Me", Uuid::new_v4()));
    registry
        .devices
        .push(InputDevice::from_config("Prune Me".to_string(), Uuid::new_v4()));

    registry.cleanup(true);
    assert_eq!(registry.devices.len(), 1);
    assert_eq!(registry.devices[0].name(), "Keep Me");

    registry
        .devices
        .push(InputDevice::from_config("Stays".to_string(), Uuid::new_v4()));
    registry.cleanup(false);
    assert_eq!(registry.devices.len(), 2);
}

#[test]
fn test_device_by_uuid() {
    let uuid = Uuid::new_v4();
    let mut registry = InputRegistry::new();
    registry.devices.push(persisted("Flight Stick", uuid));

    assert!(registry.device_by_uuid(uuid).is_some());
    assert!(registry.device_by_uuid(Uuid::new_v4()).is_none());
}
