//! The engine's context object. Constructed explicitly by the host and
//! dropped at session end; there is no global state.

use std::path::PathBuf;

use uuid::Uuid;

use crate::config::{LoadError, RegistryConfig};
use crate::input::aggregate::InputAggregate;
use crate::input::bind::BindInput;
use crate::input::registry::InputRegistry;
use crate::input::source::SourceDriver;

/// How often the background rescan looks for replugged hardware, in ticks.
pub const RESCAN_INTERVAL_TICKS: u64 = 300;

/// Owns the driver, the persisted registry, and the aggregator, and runs
/// one aggregation pass per host tick.
///
/// Nothing in [InputManager::update] propagates an error to the caller:
/// per-device failures are contained by the device itself, and discovery
/// failures are logged and retried on the next rescan.
pub struct InputManager {
    driver: Box<dyn SourceDriver>,
    pub registry: InputRegistry,
    pub aggregate: InputAggregate,
    registry_path: PathBuf,
    current_tick: u64,
}

impl InputManager {
    /// Build the manager from the persisted registry at `registry_path`,
    /// falling back to defaults (and quarantining the file) when it
    /// cannot be parsed.
    pub fn new(driver: Box<dyn SourceDriver>, registry_path: PathBuf) -> Self {
        let config = RegistryConfig::load_or_quarantine(&registry_path);
        let registry = config.into_registry();
        let mut aggregate = InputAggregate::new();
        aggregate.analog_input_active = registry.input_active_by_default;

        Self {
            driver,
            registry,
            aggregate,
            registry_path,
            current_tick: 0,
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Discover attached hardware, acquire every device that came up, and
    /// register them with the aggregator. Called once at startup; the
    /// update loop repeats it periodically to catch replugs.
    pub fn start(&mut self) {
        self.rescan(false);
    }

    /// One host tick: periodic rescan, then a full aggregation pass.
    pub fn update(&mut self) {
        self.current_tick = self.current_tick.wrapping_add(1);

        if self.current_tick % RESCAN_INTERVAL_TICKS == 0 {
            self.rescan(true);
        }

        self.aggregate.update_inputs(&mut self.registry.devices);
    }

    /// Whether the host should skip running inputs this tick. Only applies
    /// to multiplayer clients; the server and single player always sample.
    pub fn should_throttle(&self, is_server: bool, multiplayer_active: bool) -> bool {
        if is_server || !multiplayer_active {
            return false;
        }
        let multiplier = self.registry.throttle_multiplier.max(1) as u64;
        multiplier > 1 && self.current_tick % multiplier != 0
    }

    /// Reconcile hardware, re-acquire anything initialized but not
    /// acquired (fresh discoveries and replugged devices alike), and keep
    /// the aggregator's registration list current.
    fn rescan(&mut self, rediscover: bool) {
        match self.registry.discover(self.driver.as_mut(), rediscover) {
            Ok(dirty) => {
                if dirty {
                    if let Err(e) = self.save() {
                        log::warn!("Failed to persist registry after discovery: {e}");
                    }
                }
            }
            Err(e) => log::warn!("Device discovery failed: {e}"),
        }

        for device in &mut self.registry.devices {
            if device.is_initialized() && !device.is_acquired() {
                device.acquire();
            }
            self.aggregate.register_device(device);
        }
        self.aggregate.prune_registrations(&self.registry.devices);
    }

    /// Release a device explicitly, clearing any action bits its binds
    /// were holding.
    pub fn release_device(&mut self, uuid: Uuid) {
        if let Some(device) = self.registry.device_by_uuid(uuid) {
            let actions = device.unacquire();
            self.aggregate.on_device_unacquired(actions);
        }
    }

    /// Poll every acquired device for a new control transition, for the
    /// press-any-control capture flow. Returns the owning device and the
    /// skeleton input selector of the first transition found.
    pub fn detect_bind(&mut self) -> Option<(Uuid, BindInput)> {
        for device in &mut self.registry.devices {
            if let Some(input) = device.detect_bind() {
                return Some((device.uuid(), input));
            }
        }
        None
    }

    /// Persist the registry to its YAML file.
    pub fn save(&self) -> Result<(), LoadError> {
        RegistryConfig::from_registry(&self.registry).to_yaml_file(&self.registry_path)
    }
}
