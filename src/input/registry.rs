//! The persisted device set and the identity matcher that reattaches it
//! to live hardware.

use crate::input::device::InputDevice;
use crate::input::source::{DiscoveredDevice, SourceDriver, SourceError};

/// Every known device plus the global input settings. The registry spans
/// the host process's lifetime and is persisted across runs; devices are
/// only ever removed explicitly.
pub struct InputRegistry {
    pub devices: Vec<InputDevice>,
    /// Whether analog input starts enabled when taking control of an
    /// object.
    pub input_active_by_default: bool,
    /// Run aggregation only every Nth tick for multiplayer clients. The
    /// engine exposes the knob; the host decides whether to honor it.
    pub throttle_multiplier: u16,
}

impl Default for InputRegistry {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            input_active_by_default: true,
            throttle_multiplier: 1,
        }
    }
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile live hardware against the persisted device list.
    ///
    /// Identity fields are not trustworthy on their own: some drivers
    /// reassign instance ids across replugs, and some report the same name
    /// for several devices. Matching is therefore layered:
    ///
    /// 1. exact name + id match;
    /// 2. name-only fallback, first unclaimed entry in discovery order;
    /// 3. anything still unclaimed is a brand-new device.
    ///
    /// Persisted devices no live hardware claims are left untouched so
    /// configuration survives unplugs. Returns whether the persisted set
    /// changed (new devices, or re-initialization during a `rediscover`
    /// pass).
    pub fn discover(
        &mut self,
        driver: &mut dyn SourceDriver,
        rediscover: bool,
    ) -> Result<bool, SourceError> {
        log::debug!("Checking for attached devices...");
        let attached = driver.devices()?;

        let mut claimed = vec![false; self.devices.len()];
        let mut targets: Vec<Option<usize>> = Vec::with_capacity(attached.len());

        // Pass 1: exact identity.
        for found in &attached {
            let target = self.devices.iter().enumerate().position(|(i, known)| {
                !claimed[i] && known.name() == found.name && known.uuid() == found.uuid
            });
            if let Some(i) = target {
                claimed[i] = true;
            }
            targets.push(target);
        }

        // Pass 2: name-only fallback, discovery order.
        for (found, target) in attached.iter().zip(targets.iter_mut()) {
            if target.is_some() {
                continue;
            }
            let by_name = self
                .devices
                .iter()
                .enumerate()
                .position(|(i, known)| !claimed[i] && known.name() == found.name);
            if let Some(i) = by_name {
                log::warn!(
                    "Found entries for '{}', but none matching id {}; claiming the first by name",
                    found.name,
                    found.uuid
                );
                claimed[i] = true;
                *target = Some(i);
            }
        }

        // Pass 3: attach handles, creating records for new hardware.
        let mut dirty = false;
        for (found, target) in attached.into_iter().zip(targets) {
            match target {
                Some(i) => {
                    let device = &mut self.devices[i];
                    if !device.is_initialized() {
                        log::info!("- Existing device '{}' found", found.name);
                        device.init(found);
                        dirty |= rediscover;
                    }
                    // Already initialized: the old handle stays; the
                    // duplicate enumeration handle is dropped.
                }
                None => {
                    log::info!("- New device '{}' found", found.name);
                    let mut device = self.new_device(&found);
                    device.init(found);
                    self.devices.push(device);
                    dirty = true;
                }
            }
        }

        Ok(dirty)
    }

    fn new_device(&self, found: &DiscoveredDevice) -> InputDevice {
        InputDevice::from_config(found.name.clone(), found.uuid)
    }

    /// Drop devices with no binds left, keeping the persisted file
    /// minimal. Runtime binds are valid by construction; malformed
    /// persisted binds were already pruned at load time.
    pub fn cleanup(&mut self, prune_empty: bool) {
        if prune_empty {
            self.devices.retain(|device| {
                if device.has_binds() || device.is_initialized() {
                    return true;
                }
                log::info!("Pruning bindless device '{}'", device.name());
                false
            });
        }
    }

    pub fn device_by_uuid(&mut self, uuid: uuid::Uuid) -> Option<&mut InputDevice> {
        self.devices.iter_mut().find(|d| d.uuid() == uuid)
    }
}
