//! Multiplayer brake-force mirroring.
//!
//! Wheel braking is computed on the client but applied by the
//! authoritative server, so the one derived value that must cross the
//! wire does it here: a tiny unreliable packet sent whenever the local
//! brake force changes by at least one quantization step.

use packed_struct::prelude::*;


/// One brake-force update for a controlled grid. The force is carried as
/// 16-bit fixed point (`0..=u16::MAX` maps to `0.0..=1.0`); the flags
/// byte marks which optional fields are present.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "11")]
pub struct AnalogInputUpdate {
    #[packed_field(bytes = "0..=7", endian = "lsb")]
    pub grid_id: i64,
    #[packed_field(bytes = "8")]
    pub flags: u8,
    #[packed_field(bytes = "9..=10", endian = "lsb")]
    pub brake_force_raw: u16,
}

impl AnalogInputUpdate {
    pub const BRAKE_FORCE_PRESENT: u8 = 1 << 0;

    pub fn new(grid_id: i64, brake_force: Option<f32>) -> Self {
        let mut update = Self {
            grid_id,
            ..Default::default()
        };
        if let Some(force) = brake_force {
            update.flags |= Self::BRAKE_FORCE_PRESENT;
            update.brake_force_raw = quantize(force);
        }
        update
    }

    pub fn brake_force(&self) -> Option<f32> {
        if self.flags & Self::BRAKE_FORCE_PRESENT == 0 {
            return None;
        }
        Some(self.brake_force_raw as f32 / u16::MAX as f32)
    }
}

fn quantize(force: f32) -> u16 {
    (force.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

/// The host's message primitives. Both sends report success as a bool;
/// the engine treats a failed send as "try again on the next change".
pub trait Transport {
    fn send_to_server(&mut self, payload: &[u8], reliable: bool) -> bool;
    fn send_to_peer(&mut self, payload: &[u8], peer_id: u64, reliable: bool) -> bool;
}

/// Client-side sender: forwards the locally computed brake force to the
/// server whenever it changes meaningfully (one fixed-point step).
#[derive(Debug, Default)]
pub struct BrakeMirror {
    last_sent: Option<u16>,
}

impl BrakeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send an update if the force has changed since the last successful
    /// send. Returns whether a packet went out.
    pub fn mirror(
        &mut self,
        grid_id: i64,
        brake_force: f32,
        transport: &mut dyn Transport,
    ) -> bool {
        let raw = quantize(brake_force);
        if self.last_sent == Some(raw) {
            return false;
        }

        let update = AnalogInputUpdate::new(grid_id, Some(brake_force));
        let payload = match update.pack() {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Failed to pack brake update: {e}");
                return false;
            }
        };

        if transport.send_to_server(&payload, false) {
            self.last_sent = Some(raw);
            true
        } else {
            false
        }
    }

    /// Forget the last sent value, forcing the next mirror call to send.
    /// Used when control of the grid changes hands.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

/// Server-side receiver. Decodes a client packet and returns the brake
/// force to apply, but only when `has_control` confirms the sending peer
/// pilots the referenced grid.
pub fn apply_update<F>(payload: &[u8], peer_id: u64, has_control: F) -> Option<(i64, f32)>
where
    F: Fn(i64, u64) -> bool,
{
    let update = match AnalogInputUpdate::unpack_from_slice(payload) {
        Ok(update) => update,
        Err(e) => {
            log::debug!("Discarding undecodable input update from peer {peer_id}: {e}");
            return None;
        }
    };

    if !has_control(update.grid_id, peer_id) {
        log::debug!(
            "Discarding input update for grid {} from non-controlling peer {peer_id}",
            update.grid_id
        );
        return None;
    }

    let brake_force = update.brake_force()?;
    Some((update.grid_id, brake_force))
}
