use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{EntityPacket, ProtocolDialect};

/// Host-assigned identifier of a connected client.
pub type ObserverId = u64;

/// Host-assigned identifier of a loaded world.
pub type WorldId = u64;

/// A world position plus view angles, mirroring the host's location value.
///
/// Equality is exact per-component equality; `Hologram::teleport_to` relies
/// on that to detect a no-op move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    pub fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self {
            world,
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Same location shifted upward by `offset` blocks.
    pub fn raised(&self, offset: f32) -> Self {
        Self {
            y: self.y + f64::from(offset),
            ..*self
        }
    }

    /// Squared euclidean distance, ignoring view angles.
    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Failure to deliver one packet to one observer.
///
/// Always per-packet: a failed send never aborts the remaining observers or
/// lines of the same tick, and never changes visibility bookkeeping.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("observer {0} is not connected")]
    Disconnected(ObserverId),
    #[error("packet write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The world/connection layer this core consumes.
///
/// Implementations deliver pre-built packets to clients and answer world
/// queries; the core performs no I/O of its own.
pub trait GameHost {
    fn observers_in_world(&self, world: WorldId) -> Vec<ObserverId>;

    fn observer_location(&self, observer: ObserverId) -> Option<Location>;

    fn send_packet(
        &mut self,
        observer: ObserverId,
        packet: &EntityPacket,
    ) -> Result<(), SendError>;

    fn dialect(&self) -> ProtocolDialect;

    /// Per-world view distance in chunks, consulted by the modern dialect.
    fn world_view_distance(&self, world: WorldId) -> i32;

    /// Server-wide view distance in chunks, consulted by the legacy dialect.
    fn global_view_distance(&self) -> i32;
}
