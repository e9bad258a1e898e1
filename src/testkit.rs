use std::collections::{HashMap, HashSet};

use crate::host::{GameHost, Location, ObserverId, SendError, WorldId};
use crate::protocol::{EntityPacket, ProtocolDialect};

const DEFAULT_VIEW_DISTANCE_CHUNKS: i32 = 10;

/// Scripted in-memory host: observers are placed explicitly, every packet is
/// recorded in send order, and individual observers can be made to fail.
pub struct RecordingHost {
    dialect: ProtocolDialect,
    global_view_distance: i32,
    world_view_distances: HashMap<WorldId, i32>,
    observers: HashMap<ObserverId, Location>,
    failing: HashSet<ObserverId>,
    pub sent: Vec<(ObserverId, EntityPacket)>,
}

impl RecordingHost {
    pub fn new(dialect: ProtocolDialect) -> Self {
        Self {
            dialect,
            global_view_distance: DEFAULT_VIEW_DISTANCE_CHUNKS,
            world_view_distances: HashMap::new(),
            observers: HashMap::new(),
            failing: HashSet::new(),
            sent: Vec::new(),
        }
    }

    /// Put an observer at a location, moving them if already placed.
    pub fn place_observer(&mut self, observer: ObserverId, location: Location) {
        self.observers.insert(observer, location);
    }

    pub fn remove_observer(&mut self, observer: ObserverId) {
        self.observers.remove(&observer);
    }

    pub fn set_global_view_distance(&mut self, chunks: i32) {
        self.global_view_distance = chunks;
    }

    pub fn set_world_view_distance(&mut self, world: WorldId, chunks: i32) {
        self.world_view_distances.insert(world, chunks);
    }

    /// Make every future send to this observer fail.
    pub fn fail_sends_to(&mut self, observer: ObserverId) {
        self.failing.insert(observer);
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Packets delivered to one observer, oldest first.
    pub fn sent_to(&self, observer: ObserverId) -> Vec<&EntityPacket> {
        self.sent
            .iter()
            .filter(|(target, _)| *target == observer)
            .map(|(_, packet)| packet)
            .collect()
    }
}

impl GameHost for RecordingHost {
    fn observers_in_world(&self, world: WorldId) -> Vec<ObserverId> {
        let mut ids: Vec<ObserverId> = self
            .observers
            .iter()
            .filter(|(_, location)| location.world == world)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn observer_location(&self, observer: ObserverId) -> Option<Location> {
        self.observers.get(&observer).copied()
    }

    fn send_packet(
        &mut self,
        observer: ObserverId,
        packet: &EntityPacket,
    ) -> Result<(), SendError> {
        if self.failing.contains(&observer) {
            return Err(SendError::Disconnected(observer));
        }
        self.sent.push((observer, packet.clone()));
        Ok(())
    }

    fn dialect(&self) -> ProtocolDialect {
        self.dialect
    }

    fn world_view_distance(&self, world: WorldId) -> i32 {
        self.world_view_distances
            .get(&world)
            .copied()
            .unwrap_or(DEFAULT_VIEW_DISTANCE_CHUNKS)
    }

    fn global_view_distance(&self) -> i32 {
        self.global_view_distance
    }
}
