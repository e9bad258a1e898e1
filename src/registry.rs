use std::collections::HashMap;
use std::time::Duration;

use crate::hologram::Hologram;
use crate::host::{GameHost, ObserverId};
use crate::interact::{InteractAction, InteractContext, UseEntityPacket};
use crate::protocol::EntityId;

/// Suggested scheduler cadence: the source plugin ran its update task after
/// 20 game ticks and every 20 game ticks thereafter.
pub const DEFAULT_TICK_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Allocates virtual entity identifiers.
///
/// Ids are strictly negative and monotonically decreasing so they can never
/// collide with the non-negative ids of real world entities. The allocator
/// is the only writer of the counter; ids are never reused.
#[derive(Debug)]
pub struct EntityIdAllocator {
    next: EntityId,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self { next: -1 }
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next -= 1;
        id
    }
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

pub type HologramId = u64;

/// Owns the set of live holograms and drives their per-tick update.
#[derive(Debug)]
pub struct HologramRegistry {
    allocator: EntityIdAllocator,
    next_hologram_id: HologramId,
    holograms: HashMap<HologramId, Hologram>,
}

impl HologramRegistry {
    pub fn new(allocator: EntityIdAllocator) -> Self {
        Self {
            allocator,
            next_hologram_id: 1,
            holograms: HashMap::new(),
        }
    }

    pub(crate) fn allocator_mut(&mut self) -> &mut EntityIdAllocator {
        &mut self.allocator
    }

    pub fn register(&mut self, hologram: Hologram) -> HologramId {
        let id = self.next_hologram_id;
        self.next_hologram_id += 1;
        self.holograms.insert(id, hologram);
        id
    }

    pub fn unregister(&mut self, id: HologramId) -> Option<Hologram> {
        self.holograms.remove(&id)
    }

    pub fn get(&self, id: HologramId) -> Option<&Hologram> {
        self.holograms.get(&id)
    }

    pub fn get_mut(&mut self, id: HologramId) -> Option<&mut Hologram> {
        self.holograms.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.holograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holograms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HologramId, &Hologram)> {
        self.holograms.iter().map(|(&id, hologram)| (id, hologram))
    }

    /// Resolve a virtual entity id to its hologram and line index.
    ///
    /// Linear over all registered lines; hologram counts are expected to be
    /// small enough that an id index is not worth maintaining.
    pub fn resolve_line(&self, entity_id: EntityId) -> Option<(HologramId, usize)> {
        for (&id, hologram) in &self.holograms {
            for (index, line) in hologram.lines().iter().enumerate() {
                if line.entity_id() == entity_id {
                    return Some((id, index));
                }
            }
        }
        None
    }

    /// One scheduler tick: drop destroyed holograms, then advance every live
    /// one in id order.
    pub fn tick_all(&mut self, host: &mut dyn GameHost) {
        self.holograms.retain(|id, hologram| {
            let keep = !hologram.is_destroyed();
            if !keep {
                log::debug!("unregistering destroyed hologram {id}");
            }
            keep
        });

        for id in self.sorted_ids() {
            if let Some(hologram) = self.holograms.get_mut(&id) {
                hologram.update(host);
            }
        }
    }

    /// Route an incoming use-entity packet to the owning hologram's handler.
    ///
    /// Ids that resolve to no registered line, and holograms without a
    /// handler, are silently ignored.
    pub fn handle_use_entity(&mut self, observer: ObserverId, packet: UseEntityPacket) {
        let Some((hologram_id, line_index)) = self.resolve_line(packet.entity_id) else {
            return;
        };
        let action = InteractAction::classify(packet.action);
        let context = InteractContext {
            observer,
            entity_id: packet.entity_id,
            line_index,
            action,
        };
        if let Some(hologram) = self.holograms.get_mut(&hologram_id) {
            if let Some(handler) = hologram.interact_handler_mut() {
                handler.call(action, &context);
            }
        }
    }

    /// Host hook for player join and world change: both force-show every
    /// hologram the observer can currently see.
    pub fn observer_entered_world(&mut self, host: &mut dyn GameHost, observer: ObserverId) {
        for id in self.sorted_ids() {
            if let Some(hologram) = self.holograms.get_mut(&id) {
                if hologram.can_see(host, observer) {
                    hologram.show(host, observer);
                }
            }
        }
    }

    /// Host hook for observer disconnect.
    pub fn invalidate_observer(&mut self, observer: ObserverId) {
        for hologram in self.holograms.values_mut() {
            hologram.invalidate_observer(observer);
        }
    }

    fn sorted_ids(&self) -> Vec<HologramId> {
        let mut ids: Vec<HologramId> = self.holograms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HologramBuilder;
    use crate::host::Location;
    use crate::interact::{InteractHandler, UseAction};
    use crate::protocol::{EntityPacket, ProtocolDialect};
    use crate::testkit::RecordingHost;
    use std::sync::{Arc, Mutex};

    const WORLD: u64 = 0;

    #[test]
    fn allocator_counts_down_from_minus_one() {
        let mut allocator = EntityIdAllocator::new();
        assert_eq!(allocator.next_id(), -1);
        assert_eq!(allocator.next_id(), -2);
        assert_eq!(allocator.next_id(), -3);
    }

    #[test]
    fn built_lines_get_distinct_negative_ids() {
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let id = HologramBuilder::new()
            .add_line("a")
            .add_line("b")
            .build(&mut registry)
            .unwrap();

        let ids: Vec<_> = registry
            .get(id)
            .unwrap()
            .lines()
            .iter()
            .map(|line| line.entity_id())
            .collect();
        assert_eq!(ids, vec![-1, -2]);
    }

    #[test]
    fn resolve_line_finds_hologram_and_index() {
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let first = HologramBuilder::new()
            .add_line("a")
            .build(&mut registry)
            .unwrap();
        let second = HologramBuilder::new()
            .add_line("b")
            .add_line("c")
            .build(&mut registry)
            .unwrap();

        assert_eq!(registry.resolve_line(-1), Some((first, 0)));
        assert_eq!(registry.resolve_line(-3), Some((second, 1)));
        assert_eq!(registry.resolve_line(-99), None);
        assert_eq!(registry.resolve_line(5), None);
    }

    #[test]
    fn attack_dispatches_left_click_once_with_context() {
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let seen: Arc<Mutex<Vec<InteractContext>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut handler = InteractHandler::new();
        handler.add_action(InteractAction::LeftClick, move |context| {
            sink.lock().unwrap().push(*context);
        });
        let id = HologramBuilder::new()
            .add_line("top")
            .add_line("bottom")
            .interact_handler(handler)
            .build(&mut registry)
            .unwrap();
        let bottom_id = registry.get(id).unwrap().lines()[1].entity_id();

        registry.handle_use_entity(
            42,
            UseEntityPacket {
                entity_id: bottom_id,
                action: UseAction::Attack,
            },
        );

        let calls = seen.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].observer, 42);
        assert_eq!(calls[0].entity_id, bottom_id);
        assert_eq!(calls[0].line_index, 1);
        assert_eq!(calls[0].action, InteractAction::LeftClick);
    }

    #[test]
    fn unknown_target_and_missing_handler_are_ignored() {
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let id = HologramBuilder::new()
            .add_line("no handler")
            .build(&mut registry)
            .unwrap();
        let line_id = registry.get(id).unwrap().lines()[0].entity_id();

        registry.handle_use_entity(
            1,
            UseEntityPacket {
                entity_id: -1234,
                action: UseAction::Attack,
            },
        );
        registry.handle_use_entity(
            1,
            UseEntityPacket {
                entity_id: line_id,
                action: UseAction::Interact,
            },
        );
    }

    #[test]
    fn tick_all_prunes_destroyed_holograms() {
        let mut host = RecordingHost::new(ProtocolDialect::Modern);
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let keep = HologramBuilder::new()
            .add_line("stays")
            .build(&mut registry)
            .unwrap();
        let doomed = HologramBuilder::new()
            .add_line("goes")
            .build(&mut registry)
            .unwrap();

        registry
            .get_mut(doomed)
            .unwrap()
            .spawn(&mut host, Location::new(WORLD, 0.0, 0.0, 0.0));
        registry.get_mut(doomed).unwrap().destroy(&mut host);

        registry.tick_all(&mut host);
        assert!(registry.get(keep).is_some());
        assert!(registry.get(doomed).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn observer_entered_world_shows_only_visible_holograms() {
        let mut host = RecordingHost::new(ProtocolDialect::Modern);
        host.place_observer(9, Location::new(WORLD, 5.0, 0.0, 0.0));
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());

        let near = HologramBuilder::new()
            .add_line("near")
            .build(&mut registry)
            .unwrap();
        let far = HologramBuilder::new()
            .add_line("far")
            .build(&mut registry)
            .unwrap();
        let hidden = HologramBuilder::new()
            .add_line("hidden")
            .build(&mut registry)
            .unwrap();

        registry
            .get_mut(near)
            .unwrap()
            .spawn(&mut host, Location::new(WORLD, 0.0, 0.0, 0.0));
        registry
            .get_mut(far)
            .unwrap()
            .spawn(&mut host, Location::new(WORLD, 9000.0, 0.0, 0.0));
        registry
            .get_mut(hidden)
            .unwrap()
            .spawn(&mut host, Location::new(WORLD, 0.0, 0.0, 0.0));
        registry.get_mut(hidden).unwrap().hide(&mut host, 9);
        host.clear_sent();

        registry.observer_entered_world(&mut host, 9);

        let spawns = host
            .sent_to(9)
            .iter()
            .filter(|p| matches!(p, EntityPacket::SpawnModern { .. }))
            .count();
        assert_eq!(spawns, 1);
    }

    #[test]
    fn invalidate_observer_reaches_every_hologram() {
        let mut host = RecordingHost::new(ProtocolDialect::Modern);
        host.place_observer(3, Location::new(WORLD, 1.0, 0.0, 0.0));
        let mut registry = HologramRegistry::new(EntityIdAllocator::new());
        let id = HologramBuilder::new()
            .add_line("x")
            .build(&mut registry)
            .unwrap();
        registry
            .get_mut(id)
            .unwrap()
            .spawn(&mut host, Location::new(WORLD, 0.0, 0.0, 0.0));
        registry.get_mut(id).unwrap().hide(&mut host, 3);

        // Observer disconnects: the host forgets them, the registry forgets
        // everything holograms knew about them.
        host.remove_observer(3);
        registry.invalidate_observer(3);
        assert!(!registry.get(id).unwrap().is_hidden_to(3));
        assert!(!registry.get(id).unwrap().is_present_to(3));
    }
}
