use std::collections::HashSet;

use crate::host::{GameHost, Location, ObserverId, WorldId};
use crate::interact::InteractHandler;
use crate::line::HologramLine;
use crate::protocol::ProtocolDialect;

/// Flat per-chunk radius factor for the range test. Not a true spherical
/// render-distance conversion; retained from source behavior.
pub const VIEW_DISTANCE_RANGE_FACTOR: i32 = 500;

/// An ordered stack of virtual entity lines sharing one anchor location.
///
/// Tracks, per observer, whether the lines currently exist on that client
/// (`present_to`) and whether the observer asked to never see them
/// (`hidden_to`). Observers absent from both sets are simply unknown, which
/// means default-visible and not yet spawned.
#[derive(Debug)]
pub struct Hologram {
    anchor: Option<Location>,
    lines: Vec<HologramLine>,
    spawned: bool,
    destroyed: bool,
    hidden_to: HashSet<ObserverId>,
    present_to: HashSet<ObserverId>,
    interact_handler: Option<InteractHandler>,
}

impl Hologram {
    pub(crate) fn new(lines: Vec<HologramLine>, interact_handler: Option<InteractHandler>) -> Self {
        Self {
            anchor: None,
            lines,
            spawned: false,
            destroyed: false,
            hidden_to: HashSet::new(),
            present_to: HashSet::new(),
            interact_handler,
        }
    }

    /// Lines in display order, top to bottom. Fixed after build.
    pub fn lines(&self) -> &[HologramLine] {
        &self.lines
    }

    pub fn anchor(&self) -> Option<&Location> {
        self.anchor.as_ref()
    }

    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_hidden_to(&self, observer: ObserverId) -> bool {
        self.hidden_to.contains(&observer)
    }

    /// Whether the most recent packet sent to this observer was a spawn.
    pub fn is_present_to(&self, observer: ObserverId) -> bool {
        self.present_to.contains(&observer)
    }

    pub fn set_interact_handler(&mut self, handler: InteractHandler) {
        self.interact_handler = Some(handler);
    }

    pub(crate) fn interact_handler_mut(&mut self) -> Option<&mut InteractHandler> {
        self.interact_handler.as_mut()
    }

    fn assert_live(&self) {
        assert!(
            !self.destroyed,
            "operation on a destroyed hologram is a caller bug"
        );
    }

    /// Spawn at `anchor` and immediately show to every in-range observer.
    ///
    /// Valid exactly once per hologram life.
    pub fn spawn(&mut self, host: &mut dyn GameHost, anchor: Location) {
        self.assert_live();
        assert!(!self.spawned, "hologram is already spawned");

        self.set_anchor_locations(anchor);
        self.spawned = true;

        for observer in sorted(host.observers_in_world(anchor.world)) {
            if self.hidden_to.contains(&observer) || !self.is_in_range(host, observer) {
                continue;
            }
            for line in &self.lines {
                line.show(host, observer);
            }
            self.present_to.insert(observer);
        }
    }

    /// Tear down everywhere. After this the owner must discard the hologram;
    /// the registry drops it on its next tick.
    pub fn destroy(&mut self, host: &mut dyn GameHost) {
        assert!(!self.destroyed, "hologram is already destroyed");

        for observer in sorted(self.present_to.iter().copied().collect()) {
            for line in &self.lines {
                line.hide(host, observer);
            }
        }
        self.present_to.clear();
        self.destroyed = true;
        self.spawned = false;
        log::debug!("hologram destroyed, {} lines torn down", self.lines.len());
    }

    /// Force-show to one observer, clearing any explicit hide. Spawns
    /// regardless of range; silently does nothing before `spawn`.
    pub fn show(&mut self, host: &mut dyn GameHost, observer: ObserverId) {
        self.assert_live();
        if !self.spawned {
            return;
        }
        self.hidden_to.remove(&observer);
        for line in &self.lines {
            line.show(host, observer);
        }
        self.present_to.insert(observer);
    }

    /// Hide from one observer until `show` clears it. Idempotent: repeated
    /// destroy packets are tolerated by the client.
    pub fn hide(&mut self, host: &mut dyn GameHost, observer: ObserverId) {
        self.assert_live();
        for line in &self.lines {
            line.hide(host, observer);
        }
        self.hidden_to.insert(observer);
        self.present_to.remove(&observer);
    }

    /// Forget everything known about an observer. For the host to call when
    /// the observer disconnects.
    pub fn invalidate_observer(&mut self, observer: ObserverId) {
        self.hidden_to.remove(&observer);
        self.present_to.remove(&observer);
    }

    fn view_distance_chunks(&self, host: &dyn GameHost, world: WorldId) -> i32 {
        // Legacy clients only know the server-wide distance; modern worlds
        // carry their own.
        match host.dialect() {
            ProtocolDialect::Legacy => host.global_view_distance(),
            ProtocolDialect::Modern => host.world_view_distance(world),
        }
    }

    /// Same world and within the flat view-distance radius, boundary
    /// inclusive.
    pub fn is_in_range(&self, host: &dyn GameHost, observer: ObserverId) -> bool {
        let Some(anchor) = self.anchor.as_ref() else {
            return false;
        };
        let Some(observer_location) = host.observer_location(observer) else {
            return false;
        };
        if observer_location.world != anchor.world {
            return false;
        }
        let threshold =
            f64::from(self.view_distance_chunks(host, anchor.world) * VIEW_DISTANCE_RANGE_FACTOR);
        anchor.distance_squared(&observer_location) <= threshold
    }

    pub fn can_see(&self, host: &dyn GameHost, observer: ObserverId) -> bool {
        self.spawned && !self.hidden_to.contains(&observer) && self.is_in_range(host, observer)
    }

    /// Advance the visibility state machine one tick for every observer in
    /// the anchor world.
    pub fn update(&mut self, host: &mut dyn GameHost) {
        self.assert_live();
        if !self.spawned {
            return;
        }
        let world = self
            .anchor
            .as_ref()
            .expect("spawned hologram has an anchor")
            .world;

        for observer in sorted(host.observers_in_world(world)) {
            let present = self.present_to.contains(&observer);

            if !self.is_in_range(host, observer) {
                if present {
                    for line in &self.lines {
                        line.hide(host, observer);
                    }
                    self.present_to.remove(&observer);
                }
                continue;
            }

            // In range but explicitly hidden renders as out-of-range,
            // without packets; hide() already tore the entities down.
            if self.hidden_to.contains(&observer) {
                self.present_to.remove(&observer);
                continue;
            }

            if present {
                for line in &self.lines {
                    line.update(host, observer);
                }
            } else {
                for line in &self.lines {
                    line.show(host, observer);
                }
                self.present_to.insert(observer);
            }
        }
    }

    /// Re-send current content to one observer that can see the hologram.
    pub fn update_observer(&mut self, host: &mut dyn GameHost, observer: ObserverId) {
        self.assert_live();
        if !self.can_see(host, observer) || !self.present_to.contains(&observer) {
            return;
        }
        for line in &self.lines {
            line.update(host, observer);
        }
    }

    /// Move the anchor, repositioning every line for every observer that
    /// currently has the entities. Exact anchor equality is a no-op.
    pub fn teleport_to(&mut self, host: &mut dyn GameHost, anchor: Location) {
        self.assert_live();
        assert!(self.spawned, "hologram must be spawned before it can teleport");

        if self.anchor.as_ref() == Some(&anchor) {
            return;
        }
        self.set_anchor_locations(anchor);

        for observer in sorted(self.present_to.iter().copied().collect()) {
            for line in &self.lines {
                line.teleport(host, observer);
            }
        }
    }

    fn set_anchor_locations(&mut self, anchor: Location) {
        for line in &mut self.lines {
            let offset = line.vertical_offset();
            line.set_location(anchor.raised(offset));
        }
        self.anchor = Some(anchor);
    }
}

/// Deterministic packet order across observers.
fn sorted(mut observers: Vec<ObserverId>) -> Vec<ObserverId> {
    observers.sort_unstable();
    observers
}
