use std::fmt;

use crate::host::{GameHost, Location, ObserverId};
use crate::metadata::DisplaySettings;
use crate::protocol::{self, EntityId, EntityPacket};

/// Per-observer content resolution for a dynamic line.
///
/// Total and side-effect-free: every observer gets a string, there is no
/// failure path.
pub type ContentResolver = Box<dyn Fn(ObserverId) -> String + Send + Sync>;

/// What a line renders.
pub enum LineContent {
    Static(String),
    Dynamic(ContentResolver),
    /// Invisible spacer row.
    Empty,
}

impl LineContent {
    /// The literal text shown to `observer` this tick.
    pub fn resolve(&self, observer: ObserverId) -> String {
        match self {
            LineContent::Static(text) => text.clone(),
            LineContent::Dynamic(resolver) => resolver(observer),
            LineContent::Empty => String::new(),
        }
    }
}

impl fmt::Debug for LineContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineContent::Static(text) => f.debug_tuple("Static").field(text).finish(),
            LineContent::Dynamic(_) => f.write_str("Dynamic(..)"),
            LineContent::Empty => f.write_str("Empty"),
        }
    }
}

/// One renderable row of a hologram.
///
/// Owns a stable negative entity id for its whole life; `location` stays
/// `None` until the owning hologram spawns and is the anchor plus this
/// line's vertical offset from then on.
#[derive(Debug)]
pub struct HologramLine {
    entity_id: EntityId,
    settings: DisplaySettings,
    vertical_offset: f32,
    content: LineContent,
    location: Option<Location>,
}

impl HologramLine {
    pub(crate) fn new(
        entity_id: EntityId,
        settings: DisplaySettings,
        vertical_offset: f32,
        content: LineContent,
    ) -> Self {
        Self {
            entity_id,
            settings,
            vertical_offset,
            content,
            location: None,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn vertical_offset(&self) -> f32 {
        self.vertical_offset
    }

    pub fn content(&self) -> &LineContent {
        &self.content
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    fn current_location(&self) -> &Location {
        self.location
            .as_ref()
            .expect("line location is set when the hologram spawns")
    }

    /// Spawn this line on the observer's client, metadata following.
    pub(crate) fn show(&self, host: &mut dyn GameHost, observer: ObserverId) {
        let dialect = host.dialect();
        let name = self.content.resolve(observer);
        let spawn = protocol::spawn_packet(
            dialect,
            self.entity_id,
            self.current_location(),
            &self.settings,
            &name,
        );
        send_or_log(host, observer, &spawn);
        let metadata = protocol::metadata_packet(dialect, self.entity_id, &self.settings, &name);
        send_or_log(host, observer, &metadata);
    }

    /// Remove this line from the observer's client.
    pub(crate) fn hide(&self, host: &mut dyn GameHost, observer: ObserverId) {
        let packet = protocol::destroy_packet(host.dialect(), self.entity_id);
        send_or_log(host, observer, &packet);
    }

    /// Re-send current content to an observer that already has the entity.
    pub(crate) fn update(&self, host: &mut dyn GameHost, observer: ObserverId) {
        let name = self.content.resolve(observer);
        let packet = protocol::metadata_packet(host.dialect(), self.entity_id, &self.settings, &name);
        send_or_log(host, observer, &packet);
    }

    /// Move this line to its already-updated location on the observer's client.
    pub(crate) fn teleport(&self, host: &mut dyn GameHost, observer: ObserverId) {
        let packet = protocol::teleport_packet(host.dialect(), self.entity_id, self.current_location());
        send_or_log(host, observer, &packet);
    }
}

/// Best-effort delivery: a failed send is logged and skipped, the next tick
/// self-corrects for observers that are actually gone.
pub(crate) fn send_or_log(host: &mut dyn GameHost, observer: ObserverId, packet: &EntityPacket) {
    if let Err(error) = host.send_packet(observer, packet) {
        log::warn!("packet send to observer {observer} failed: {error}");
    }
}
