use serde::{Deserialize, Serialize};

use crate::host::Location;
use crate::metadata::{legacy_metadata, typed_metadata, DisplaySettings, LegacyMetadata, TypedMetadata};

/// Identifier of a virtual entity. Strictly negative for entities this crate
/// fabricates; the real game world only ever assigns non-negative ids.
pub type EntityId = i32;

/// Which generation of the entity protocol the connected clients speak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolDialect {
    /// Fixed-point coordinates, untyped index-to-value metadata.
    Legacy,
    /// Double-precision coordinates, registry-typed metadata.
    Modern,
}

/// Legacy numeric type code for the armor-stand entity.
pub const LEGACY_ARMOR_STAND_TYPE_ID: i32 = 30;

/// Modern registry tag for the armor-stand entity.
pub const MODERN_ARMOR_STAND_TYPE_ID: i32 = 1;

/// One fabricated entity-lifecycle packet, ready for the host send primitive.
///
/// Variants are wire shapes, not semantics: where the two dialects encode the
/// same operation differently they get distinct variants, so a built packet
/// carries exactly the fields the target generation expects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityPacket {
    SpawnLegacy {
        entity_id: EntityId,
        type_id: i32,
        x: i32,
        y: i32,
        z: i32,
        yaw: u8,
        pitch: u8,
        metadata: LegacyMetadata,
    },
    SpawnModern {
        entity_id: EntityId,
        type_id: i32,
        uuid: u128,
        x: f64,
        y: f64,
        z: f64,
    },
    DestroyLegacy {
        entity_ids: [EntityId; 1],
    },
    DestroyModern {
        entity_ids: Vec<EntityId>,
    },
    MetadataLegacy {
        entity_id: EntityId,
        metadata: LegacyMetadata,
    },
    MetadataModern {
        entity_id: EntityId,
        metadata: TypedMetadata,
    },
    TeleportLegacy {
        entity_id: EntityId,
        x: i32,
        y: i32,
        z: i32,
        yaw: u8,
        pitch: u8,
        on_ground: bool,
    },
    TeleportModern {
        entity_id: EntityId,
        x: f64,
        y: f64,
        z: f64,
        yaw: u8,
        pitch: u8,
        on_ground: bool,
    },
}

impl EntityPacket {
    /// Canonical compact byte form of a built packet.
    pub fn to_wire_bytes(&self) -> postcard::Result<Vec<u8>> {
        postcard::to_stdvec(self)
    }
}

/// `coordinate * 32` truncated toward zero: the legacy fixed-point grid.
fn fixed_point(coord: f64) -> i32 {
    (coord * 32.0) as i32
}

/// Scale degrees into the protocol's 256-step angle byte.
fn angle_byte(degrees: f32) -> u8 {
    (degrees * 256.0 / 360.0) as i32 as u8
}

/// Deterministic unique identifier for a virtual entity.
///
/// The modern spawn packet carries a UUID no real entity will ever hold. The
/// entity id is folded into every word and stamped with version-4 layout
/// bits, so the same line always spawns under the same UUID and the encoder
/// stays pure.
fn entity_uuid(entity_id: EntityId) -> u128 {
    let id = u128::from(entity_id as u32);
    let raw = (id << 96) | (id << 64) | (id << 32) | id;
    let versioned = (raw & !(0xf_u128 << 76)) | (0x4_u128 << 76);
    (versioned & !(0x3_u128 << 62)) | (0x2_u128 << 62)
}

/// Build the spawn packet for one line at its absolute location.
///
/// Legacy attaches the line's metadata snapshot inline; modern expects the
/// metadata in a separate follow-up packet.
pub fn spawn_packet(
    dialect: ProtocolDialect,
    entity_id: EntityId,
    location: &Location,
    settings: &DisplaySettings,
    name: &str,
) -> EntityPacket {
    match dialect {
        ProtocolDialect::Legacy => EntityPacket::SpawnLegacy {
            entity_id,
            type_id: LEGACY_ARMOR_STAND_TYPE_ID,
            x: fixed_point(location.x),
            y: fixed_point(location.y),
            z: fixed_point(location.z),
            yaw: angle_byte(location.yaw),
            pitch: angle_byte(location.pitch),
            metadata: legacy_metadata(settings, name),
        },
        ProtocolDialect::Modern => EntityPacket::SpawnModern {
            entity_id,
            type_id: MODERN_ARMOR_STAND_TYPE_ID,
            uuid: entity_uuid(entity_id),
            x: location.x,
            y: location.y,
            z: location.z,
        },
    }
}

/// Build the destroy packet for one line.
pub fn destroy_packet(dialect: ProtocolDialect, entity_id: EntityId) -> EntityPacket {
    match dialect {
        ProtocolDialect::Legacy => EntityPacket::DestroyLegacy {
            entity_ids: [entity_id],
        },
        ProtocolDialect::Modern => EntityPacket::DestroyModern {
            entity_ids: vec![entity_id],
        },
    }
}

/// Build the metadata/update packet carrying the line's current content.
pub fn metadata_packet(
    dialect: ProtocolDialect,
    entity_id: EntityId,
    settings: &DisplaySettings,
    name: &str,
) -> EntityPacket {
    match dialect {
        ProtocolDialect::Legacy => EntityPacket::MetadataLegacy {
            entity_id,
            metadata: legacy_metadata(settings, name),
        },
        ProtocolDialect::Modern => EntityPacket::MetadataModern {
            entity_id,
            metadata: typed_metadata(settings, name),
        },
    }
}

/// Build the teleport packet for one line at its new absolute location.
///
/// Virtual entities never touch ground, so `on_ground` is fixed false.
pub fn teleport_packet(
    dialect: ProtocolDialect,
    entity_id: EntityId,
    location: &Location,
) -> EntityPacket {
    match dialect {
        ProtocolDialect::Legacy => EntityPacket::TeleportLegacy {
            entity_id,
            x: fixed_point(location.x),
            y: fixed_point(location.y),
            z: fixed_point(location.z),
            yaw: angle_byte(location.yaw),
            pitch: angle_byte(location.pitch),
            on_ground: false,
        },
        ProtocolDialect::Modern => EntityPacket::TeleportModern {
            entity_id,
            x: location.x,
            y: location.y,
            z: location.z,
            yaw: angle_byte(location.yaw),
            pitch: angle_byte(location.pitch),
            on_ground: false,
        },
    }
}
