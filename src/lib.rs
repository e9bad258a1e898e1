pub mod builder;
pub mod hologram;
pub mod host;
pub mod interact;
pub mod line;
pub mod metadata;
pub mod protocol;
pub mod registry;
pub mod testkit;

pub use builder::{BuildError, HologramBuilder, LINE_HEIGHT};
pub use hologram::{Hologram, VIEW_DISTANCE_RANGE_FACTOR};
pub use host::{GameHost, Location, ObserverId, SendError, WorldId};
pub use interact::{
    InteractAction, InteractContext, InteractHandler, UseAction, UseEntityPacket,
};
pub use line::{ContentResolver, HologramLine, LineContent};
pub use metadata::DisplaySettings;
pub use protocol::{EntityId, EntityPacket, ProtocolDialect};
pub use registry::{
    EntityIdAllocator, HologramId, HologramRegistry, DEFAULT_TICK_DELAY, DEFAULT_TICK_PERIOD,
};
