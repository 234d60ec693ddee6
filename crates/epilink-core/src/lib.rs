//! Core types and errors for the Epilink simulation client.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Epilink workspace:
//! strongly-typed IDs, geometry and value types, world snapshots, actor
//! descriptions, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod error;
pub mod geom;
pub mod id;
pub mod light;
pub mod params;
pub mod pattern;
pub mod snapshot;

pub use actor::{ActorDescription, AttachmentType, Landmark, SpawnRequest};
pub use error::{
    IndexOutOfRange, SpawnError, StaleEpisode, TickError, TransportError, WorldError,
};
pub use geom::{LabelledPoint, Location, Rotation, SemanticLabel, Transform, Vector3D};
pub use id::{ActorId, CallbackId, EpisodeId, TickId};
pub use light::{LightId, LightState, VehicleLightState};
pub use params::{EpisodeSettings, WeatherParameters};
pub use pattern::wildcard_match;
pub use snapshot::{ActorState, Timestamp, WorldSnapshot};
