//! Actor descriptions, spawn requests, and landmarks.

use std::fmt;

use crate::geom::Transform;
use crate::id::ActorId;

/// Immutable identity and static metadata of a server-side actor.
///
/// Returned by bulk and single actor queries. The client only ever
/// holds copies; transient state (current transform, velocity) lives in
/// per-tick snapshots instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorDescription {
    /// Server-assigned actor ID.
    pub id: ActorId,
    /// Blueprint-derived type identifier, e.g. `vehicle.sedan` or
    /// `traffic_light.generic`.
    pub type_id: String,
    /// Transform at spawn time.
    pub transform: Transform,
    /// Parent actor, if this actor was spawned attached.
    pub parent: Option<ActorId>,
    /// Sign/light identifier for traffic actors, used by landmark
    /// correlation. Absent for every other actor category.
    pub sign_id: Option<String>,
}

/// How a child actor is attached to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachmentType {
    /// Fixed relative transform.
    #[default]
    Rigid,
    /// Eased relative motion, for cameras.
    SpringArm,
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rigid => write!(f, "rigid"),
            Self::SpringArm => write!(f, "spring-arm"),
        }
    }
}

/// A spawn command as handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Blueprint identifier to instantiate.
    pub blueprint: String,
    /// Where to spawn.
    pub transform: Transform,
    /// Optional parent to attach to.
    pub parent: Option<ActorId>,
    /// Attachment mode, meaningful only with a parent.
    pub attachment: AttachmentType,
}

/// A map-derived identifier correlated to a traffic actor.
///
/// Landmarks come from the map definition, not from the live actor set;
/// the only thing linking the two is the identifier string, which is
/// why landmark lookups are a linear correlation over all actors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Landmark {
    /// Opaque identifier, matched against traffic actors' sign IDs.
    pub id: String,
    /// Human-readable name from the map definition.
    pub name: String,
}

impl Landmark {
    /// A landmark with identifier `id` and an empty name.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }
}
