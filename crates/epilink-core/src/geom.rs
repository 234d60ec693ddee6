//! Geometry value types shared across the client.
//!
//! All of these are plain value types copied across the transport
//! boundary; none of them reference live server state.

use std::fmt;

/// A free direction or displacement vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3D {
    /// X component (forward).
    pub x: f32,
    /// Y component (right).
    pub y: f32,
    /// Z component (up).
    pub z: f32,
}

impl Vector3D {
    /// Straight down, as used by ground projection.
    pub const DOWN: Vector3D = Vector3D {
        x: 0.0,
        y: 0.0,
        z: -1.0,
    };

    /// Construct a vector from components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    /// X coordinate in meters.
    pub x: f32,
    /// Y coordinate in meters.
    pub y: f32,
    /// Z coordinate in meters.
    pub z: f32,
}

impl Location {
    /// Construct a location from coordinates.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another location.
    pub fn distance(&self, other: &Location) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An orientation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    /// Rotation around the Y axis.
    pub pitch: f32,
    /// Rotation around the Z axis.
    pub yaw: f32,
    /// Rotation around the X axis.
    pub roll: f32,
}

/// A location plus an orientation.
///
/// `Transform::default()` is the identity transform at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Position in world space.
    pub location: Location,
    /// Orientation in degrees.
    pub rotation: Rotation,
}

impl Transform {
    /// A transform at `location` with identity rotation.
    pub const fn at(location: Location) -> Self {
        Self {
            location,
            rotation: Rotation {
                pitch: 0.0,
                yaw: 0.0,
                roll: 0.0,
            },
        }
    }
}

/// Semantic label attached to a geometry query hit.
///
/// The numeric values come from the server's semantic segmentation
/// catalog; the client treats them as opaque beyond the named consts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SemanticLabel(pub u8);

impl SemanticLabel {
    /// Unlabelled geometry.
    pub const NONE: SemanticLabel = SemanticLabel(0);
    /// Road surface.
    pub const ROADS: SemanticLabel = SemanticLabel(1);
    /// Sidewalk surface.
    pub const SIDEWALKS: SemanticLabel = SemanticLabel(2);
    /// Uncategorized ground.
    pub const GROUND: SemanticLabel = SemanticLabel(14);
}

impl fmt::Display for SemanticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geometry query hit: where, and what kind of surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelledPoint {
    /// The hit location.
    pub location: Location,
    /// Semantic label of the hit surface.
    pub label: SemanticLabel,
}
