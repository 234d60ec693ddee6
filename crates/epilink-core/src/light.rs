//! Street-light identifiers and state.

use std::fmt;

/// Identifies one street light within the current map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable state of one street light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    /// Whether the light is emitting.
    pub on: bool,
    /// Emission intensity in lumens.
    pub intensity: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: true,
            intensity: 1000.0,
        }
    }
}

/// Light flags of one vehicle, as a bitmask.
///
/// The flag values come from the server's vehicle catalog; combine them
/// with `|` and test with [`contains`](VehicleLightState::contains).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VehicleLightState(pub u32);

impl VehicleLightState {
    /// All lights off.
    pub const NONE: VehicleLightState = VehicleLightState(0);
    /// Position lights.
    pub const POSITION: VehicleLightState = VehicleLightState(1);
    /// Low beam headlights.
    pub const LOW_BEAM: VehicleLightState = VehicleLightState(1 << 1);
    /// High beam headlights.
    pub const HIGH_BEAM: VehicleLightState = VehicleLightState(1 << 2);
    /// Brake lights.
    pub const BRAKE: VehicleLightState = VehicleLightState(1 << 3);
    /// Right turn indicator.
    pub const RIGHT_BLINKER: VehicleLightState = VehicleLightState(1 << 4);
    /// Left turn indicator.
    pub const LEFT_BLINKER: VehicleLightState = VehicleLightState(1 << 5);
    /// Reverse lights.
    pub const REVERSE: VehicleLightState = VehicleLightState(1 << 6);
    /// Fog lights.
    pub const FOG: VehicleLightState = VehicleLightState(1 << 7);
    /// Interior cabin light.
    pub const INTERIOR: VehicleLightState = VehicleLightState(1 << 8);

    /// Whether every flag in `other` is set in `self`.
    pub const fn contains(self, other: VehicleLightState) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for VehicleLightState {
    type Output = VehicleLightState;

    fn bitor(self, rhs: VehicleLightState) -> VehicleLightState {
        VehicleLightState(self.0 | rhs.0)
    }
}
