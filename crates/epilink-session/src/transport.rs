//! The opaque transport capability consumed by the session.

use std::time::Duration;

use epilink_core::{
    ActorDescription, ActorId, EpisodeId, EpisodeSettings, LabelledPoint, LightId, LightState,
    Location, SpawnRequest, TickId, TransportError, Vector3D, VehicleLightState,
    WeatherParameters, WorldSnapshot,
};

/// Synchronous access to the simulation server.
///
/// Implementations already perform the network round trip and return
/// materialized values; the wire format is entirely theirs. Every
/// method may block on I/O. Implementations must be safe to call from
/// any number of threads concurrently and idempotent on reads.
///
/// Two delivery paths exist: request/response methods below, and the
/// snapshot stream consumed through [`poll_snapshot`], which the
/// [`SnapshotPump`](crate::SnapshotPump) drains on a dedicated thread.
pub trait Transport: Send + Sync {
    /// The episode currently running on the server.
    fn episode_id(&self) -> Result<EpisodeId, TransportError>;

    /// Name of the currently loaded map.
    fn map_name(&self) -> Result<String, TransportError>;

    /// Blueprint identifiers available for spawning.
    fn blueprint_library(&self) -> Result<Vec<String>, TransportError>;

    /// Current weather.
    fn weather(&self) -> Result<WeatherParameters, TransportError>;

    /// Replace the weather.
    fn set_weather(&self, weather: &WeatherParameters) -> Result<(), TransportError>;

    /// Current episode settings.
    fn episode_settings(&self) -> Result<EpisodeSettings, TransportError>;

    /// Replace the episode settings. Returns the tick at which the new
    /// settings take effect.
    fn apply_episode_settings(
        &self,
        settings: &EpisodeSettings,
    ) -> Result<TickId, TransportError>;

    /// Fetch the current world snapshot in one round trip.
    fn world_snapshot(&self) -> Result<WorldSnapshot, TransportError>;

    /// Description of one actor; absent if the ID does not exist.
    fn actor_by_id(&self, id: ActorId) -> Result<Option<ActorDescription>, TransportError>;

    /// Descriptions of the requested actors. IDs unknown to the server
    /// are omitted from the result, not errors.
    fn actors_by_id(&self, ids: &[ActorId]) -> Result<Vec<ActorDescription>, TransportError>;

    /// Descriptions of every actor currently alive in the episode.
    fn all_actors(&self) -> Result<Vec<ActorDescription>, TransportError>;

    /// Spawn an actor. Fails with [`TransportError::Rejected`] when the
    /// server refuses (collision, invalid blueprint, invalid parent).
    fn spawn_actor(&self, request: &SpawnRequest) -> Result<ActorDescription, TransportError>;

    /// Destroy an actor. Returns whether the actor existed.
    fn destroy_actor(&self, id: ActorId) -> Result<bool, TransportError>;

    /// Ask the server to advance the simulation one step. Confirmation
    /// arrives through the snapshot stream, not this call.
    fn request_tick(&self) -> Result<(), TransportError>;

    /// Block up to `timeout` for the next snapshot from the stream.
    /// `Ok(None)` means the timeout elapsed without one.
    fn poll_snapshot(&self, timeout: Duration)
        -> Result<Option<WorldSnapshot>, TransportError>;

    /// Cast from `location` along `direction` up to `search_distance`
    /// meters. Returns whether anything was hit, and the hit point
    /// (meaningless when the flag is false).
    fn project_point(
        &self,
        location: Location,
        direction: Vector3D,
        search_distance: f32,
    ) -> Result<(bool, LabelledPoint), TransportError>;

    /// Every intersection along the segment, in server-determined
    /// order. Empty is a valid no-hits result.
    fn cast_ray(
        &self,
        start: Location,
        end: Location,
    ) -> Result<Vec<LabelledPoint>, TransportError>;

    /// Reset every traffic light in the episode to its initial state.
    fn reset_all_traffic_lights(&self) -> Result<(), TransportError>;

    /// Freeze or unfreeze every traffic light.
    fn freeze_all_traffic_lights(&self, frozen: bool) -> Result<(), TransportError>;

    /// Percentage of pedestrians allowed to cross roads.
    fn set_pedestrians_cross_factor(&self, percentage: f32) -> Result<(), TransportError>;

    /// The spectator actor (the server-side free camera).
    fn spectator(&self) -> Result<ActorDescription, TransportError>;

    /// A random navigable location, absent if the map has no
    /// navigation mesh.
    fn random_location_from_navigation(&self)
        -> Result<Option<Location>, TransportError>;

    /// Light flags of every vehicle currently alive, in server order.
    fn vehicle_light_states(
        &self,
    ) -> Result<Vec<(ActorId, VehicleLightState)>, TransportError>;

    /// Every street light in the current map with its state.
    fn lights(&self) -> Result<Vec<(LightId, LightState)>, TransportError>;

    /// Update one street light.
    fn set_light_state(&self, id: LightId, state: LightState) -> Result<(), TransportError>;
}
