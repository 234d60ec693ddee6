//! The session: one client-side view of one (current) remote episode.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use epilink_core::{
    ActorDescription, ActorId, CallbackId, EpisodeId, EpisodeSettings, LabelledPoint, LightId,
    LightState, Location, SpawnRequest, TickError, TickId, TransportError, Vector3D,
    VehicleLightState, WeatherParameters, WorldSnapshot,
};

use crate::gate::SnapshotGate;
use crate::registry::{TickCallback, TickCallbackRegistry};
use crate::transport::Transport;

/// Client-side session state for the connection to one server.
///
/// Holds the transport, the current episode generation, the tick
/// callback registry, and the snapshot gate. The session itself never
/// goes "back" to an older episode: the generation only moves forward,
/// and once [`mark_ended`](Session::mark_ended) is called it stays
/// ended. Handles compare their captured generation against
/// [`current_episode`](Session::current_episode) to detect staleness.
///
/// All methods take `&self`; the session is shared behind an `Arc`
/// between caller threads and the snapshot pump.
pub struct Session {
    transport: Arc<dyn Transport>,
    /// Generation of the episode currently served. Snapshot delivery
    /// moves this forward when the server starts a new episode.
    episode: AtomicU64,
    ended: AtomicBool,
    registry: TickCallbackRegistry,
    gate: SnapshotGate,
}

// Shared between caller threads and the pump thread.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Session>();
};

impl Session {
    /// Connect: fetch the current episode generation and build the
    /// session around `transport`.
    pub fn connect(transport: Arc<dyn Transport>) -> Result<Self, TransportError> {
        let episode = transport.episode_id()?;
        info!(episode = episode.0, "session connected");
        Ok(Self {
            transport,
            episode: AtomicU64::new(episode.0),
            ended: AtomicBool::new(false),
            registry: TickCallbackRegistry::new(),
            gate: SnapshotGate::new(),
        })
    }

    /// Generation of the episode this session currently serves.
    pub fn current_episode(&self) -> EpisodeId {
        EpisodeId(self.episode.load(Ordering::Acquire))
    }

    /// Whether the connection has ended (disconnect or teardown).
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }

    /// Mark the connection ended. Idempotent; there is no way back.
    pub fn mark_ended(&self) {
        if !self.ended.swap(true, Ordering::AcqRel) {
            info!("session ended");
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    // ── Snapshot delivery ────────────────────────────────────────

    /// Deliver one tick's snapshot.
    ///
    /// Called from the thread that drives ticking (normally the
    /// snapshot pump). Detects episode replacement via the snapshot's
    /// episode generation — exactly one delivering thread wins the
    /// compare-exchange, so staleness is discovered consistently — then
    /// dispatches callbacks in registration order on the calling thread
    /// and finally publishes to the gate. Callbacks complete before any
    /// blocked waiter observes the tick.
    pub fn deliver(&self, snapshot: WorldSnapshot) {
        let incoming = snapshot.episode().0;
        let current = self.episode.load(Ordering::Acquire);
        if incoming != current
            && self
                .episode
                .compare_exchange(current, incoming, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            info!(old = current, new = incoming, "episode replaced");
        }

        let snapshot = Arc::new(snapshot);
        self.registry.dispatch(&snapshot);
        self.gate.publish(snapshot);
    }

    /// Block until the next tick's snapshot arrives, driven by someone
    /// else (server autopilot or another client ticking).
    pub fn wait_for_tick(&self, timeout: Duration) -> Result<Arc<WorldSnapshot>, TickError> {
        self.gate.wait_next(timeout)
    }

    /// Drive one tick: ask the server to advance and block until that
    /// step's snapshot is confirmed. Returns the confirmed tick.
    ///
    /// The gate sequence is recorded before the advance request so a
    /// confirmation racing ahead of the wait is still observed.
    pub fn tick(&self, timeout: Duration) -> Result<TickId, TickError> {
        let since = self.gate.sequence();
        self.transport.request_tick().map_err(TickError::Transport)?;
        let snapshot = self.gate.wait_since(since, timeout)?;
        Ok(snapshot.tick())
    }

    /// Register a per-tick callback. See [`TickCallbackRegistry`].
    pub fn register_on_tick(&self, callback: TickCallback) -> CallbackId {
        self.registry.register(callback)
    }

    /// Remove a per-tick callback; a no-op on absent IDs.
    pub fn remove_on_tick(&self, id: CallbackId) {
        self.registry.remove(id);
    }

    /// The latest delivered snapshot, falling back to a fresh fetch
    /// when nothing has been delivered yet.
    pub fn snapshot(&self) -> Result<Arc<WorldSnapshot>, TransportError> {
        if let Some(snapshot) = self.gate.latest() {
            return Ok(snapshot);
        }
        Ok(Arc::new(self.transport.world_snapshot()?))
    }

    // ── Queries and commands (one round trip each) ───────────────

    /// Name of the currently loaded map.
    pub fn map_name(&self) -> Result<String, TransportError> {
        self.transport.map_name()
    }

    /// Blueprint identifiers available for spawning.
    pub fn blueprint_library(&self) -> Result<Vec<String>, TransportError> {
        self.transport.blueprint_library()
    }

    /// Current weather.
    pub fn weather(&self) -> Result<WeatherParameters, TransportError> {
        self.transport.weather()
    }

    /// Replace the weather.
    pub fn set_weather(&self, weather: &WeatherParameters) -> Result<(), TransportError> {
        self.transport.set_weather(weather)
    }

    /// Current episode settings.
    pub fn episode_settings(&self) -> Result<EpisodeSettings, TransportError> {
        self.transport.episode_settings()
    }

    /// Replace the episode settings; returns the tick at which they
    /// take effect.
    pub fn apply_episode_settings(
        &self,
        settings: &EpisodeSettings,
    ) -> Result<TickId, TransportError> {
        self.transport.apply_episode_settings(settings)
    }

    /// Description of one actor; absent if the ID does not exist.
    pub fn actor_by_id(&self, id: ActorId) -> Result<Option<ActorDescription>, TransportError> {
        self.transport.actor_by_id(id)
    }

    /// Descriptions of the requested actors; unknown IDs are omitted.
    pub fn actors_by_id(
        &self,
        ids: &[ActorId],
    ) -> Result<Vec<ActorDescription>, TransportError> {
        self.transport.actors_by_id(ids)
    }

    /// Descriptions of every actor currently alive.
    pub fn all_actors(&self) -> Result<Vec<ActorDescription>, TransportError> {
        self.transport.all_actors()
    }

    /// Spawn an actor; fails if the server rejects the request.
    pub fn spawn_actor(
        &self,
        request: &SpawnRequest,
    ) -> Result<ActorDescription, TransportError> {
        self.transport.spawn_actor(request)
    }

    /// Destroy an actor; returns whether it existed.
    pub fn destroy_actor(&self, id: ActorId) -> Result<bool, TransportError> {
        self.transport.destroy_actor(id)
    }

    /// Raycast from a point along a direction.
    pub fn project_point(
        &self,
        location: Location,
        direction: Vector3D,
        search_distance: f32,
    ) -> Result<(bool, LabelledPoint), TransportError> {
        self.transport.project_point(location, direction, search_distance)
    }

    /// Every intersection along a segment.
    pub fn cast_ray(
        &self,
        start: Location,
        end: Location,
    ) -> Result<Vec<LabelledPoint>, TransportError> {
        self.transport.cast_ray(start, end)
    }

    /// Reset every traffic light to its initial state.
    pub fn reset_all_traffic_lights(&self) -> Result<(), TransportError> {
        self.transport.reset_all_traffic_lights()
    }

    /// Freeze or unfreeze every traffic light.
    pub fn freeze_all_traffic_lights(&self, frozen: bool) -> Result<(), TransportError> {
        self.transport.freeze_all_traffic_lights(frozen)
    }

    /// Percentage of pedestrians allowed to cross roads.
    pub fn set_pedestrians_cross_factor(&self, percentage: f32) -> Result<(), TransportError> {
        self.transport.set_pedestrians_cross_factor(percentage)
    }

    /// The spectator actor.
    pub fn spectator(&self) -> Result<ActorDescription, TransportError> {
        self.transport.spectator()
    }

    /// A random navigable location, if the map has a navigation mesh.
    pub fn random_location_from_navigation(
        &self,
    ) -> Result<Option<Location>, TransportError> {
        self.transport.random_location_from_navigation()
    }

    /// Light flags of every vehicle currently alive.
    pub fn vehicle_light_states(
        &self,
    ) -> Result<Vec<(ActorId, VehicleLightState)>, TransportError> {
        self.transport.vehicle_light_states()
    }

    /// Every street light with its state.
    pub fn lights(&self) -> Result<Vec<(LightId, LightState)>, TransportError> {
        self.transport.lights()
    }

    /// Update one street light.
    pub fn set_light_state(
        &self,
        id: LightId,
        state: LightState,
    ) -> Result<(), TransportError> {
        self.transport.set_light_state(id, state)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("episode", &self.current_episode())
            .field("ended", &self.is_ended())
            .field("callbacks", &self.registry.len())
            .finish()
    }
}
