//! Scriptable in-process transport.

use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use indexmap::IndexMap;

use epilink_core::{
    ActorDescription, ActorId, ActorState, EpisodeId, EpisodeSettings, LabelledPoint, LightId,
    LightState, Location, SpawnRequest, TickId, Timestamp, Transform, TransportError, Vector3D,
    VehicleLightState, WeatherParameters, WorldSnapshot,
};
use epilink_session::Transport;

/// Fixed delta used when settings leave the step variable.
const DEFAULT_DELTA: f64 = 0.05;

struct FakeState {
    episode: EpisodeId,
    tick: TickId,
    connected: bool,
    actors: IndexMap<ActorId, ActorDescription>,
    next_actor_id: u64,
    weather: WeatherParameters,
    settings: EpisodeSettings,
    spawn_rejection: Option<String>,
    projection_hit: Option<LabelledPoint>,
    ray_hits: Vec<LabelledPoint>,
    nav_location: Option<Location>,
    lights: IndexMap<LightId, LightState>,
    vehicle_lights: IndexMap<ActorId, VehicleLightState>,
    spectator: ActorDescription,
    cross_factor: Option<f32>,
    lights_frozen: Option<bool>,
    traffic_light_resets: u32,
    /// Dropped to disconnect the snapshot stream.
    snapshot_tx: Option<Sender<WorldSnapshot>>,
}

/// In-process stand-in for the simulation server.
///
/// Request/response methods answer from scripted state; the snapshot
/// stream is an in-memory channel fed by [`emit_snapshot`],
/// [`request_tick`](Transport::request_tick), and
/// [`begin_new_episode`].
///
/// [`emit_snapshot`]: FakeTransport::emit_snapshot
/// [`begin_new_episode`]: FakeTransport::begin_new_episode
pub struct FakeTransport {
    state: Mutex<FakeState>,
    snapshot_rx: Receiver<WorldSnapshot>,
}

impl FakeTransport {
    pub fn new() -> Self {
        let (snapshot_tx, snapshot_rx) = crossbeam_channel::unbounded();
        let spectator = ActorDescription {
            id: ActorId(0),
            type_id: "spectator".into(),
            transform: Transform::default(),
            parent: None,
            sign_id: None,
        };
        Self {
            state: Mutex::new(FakeState {
                episode: EpisodeId(1),
                tick: TickId(0),
                connected: true,
                actors: IndexMap::new(),
                next_actor_id: 100,
                weather: WeatherParameters::default(),
                settings: EpisodeSettings::default(),
                spawn_rejection: None,
                projection_hit: None,
                ray_hits: Vec::new(),
                nav_location: None,
                lights: IndexMap::new(),
                vehicle_lights: IndexMap::new(),
                spectator,
                cross_factor: None,
                lights_frozen: None,
                traffic_light_resets: 0,
                snapshot_tx: Some(snapshot_tx),
            }),
            snapshot_rx,
        }
    }

    // ── Scripting API (test-facing) ──────────────────────────────

    /// Add a plain actor; returns its ID.
    pub fn add_actor(&self, type_id: &str, transform: Transform) -> ActorId {
        let mut state = self.state.lock().unwrap();
        Self::insert_actor(&mut state, type_id, transform, None)
    }

    /// Add a traffic actor carrying a sign/light identifier.
    pub fn add_traffic_actor(&self, type_id: &str, sign_id: &str) -> ActorId {
        let mut state = self.state.lock().unwrap();
        Self::insert_actor(&mut state, type_id, Transform::default(), Some(sign_id.into()))
    }

    /// Remove an actor, as if destroyed server-side.
    pub fn remove_actor(&self, id: ActorId) {
        self.state.lock().unwrap().actors.shift_remove(&id);
    }

    /// Start a new episode: fresh generation, tick 0, empty actor set.
    /// Emits a snapshot of the new episode so delivery notices.
    pub fn begin_new_episode(&self) -> EpisodeId {
        let mut state = self.state.lock().unwrap();
        state.episode = EpisodeId(state.episode.0 + 1);
        state.tick = TickId(0);
        state.actors.clear();
        let episode = state.episode;
        Self::emit_locked(&mut state);
        episode
    }

    /// Build a snapshot of the current state and push it to the stream.
    pub fn emit_snapshot(&self) {
        let mut state = self.state.lock().unwrap();
        state.tick = TickId(state.tick.0 + 1);
        Self::emit_locked(&mut state);
    }

    /// Make every subsequent spawn fail with `reason`.
    pub fn reject_spawns(&self, reason: &str) {
        self.state.lock().unwrap().spawn_rejection = Some(reason.into());
    }

    /// Let spawns succeed again.
    pub fn allow_spawns(&self) {
        self.state.lock().unwrap().spawn_rejection = None;
    }

    /// Script the result of point projection; `None` means no hit.
    pub fn set_projection_hit(&self, hit: Option<LabelledPoint>) {
        self.state.lock().unwrap().projection_hit = hit;
    }

    /// Script the intersections returned by ray casting.
    pub fn set_ray_hits(&self, hits: Vec<LabelledPoint>) {
        self.state.lock().unwrap().ray_hits = hits;
    }

    /// Script the navigation-mesh sample.
    pub fn set_nav_location(&self, location: Option<Location>) {
        self.state.lock().unwrap().nav_location = location;
    }

    /// Add a street light.
    pub fn add_light(&self, id: LightId, state: LightState) {
        self.state.lock().unwrap().lights.insert(id, state);
    }

    /// Script the light flags of one vehicle.
    pub fn set_vehicle_lights(&self, id: ActorId, lights: VehicleLightState) {
        self.state.lock().unwrap().vehicle_lights.insert(id, lights);
    }

    /// Sever the connection: every subsequent call fails and the
    /// snapshot stream reports disconnection to a blocked poller.
    pub fn disconnect_now(&self) {
        let mut state = self.state.lock().unwrap();
        state.connected = false;
        state.snapshot_tx = None;
    }

    // ── Assertion helpers ────────────────────────────────────────

    pub fn traffic_light_resets(&self) -> u32 {
        self.state.lock().unwrap().traffic_light_resets
    }

    pub fn lights_frozen(&self) -> Option<bool> {
        self.state.lock().unwrap().lights_frozen
    }

    pub fn pedestrians_cross_factor(&self) -> Option<f32> {
        self.state.lock().unwrap().cross_factor
    }

    pub fn current_tick(&self) -> TickId {
        self.state.lock().unwrap().tick
    }

    // ── Internals ────────────────────────────────────────────────

    fn insert_actor(
        state: &mut FakeState,
        type_id: &str,
        transform: Transform,
        sign_id: Option<String>,
    ) -> ActorId {
        let id = ActorId(state.next_actor_id);
        state.next_actor_id += 1;
        state.actors.insert(
            id,
            ActorDescription {
                id,
                type_id: type_id.into(),
                transform,
                parent: None,
                sign_id,
            },
        );
        id
    }

    fn build_snapshot(state: &FakeState) -> WorldSnapshot {
        let delta = state.settings.fixed_delta_seconds.unwrap_or(DEFAULT_DELTA);
        let timestamp = Timestamp {
            elapsed_seconds: state.tick.0 as f64 * delta,
            delta_seconds: delta,
            platform_timestamp: 0.0,
        };
        let states = state
            .actors
            .values()
            .map(|desc| ActorState::at_rest(desc.id, desc.transform))
            .collect();
        WorldSnapshot::new(state.episode, state.tick, timestamp, states)
    }

    fn emit_locked(state: &mut FakeState) {
        let snapshot = Self::build_snapshot(state);
        if let Some(tx) = &state.snapshot_tx {
            let _ = tx.send(snapshot);
        }
    }

    fn check_connected(state: &FakeState) -> Result<(), TransportError> {
        if state.connected {
            Ok(())
        } else {
            Err(TransportError::Disconnected)
        }
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for FakeTransport {
    fn episode_id(&self) -> Result<EpisodeId, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.episode)
    }

    fn map_name(&self) -> Result<String, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok("Town01".into())
    }

    fn blueprint_library(&self) -> Result<Vec<String>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(vec![
            "vehicle.sedan".into(),
            "walker.pedestrian".into(),
            "sensor.camera".into(),
        ])
    }

    fn weather(&self) -> Result<WeatherParameters, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.weather)
    }

    fn set_weather(&self, weather: &WeatherParameters) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.weather = *weather;
        Ok(())
    }

    fn episode_settings(&self) -> Result<EpisodeSettings, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.settings)
    }

    fn apply_episode_settings(
        &self,
        settings: &EpisodeSettings,
    ) -> Result<TickId, TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.settings = *settings;
        Ok(TickId(state.tick.0 + 1))
    }

    fn world_snapshot(&self) -> Result<WorldSnapshot, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(Self::build_snapshot(&state))
    }

    fn actor_by_id(&self, id: ActorId) -> Result<Option<ActorDescription>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.actors.get(&id).cloned())
    }

    fn actors_by_id(&self, ids: &[ActorId]) -> Result<Vec<ActorDescription>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        // Unknown IDs are omitted, not errors.
        Ok(ids
            .iter()
            .filter_map(|id| state.actors.get(id).cloned())
            .collect())
    }

    fn all_actors(&self) -> Result<Vec<ActorDescription>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.actors.values().cloned().collect())
    }

    fn spawn_actor(&self, request: &SpawnRequest) -> Result<ActorDescription, TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        if let Some(reason) = &state.spawn_rejection {
            return Err(TransportError::Rejected {
                reason: reason.clone(),
            });
        }
        if let Some(parent) = request.parent {
            if !state.actors.contains_key(&parent) {
                return Err(TransportError::Rejected {
                    reason: format!("parent actor {parent} does not exist"),
                });
            }
        }
        let id = ActorId(state.next_actor_id);
        state.next_actor_id += 1;
        let description = ActorDescription {
            id,
            type_id: request.blueprint.clone(),
            transform: request.transform,
            parent: request.parent,
            sign_id: None,
        };
        state.actors.insert(id, description.clone());
        Ok(description)
    }

    fn destroy_actor(&self, id: ActorId) -> Result<bool, TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.actors.shift_remove(&id).is_some())
    }

    fn request_tick(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.tick = TickId(state.tick.0 + 1);
        Self::emit_locked(&mut state);
        Ok(())
    }

    fn poll_snapshot(
        &self,
        timeout: Duration,
    ) -> Result<Option<WorldSnapshot>, TransportError> {
        match self.snapshot_rx.recv_timeout(timeout) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Disconnected),
        }
    }

    fn project_point(
        &self,
        _location: Location,
        _direction: Vector3D,
        _search_distance: f32,
    ) -> Result<(bool, LabelledPoint), TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        match state.projection_hit {
            Some(point) => Ok((true, point)),
            None => Ok((false, LabelledPoint::default())),
        }
    }

    fn cast_ray(
        &self,
        _start: Location,
        _end: Location,
    ) -> Result<Vec<LabelledPoint>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.ray_hits.clone())
    }

    fn reset_all_traffic_lights(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.traffic_light_resets += 1;
        Ok(())
    }

    fn freeze_all_traffic_lights(&self, frozen: bool) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.lights_frozen = Some(frozen);
        Ok(())
    }

    fn set_pedestrians_cross_factor(&self, percentage: f32) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        state.cross_factor = Some(percentage);
        Ok(())
    }

    fn spectator(&self) -> Result<ActorDescription, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.spectator.clone())
    }

    fn random_location_from_navigation(&self) -> Result<Option<Location>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.nav_location)
    }

    fn vehicle_light_states(
        &self,
    ) -> Result<Vec<(ActorId, VehicleLightState)>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.vehicle_lights.iter().map(|(id, s)| (*id, *s)).collect())
    }

    fn lights(&self) -> Result<Vec<(LightId, LightState)>, TransportError> {
        let state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        Ok(state.lights.iter().map(|(id, s)| (*id, *s)).collect())
    }

    fn set_light_state(&self, id: LightId, light: LightState) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        Self::check_connected(&state)?;
        if !state.lights.contains_key(&id) {
            return Err(TransportError::Rejected {
                reason: format!("unknown light {id}"),
            });
        }
        state.lights.insert(id, light);
        Ok(())
    }
}
