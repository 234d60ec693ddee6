//! The world facade: every caller-facing operation on an episode.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use epilink_core::{
    wildcard_match, ActorDescription, ActorId, AttachmentType, CallbackId, EpisodeId,
    EpisodeSettings, LabelledPoint, Landmark, Location, SpawnError, SpawnRequest, TickId,
    Transform, Vector3D, VehicleLightState, WeatherParameters, WorldError, WorldSnapshot,
};

use crate::actor::Actor;
use crate::handle::EpisodeHandle;
use crate::lights::LightManager;
use crate::view::ActorView;

/// Blueprint pattern that covers both traffic signs and traffic lights.
const TRAFFIC_PATTERN: &str = "*traffic.*";
/// Blueprint pattern that covers traffic lights only.
const TRAFFIC_LIGHT_PATTERN: &str = "*traffic_light*";

/// The facade over one remote episode.
///
/// Every operation locks the underlying [`EpisodeHandle`] exactly once,
/// runs against that one session reference, and releases it on return.
/// Once the episode ends or is superseded every operation fails with
/// [`WorldError::StaleEpisode`]; obtain a fresh world from the client.
///
/// Cloning is cheap; clones share the handle, so staleness observed
/// through one clone is visible through all.
#[derive(Clone, Debug)]
pub struct World {
    handle: EpisodeHandle,
}

impl World {
    pub(crate) fn new(handle: EpisodeHandle) -> Self {
        Self { handle }
    }

    /// The episode generation this world is bound to.
    pub fn episode(&self) -> EpisodeId {
        self.handle.episode()
    }

    /// The handle backing this world.
    pub fn handle(&self) -> &EpisodeHandle {
        &self.handle
    }

    // ── Episode-level queries and commands ───────────────────────

    /// Name of the currently loaded map.
    pub fn map_name(&self) -> Result<String, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.map_name()?)
    }

    /// Blueprint identifiers available for spawning.
    pub fn blueprint_library(&self) -> Result<Vec<String>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.blueprint_library()?)
    }

    /// Current weather.
    pub fn weather(&self) -> Result<WeatherParameters, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.weather()?)
    }

    /// Replace the weather.
    pub fn set_weather(&self, weather: &WeatherParameters) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        Ok(session.set_weather(weather)?)
    }

    /// Current episode settings.
    pub fn settings(&self) -> Result<EpisodeSettings, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.episode_settings()?)
    }

    /// Replace the episode settings; returns the tick at which they
    /// take effect.
    pub fn apply_settings(&self, settings: &EpisodeSettings) -> Result<TickId, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.apply_episode_settings(settings)?)
    }

    /// The latest snapshot, fetching one if none has been delivered.
    pub fn snapshot(&self) -> Result<Arc<WorldSnapshot>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.snapshot()?)
    }

    // ── Actors ───────────────────────────────────────────────────

    /// A view over every actor currently alive.
    pub fn actors(&self) -> Result<ActorView, WorldError> {
        let session = self.handle.lock()?;
        let descriptions = session.all_actors()?;
        Ok(ActorView::new(self.handle.clone(), descriptions))
    }

    /// A view over the requested actors; unknown IDs are omitted.
    pub fn actors_by_id(&self, ids: &[ActorId]) -> Result<ActorView, WorldError> {
        let session = self.handle.lock()?;
        let descriptions = session.actors_by_id(ids)?;
        Ok(ActorView::new(self.handle.clone(), descriptions))
    }

    /// The actor with `id`, absent if it does not exist.
    pub fn actor(&self, id: ActorId) -> Result<Option<Actor>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session
            .actor_by_id(id)?
            .map(|description| self.wrap(description)))
    }

    /// The spectator actor, always present.
    pub fn spectator(&self) -> Result<Actor, WorldError> {
        let session = self.handle.lock()?;
        let description = session.spectator()?;
        Ok(self.wrap(description))
    }

    /// Spawn an actor from `blueprint` at `transform`, optionally
    /// attached to `parent`.
    pub fn spawn_actor(
        &self,
        blueprint: &str,
        transform: Transform,
        parent: Option<&Actor>,
        attachment: AttachmentType,
    ) -> Result<Actor, WorldError> {
        let session = self.handle.lock()?;
        let request = SpawnRequest {
            blueprint: blueprint.to_owned(),
            transform,
            parent: parent.map(Actor::id),
            attachment,
        };
        let description = session.spawn_actor(&request).map_err(|cause| SpawnError {
            blueprint: blueprint.to_owned(),
            cause,
        })?;
        Ok(self.wrap(description))
    }

    /// Like [`spawn_actor`](World::spawn_actor), but turns every
    /// failure — rejection, transport loss, staleness — into `None`.
    pub fn try_spawn_actor(
        &self,
        blueprint: &str,
        transform: Transform,
        parent: Option<&Actor>,
        attachment: AttachmentType,
    ) -> Option<Actor> {
        match self.spawn_actor(blueprint, transform, parent, attachment) {
            Ok(actor) => Some(actor),
            Err(error) => {
                debug!(blueprint, %error, "spawn attempt failed");
                None
            }
        }
    }

    // ── Landmark correlation ─────────────────────────────────────

    /// The traffic sign actor governing `landmark`, if one is spawned.
    ///
    /// Matches any `traffic.*` actor (signs and lights both carry sign
    /// IDs) against the landmark's OpenDRIVE sign ID.
    pub fn traffic_sign(&self, landmark: &Landmark) -> Result<Option<Actor>, WorldError> {
        self.find_traffic_actor(TRAFFIC_PATTERN, &landmark.id)
    }

    /// The traffic light actor governing `landmark`, if one is spawned.
    pub fn traffic_light(&self, landmark: &Landmark) -> Result<Option<Actor>, WorldError> {
        self.find_traffic_actor(TRAFFIC_LIGHT_PATTERN, &landmark.id)
    }

    fn find_traffic_actor(
        &self,
        pattern: &str,
        sign_id: &str,
    ) -> Result<Option<Actor>, WorldError> {
        let session = self.handle.lock()?;
        // Fresh listing per call; landmark lookups must not answer from
        // an older view.
        let found = session
            .all_actors()?
            .into_iter()
            .find(|desc| {
                wildcard_match(pattern, &desc.type_id)
                    && desc.sign_id.as_deref() == Some(sign_id)
            });
        Ok(found.map(|description| self.wrap(description)))
    }

    // ── Geometry queries ─────────────────────────────────────────

    /// Project `location` along `direction`, up to `search_distance`
    /// meters. `None` when nothing is hit.
    pub fn project_point(
        &self,
        location: Location,
        direction: Vector3D,
        search_distance: f32,
    ) -> Result<Option<LabelledPoint>, WorldError> {
        let session = self.handle.lock()?;
        let (hit, point) = session.project_point(location, direction, search_distance)?;
        Ok(hit.then_some(point))
    }

    /// Project `location` straight down onto the ground.
    pub fn ground_projection(
        &self,
        location: Location,
        search_distance: f32,
    ) -> Result<Option<LabelledPoint>, WorldError> {
        self.project_point(location, Vector3D::DOWN, search_distance)
    }

    /// Every intersection along the segment from `start` to `end`.
    pub fn cast_ray(
        &self,
        start: Location,
        end: Location,
    ) -> Result<Vec<LabelledPoint>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.cast_ray(start, end)?)
    }

    /// A random navigable location, if the map has a navigation mesh.
    pub fn random_location_from_navigation(&self) -> Result<Option<Location>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.random_location_from_navigation()?)
    }

    // ── Tick synchronization ─────────────────────────────────────

    /// Drive one tick and block until its snapshot is confirmed.
    /// Returns the confirmed tick.
    pub fn tick(&self, timeout: Duration) -> Result<TickId, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.tick(timeout)?)
    }

    /// Block until the next tick's snapshot arrives, driven by someone
    /// else.
    pub fn wait_for_tick(&self, timeout: Duration) -> Result<Arc<WorldSnapshot>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.wait_for_tick(timeout)?)
    }

    /// Register `callback` to run on every tick, in registration order
    /// relative to other callbacks. Returns its removal ID.
    pub fn on_tick<F>(&self, callback: F) -> Result<CallbackId, WorldError>
    where
        F: Fn(&WorldSnapshot) + Send + Sync + 'static,
    {
        let session = self.handle.lock()?;
        Ok(session.register_on_tick(Arc::new(callback)))
    }

    /// Remove a tick callback; a no-op on absent IDs.
    pub fn remove_on_tick(&self, id: CallbackId) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        session.remove_on_tick(id);
        Ok(())
    }

    // ── Traffic and pedestrian control ───────────────────────────

    /// Reset every traffic light to its initial state.
    pub fn reset_all_traffic_lights(&self) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        Ok(session.reset_all_traffic_lights()?)
    }

    /// Freeze or unfreeze every traffic light.
    pub fn freeze_all_traffic_lights(&self, frozen: bool) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        Ok(session.freeze_all_traffic_lights(frozen)?)
    }

    /// Percentage of pedestrians allowed to cross roads.
    pub fn set_pedestrians_cross_factor(&self, percentage: f32) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        Ok(session.set_pedestrians_cross_factor(percentage)?)
    }

    /// Light flags of every vehicle currently alive, in server order.
    pub fn vehicle_light_states(
        &self,
    ) -> Result<Vec<(ActorId, VehicleLightState)>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.vehicle_light_states()?)
    }

    /// Street-light control bound to this world's episode.
    pub fn light_manager(&self) -> LightManager {
        LightManager::new(self.handle.clone())
    }

    fn wrap(&self, description: ActorDescription) -> Actor {
        Actor::new(Arc::new(description), self.handle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilink_core::SemanticLabel;
    use epilink_session::{Session, Transport};
    use epilink_test_utils::FakeTransport;

    fn world() -> (Arc<FakeTransport>, Arc<Session>, World) {
        let transport = Arc::new(FakeTransport::new());
        let session = Arc::new(
            Session::connect(Arc::clone(&transport) as Arc<dyn Transport>).unwrap(),
        );
        let world = World::new(EpisodeHandle::new(&session));
        (transport, session, world)
    }

    #[test]
    fn episode_queries_round_trip() {
        let (_transport, _session, world) = world();
        assert_eq!(world.map_name().unwrap(), "Town01");
        assert!(world
            .blueprint_library()
            .unwrap()
            .contains(&"vehicle.sedan".to_string()));

        world
            .set_weather(&WeatherParameters::HARD_RAIN_NOON)
            .unwrap();
        assert_eq!(world.weather().unwrap(), WeatherParameters::HARD_RAIN_NOON);

        let settings = EpisodeSettings::synchronous(0.05);
        let effective = world.apply_settings(&settings).unwrap();
        assert!(effective.0 > 0);
        assert_eq!(world.settings().unwrap(), settings);
    }

    #[test]
    fn spawn_yields_a_live_proxy() {
        let (_transport, _session, world) = world();
        let actor = world
            .spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .unwrap();
        assert_eq!(actor.type_id(), "vehicle.sedan");
        assert!(world.actor(actor.id()).unwrap().is_some());
    }

    #[test]
    fn spawn_attaches_to_parent() {
        let (_transport, _session, world) = world();
        let parent = world
            .spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .unwrap();
        let camera = world
            .spawn_actor(
                "sensor.camera",
                Transform::default(),
                Some(&parent),
                AttachmentType::SpringArm,
            )
            .unwrap();
        assert_eq!(camera.parent(), Some(parent.id()));
    }

    #[test]
    fn rejected_spawn_names_the_blueprint() {
        let (transport, _session, world) = world();
        transport.reject_spawns("collision at spawn point");
        let err = world
            .spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .unwrap_err();
        match err {
            WorldError::Spawn(spawn) => {
                assert_eq!(spawn.blueprint, "vehicle.sedan");
                assert!(spawn.cause.to_string().contains("collision"));
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn try_spawn_swallows_rejection() {
        let (transport, _session, world) = world();
        transport.reject_spawns("blocked");
        assert!(world
            .try_spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .is_none());

        transport.allow_spawns();
        assert!(world
            .try_spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .is_some());
    }

    #[test]
    fn actor_listing_views() {
        let (transport, _session, world) = world();
        let a = transport.add_actor("vehicle.sedan", Transform::default());
        let b = transport.add_actor("walker.pedestrian", Transform::default());

        let all = world.actors().unwrap();
        assert_eq!(all.len(), 2);

        // Unknown IDs are silently omitted from the filtered view.
        let filtered = world
            .actors_by_id(&[b, ActorId(4242)])
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get(0).unwrap().id(), b);

        assert!(world.actor(a).unwrap().is_some());
        assert!(world.actor(ActorId(4242)).unwrap().is_none());
    }

    #[test]
    fn empty_filtered_view_has_size_zero() {
        let (transport, _session, world) = world();
        transport.add_actor("vehicle.sedan", Transform::default());

        let view = world.actors_by_id(&[]).unwrap();
        assert_eq!(view.len(), 0);
        assert!(view.is_empty());
        let err = view.get(0).unwrap_err();
        assert_eq!((err.index, err.len), (0, 0));
    }

    #[test]
    fn bulk_and_single_lookup_agree_within_one_generation() {
        let (transport, _session, world) = world();
        transport.add_actor("vehicle.sedan", Transform::default());
        transport.add_traffic_actor("traffic.stop", "sign-1");

        let view = world.actors().unwrap();
        for listed in view.iter() {
            let single = world
                .actor(listed.id())
                .unwrap()
                .expect("listed actor resolves individually");
            assert_eq!(single.id(), listed.id());
            assert_eq!(single.type_id(), listed.type_id());
            assert_eq!(single.spawn_transform(), listed.spawn_transform());
            assert_eq!(single.sign_id(), listed.sign_id());
        }
    }

    #[test]
    fn light_lookup_skips_unrelated_sign_with_same_id() {
        let (transport, _session, world) = world();
        transport.add_traffic_actor("traffic.sign", "L7");
        transport.add_traffic_actor("traffic_light.generic", "L7");

        let light = world
            .traffic_light(&Landmark::with_id("L7"))
            .unwrap()
            .expect("the light is spawned");
        assert_eq!(light.type_id(), "traffic_light.generic");
    }

    #[test]
    fn spectator_is_always_present() {
        let (_transport, _session, world) = world();
        let spectator = world.spectator().unwrap();
        assert_eq!(spectator.type_id(), "spectator");
    }

    #[test]
    fn traffic_sign_and_light_correlate_by_sign_id() {
        let (transport, _session, world) = world();
        transport.add_traffic_actor("traffic.stop", "sign-12");
        transport.add_traffic_actor("traffic.traffic_light", "light-3");
        transport.add_actor("vehicle.sedan", Transform::default());

        let stop = world
            .traffic_sign(&Landmark::with_id("sign-12"))
            .unwrap()
            .expect("stop sign is spawned");
        assert_eq!(stop.type_id(), "traffic.stop");

        // The sign query also finds lights; the light query finds only
        // lights.
        assert!(world
            .traffic_sign(&Landmark::with_id("light-3"))
            .unwrap()
            .is_some());
        assert!(world
            .traffic_light(&Landmark::with_id("light-3"))
            .unwrap()
            .is_some());
        assert!(world
            .traffic_light(&Landmark::with_id("sign-12"))
            .unwrap()
            .is_none());

        // Unspawned landmarks are absent, not errors.
        assert!(world
            .traffic_sign(&Landmark::with_id("sign-99"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn projection_miss_is_none() {
        let (transport, _session, world) = world();
        assert!(world
            .ground_projection(Location::new(0.0, 0.0, 10.0), 100.0)
            .unwrap()
            .is_none());

        let hit = LabelledPoint {
            location: Location::new(0.0, 0.0, 0.2),
            label: SemanticLabel::ROADS,
        };
        transport.set_projection_hit(Some(hit));
        assert_eq!(
            world
                .ground_projection(Location::new(0.0, 0.0, 10.0), 100.0)
                .unwrap(),
            Some(hit)
        );
    }

    #[test]
    fn cast_ray_returns_all_hits_in_order() {
        let (transport, _session, world) = world();
        let hits = vec![
            LabelledPoint {
                location: Location::new(1.0, 0.0, 0.0),
                label: SemanticLabel::SIDEWALKS,
            },
            LabelledPoint {
                location: Location::new(2.0, 0.0, 0.0),
                label: SemanticLabel::ROADS,
            },
        ];
        transport.set_ray_hits(hits.clone());
        assert_eq!(
            world
                .cast_ray(Location::default(), Location::new(5.0, 0.0, 0.0))
                .unwrap(),
            hits
        );
    }

    #[test]
    fn traffic_control_commands_reach_the_server() {
        let (transport, _session, world) = world();
        world.reset_all_traffic_lights().unwrap();
        world.freeze_all_traffic_lights(true).unwrap();
        world.set_pedestrians_cross_factor(0.3).unwrap();
        assert_eq!(transport.traffic_light_resets(), 1);
        assert_eq!(transport.lights_frozen(), Some(true));
        assert_eq!(transport.pedestrians_cross_factor(), Some(0.3));
    }

    #[test]
    fn vehicle_light_states_list_flags_per_vehicle() {
        let (transport, _session, world) = world();
        assert!(world.vehicle_light_states().unwrap().is_empty());

        let a = transport.add_actor("vehicle.sedan", Transform::default());
        let b = transport.add_actor("vehicle.sedan", Transform::default());
        transport.set_vehicle_lights(
            a,
            VehicleLightState::LOW_BEAM | VehicleLightState::BRAKE,
        );
        transport.set_vehicle_lights(b, VehicleLightState::NONE);

        let states = world.vehicle_light_states().unwrap();
        assert_eq!(states.len(), 2);
        let (id, lights) = states[0];
        assert_eq!(id, a);
        assert!(lights.contains(VehicleLightState::LOW_BEAM));
        assert!(!lights.contains(VehicleLightState::HIGH_BEAM));
        assert_eq!(states[1], (b, VehicleLightState::NONE));
    }

    #[test]
    fn nav_location_is_optional() {
        let (transport, _session, world) = world();
        assert!(world.random_location_from_navigation().unwrap().is_none());
        transport.set_nav_location(Some(Location::new(3.0, 4.0, 0.0)));
        assert_eq!(
            world.random_location_from_navigation().unwrap(),
            Some(Location::new(3.0, 4.0, 0.0))
        );
    }

    #[test]
    fn every_operation_fails_once_stale() {
        let (_transport, session, world) = world();
        session.mark_ended();
        assert!(matches!(
            world.map_name(),
            Err(WorldError::StaleEpisode(_))
        ));
        assert!(matches!(
            world.actors(),
            Err(WorldError::StaleEpisode(_))
        ));
        assert!(matches!(
            world.tick(Duration::from_millis(10)),
            Err(WorldError::StaleEpisode(_))
        ));
        assert!(world
            .try_spawn_actor(
                "vehicle.sedan",
                Transform::default(),
                None,
                AttachmentType::Rigid,
            )
            .is_none());
    }
}
