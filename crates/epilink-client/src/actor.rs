//! Per-actor proxy bound to an episode handle.

use std::sync::Arc;

use epilink_core::{ActorDescription, ActorId, ActorState, Transform, WorldError};

use crate::handle::EpisodeHandle;

/// A proxy for one remote actor.
///
/// Carries the actor's immutable description plus an
/// [`EpisodeHandle`], so every dynamic query fails with
/// [`StaleEpisode`](epilink_core::StaleEpisode) once the episode this
/// actor belonged to is gone. Cloning is cheap; clones refer to the
/// same remote actor.
#[derive(Clone)]
pub struct Actor {
    description: Arc<ActorDescription>,
    handle: EpisodeHandle,
}

impl Actor {
    pub(crate) fn new(description: Arc<ActorDescription>, handle: EpisodeHandle) -> Self {
        Self {
            description,
            handle,
        }
    }

    /// Server-assigned actor ID, unique within the episode.
    pub fn id(&self) -> ActorId {
        self.description.id
    }

    /// Blueprint identifier this actor was spawned from, e.g.
    /// `"vehicle.sedan"`.
    pub fn type_id(&self) -> &str {
        &self.description.type_id
    }

    /// Transform at spawn time. For the current pose use
    /// [`state`](Actor::state).
    pub fn spawn_transform(&self) -> Transform {
        self.description.transform
    }

    /// Parent actor, if this actor was spawned attached to one.
    pub fn parent(&self) -> Option<ActorId> {
        self.description.parent
    }

    /// OpenDRIVE sign identifier, present only on traffic signs and
    /// traffic lights.
    pub fn sign_id(&self) -> Option<&str> {
        self.description.sign_id.as_deref()
    }

    /// The handle this proxy is bound to.
    pub fn handle(&self) -> &EpisodeHandle {
        &self.handle
    }

    /// Dynamic state from the latest snapshot; absent if the actor is
    /// no longer part of it (destroyed since the proxy was created).
    pub fn state(&self) -> Result<Option<ActorState>, WorldError> {
        let session = self.handle.lock()?;
        let snapshot = session.snapshot()?;
        Ok(snapshot.find(self.description.id).copied())
    }

    /// Whether the actor still appears in the latest snapshot.
    pub fn is_alive(&self) -> Result<bool, WorldError> {
        Ok(self.state()?.is_some())
    }

    /// Ask the server to destroy this actor. Returns whether the actor
    /// still existed; destroying twice is not an error.
    pub fn destroy(&self) -> Result<bool, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.destroy_actor(self.description.id)?)
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.description.id)
            .field("type_id", &self.description.type_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilink_session::{Session, Transport};
    use epilink_test_utils::FakeTransport;

    fn world_with_one_actor() -> (Arc<FakeTransport>, Arc<Session>, Actor) {
        let transport = Arc::new(FakeTransport::new());
        let id = transport.add_actor("vehicle.sedan", Transform::default());
        let session = Arc::new(
            Session::connect(Arc::clone(&transport) as Arc<dyn Transport>).unwrap(),
        );
        let handle = EpisodeHandle::new(&session);
        let description = session.actor_by_id(id).unwrap().expect("actor exists");
        let actor = Actor::new(Arc::new(description), handle);
        (transport, session, actor)
    }

    #[test]
    fn accessors_expose_the_description() {
        let (_transport, _session, actor) = world_with_one_actor();
        assert_eq!(actor.type_id(), "vehicle.sedan");
        assert_eq!(actor.parent(), None);
        assert_eq!(actor.sign_id(), None);
    }

    #[test]
    fn state_reflects_latest_snapshot() {
        let (transport, session, actor) = world_with_one_actor();
        transport.emit_snapshot();
        let snap = transport
            .poll_snapshot(std::time::Duration::from_secs(1))
            .unwrap()
            .unwrap();
        session.deliver(snap);

        let state = actor.state().unwrap().expect("actor is in the snapshot");
        assert_eq!(state.id, actor.id());
        assert!(actor.is_alive().unwrap());
    }

    #[test]
    fn state_is_absent_after_destruction() {
        let (transport, session, actor) = world_with_one_actor();
        assert!(actor.destroy().unwrap());

        transport.emit_snapshot();
        let snap = transport
            .poll_snapshot(std::time::Duration::from_secs(1))
            .unwrap()
            .unwrap();
        session.deliver(snap);

        assert_eq!(actor.state().unwrap(), None);
        assert!(!actor.is_alive().unwrap());
    }

    #[test]
    fn destroy_twice_reports_absence_not_error() {
        let (_transport, _session, actor) = world_with_one_actor();
        assert!(actor.destroy().unwrap());
        assert!(!actor.destroy().unwrap());
    }

    #[test]
    fn queries_fail_once_the_episode_is_stale() {
        let (_transport, session, actor) = world_with_one_actor();
        session.mark_ended();
        assert!(matches!(
            actor.state(),
            Err(WorldError::StaleEpisode(_))
        ));
    }
}
