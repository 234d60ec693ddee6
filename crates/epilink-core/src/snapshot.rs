//! World snapshots: the per-tick immutable capture of actor state.

use indexmap::IndexMap;

use crate::geom::{Transform, Vector3D};
use crate::id::{ActorId, EpisodeId, TickId};

/// Time information attached to every snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timestamp {
    /// Simulation seconds elapsed since the episode started.
    pub elapsed_seconds: f64,
    /// Simulation seconds advanced by this tick.
    pub delta_seconds: f64,
    /// Wall-clock seconds on the server when the tick was produced.
    pub platform_timestamp: f64,
}

/// Transient per-actor state at one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorState {
    /// The actor this state belongs to.
    pub id: ActorId,
    /// World transform at this tick.
    pub transform: Transform,
    /// Linear velocity in m/s.
    pub velocity: Vector3D,
    /// Angular velocity in deg/s.
    pub angular_velocity: Vector3D,
    /// Linear acceleration in m/s².
    pub acceleration: Vector3D,
}

impl ActorState {
    /// A resting state for `id` at `transform`.
    pub fn at_rest(id: ActorId, transform: Transform) -> Self {
        Self {
            id,
            transform,
            ..Self::default()
        }
    }
}

/// Immutable capture of the simulation at one tick.
///
/// Produced once per tick by the server, delivered through the snapshot
/// stream, and shared by reference between tick callbacks and blocking
/// waiters. Never mutated after construction.
///
/// Actor states keep the server's delivery order and are addressable by
/// actor ID in O(1).
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    episode: EpisodeId,
    tick: TickId,
    timestamp: Timestamp,
    actor_states: IndexMap<ActorId, ActorState>,
}

impl WorldSnapshot {
    /// Build a snapshot from the per-actor states of one tick.
    ///
    /// Duplicate actor IDs keep the last state seen, matching the
    /// server contract of at most one state per actor per tick.
    pub fn new(
        episode: EpisodeId,
        tick: TickId,
        timestamp: Timestamp,
        states: Vec<ActorState>,
    ) -> Self {
        let actor_states = states.into_iter().map(|s| (s.id, s)).collect();
        Self {
            episode,
            tick,
            timestamp,
            actor_states,
        }
    }

    /// The episode this snapshot belongs to.
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// The tick this snapshot captures.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Time information for this tick.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// State of one actor at this tick, absent if the actor did not
    /// exist (or was already destroyed) when the tick was captured.
    pub fn find(&self, id: ActorId) -> Option<&ActorState> {
        self.actor_states.get(&id)
    }

    /// Whether `id` has state in this snapshot.
    pub fn contains(&self, id: ActorId) -> bool {
        self.actor_states.contains_key(&id)
    }

    /// Number of actors captured.
    pub fn len(&self) -> usize {
        self.actor_states.len()
    }

    /// Whether the snapshot captured no actors.
    pub fn is_empty(&self) -> bool {
        self.actor_states.is_empty()
    }

    /// Iterate actor states in server delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorState> {
        self.actor_states.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Location;

    fn snap_with(ids: &[u64]) -> WorldSnapshot {
        let states = ids
            .iter()
            .map(|&id| ActorState::at_rest(ActorId(id), Transform::default()))
            .collect();
        WorldSnapshot::new(EpisodeId(1), TickId(5), Timestamp::default(), states)
    }

    #[test]
    fn find_and_contains() {
        let snap = snap_with(&[10, 20, 30]);
        assert!(snap.contains(ActorId(20)));
        assert_eq!(snap.find(ActorId(20)).unwrap().id, ActorId(20));
        assert!(snap.find(ActorId(99)).is_none());
        assert_eq!(snap.len(), 3);
    }

    #[test]
    fn iteration_preserves_delivery_order() {
        let snap = snap_with(&[30, 10, 20]);
        let order: Vec<u64> = snap.iter().map(|s| s.id.0).collect();
        assert_eq!(order, vec![30, 10, 20]);
    }

    #[test]
    fn duplicate_ids_keep_last_state() {
        let states = vec![
            ActorState::at_rest(ActorId(1), Transform::at(Location::new(0.0, 0.0, 0.0))),
            ActorState::at_rest(ActorId(1), Transform::at(Location::new(5.0, 0.0, 0.0))),
        ];
        let snap = WorldSnapshot::new(EpisodeId(1), TickId(1), Timestamp::default(), states);
        assert_eq!(snap.len(), 1);
        assert_eq!(
            snap.find(ActorId(1)).unwrap().transform.location.x,
            5.0
        );
    }
}
