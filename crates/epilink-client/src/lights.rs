//! Street-light control.

use epilink_core::{LightId, LightState, WorldError};

use crate::handle::EpisodeHandle;

/// Access to the map's street lights.
///
/// Obtained from [`World::light_manager`](crate::World::light_manager);
/// bound to the same episode handle as the world that produced it.
#[derive(Clone, Debug)]
pub struct LightManager {
    handle: EpisodeHandle,
}

impl LightManager {
    pub(crate) fn new(handle: EpisodeHandle) -> Self {
        Self { handle }
    }

    /// Every street light with its current state.
    pub fn lights(&self) -> Result<Vec<(LightId, LightState)>, WorldError> {
        let session = self.handle.lock()?;
        Ok(session.lights()?)
    }

    /// Update one street light.
    pub fn set_state(&self, id: LightId, state: LightState) -> Result<(), WorldError> {
        let session = self.handle.lock()?;
        Ok(session.set_light_state(id, state)?)
    }
}
