//! The connection owner.

use std::sync::Arc;

use tracing::info;

use epilink_core::TransportError;
use epilink_session::{Session, SnapshotPump, Transport};

use crate::handle::EpisodeHandle;
use crate::world::World;

/// Owner of one connection to a simulation server.
///
/// Connecting builds the session and starts the snapshot pump; the
/// client keeps both alive. Caller threads never touch the session
/// directly — they mint [`World`] facades, each bound to the episode
/// generation current at mint time. Dropping the client stops the pump
/// and ends the session, which turns every outstanding world stale.
pub struct Client {
    session: Arc<Session>,
    pump: Option<SnapshotPump>,
}

impl Client {
    /// Connect over `transport` and start the snapshot pump.
    pub fn connect(transport: Arc<dyn Transport>) -> Result<Self, TransportError> {
        let session = Arc::new(Session::connect(transport)?);
        let pump = SnapshotPump::start(Arc::clone(&session));
        Ok(Self {
            session,
            pump: Some(pump),
        })
    }

    /// A world bound to the episode the session currently serves.
    ///
    /// Call again after an episode change to get a live world; worlds
    /// minted before the change are permanently stale.
    pub fn world(&self) -> World {
        World::new(EpisodeHandle::new(&self.session))
    }

    /// The shared session. Exposed for composition with the session
    /// layer; most callers want [`world`](Client::world).
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Tear the connection down: stop the pump and end the session.
    /// Idempotent; every outstanding world becomes stale.
    pub fn disconnect(&mut self) {
        if let Some(mut pump) = self.pump.take() {
            pump.shutdown();
            info!("client disconnected");
        }
        self.session.mark_ended();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilink_test_utils::FakeTransport;

    #[test]
    fn connect_and_mint_a_world() {
        let transport = Arc::new(FakeTransport::new());
        let client = Client::connect(transport).unwrap();
        let world = client.world();
        assert_eq!(world.episode(), client.session().current_episode());
        assert_eq!(world.map_name().unwrap(), "Town01");
    }

    #[test]
    fn disconnect_stales_outstanding_worlds() {
        let transport = Arc::new(FakeTransport::new());
        let mut client = Client::connect(transport).unwrap();
        let world = client.world();
        client.disconnect();
        client.disconnect();
        assert!(world.map_name().is_err());
    }

    #[test]
    fn drop_stales_outstanding_worlds() {
        let transport = Arc::new(FakeTransport::new());
        let client = Client::connect(transport).unwrap();
        let world = client.world();
        drop(client);
        assert!(world.map_name().is_err());
    }
}
