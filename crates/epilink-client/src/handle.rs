//! The synchronized, possibly-stale reference to a live session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use epilink_core::{EpisodeId, StaleEpisode};
use epilink_session::Session;

/// A weak, generation-checked reference to the session.
///
/// Handles are minted by [`Client::world`](crate::Client::world) and
/// capture the episode generation at that moment. [`lock`] yields a
/// strong session reference valid for the duration of one operation
/// only; callers must not retain it, because the underlying session can
/// be superseded or torn down concurrently by another thread.
///
/// The handle has two observable states: **Live** (lock succeeds) and
/// **Stale** (lock fails with [`StaleEpisode`]). The transition is one
/// way; a stale handle never recovers.
///
/// [`lock`]: EpisodeHandle::lock
#[derive(Clone)]
pub struct EpisodeHandle {
    session: Weak<Session>,
    episode: EpisodeId,
    /// Latched by whichever thread first observes invalidation, so
    /// every thread sees the same staleness answer. Shared by clones.
    stale: Arc<AtomicBool>,
}

impl EpisodeHandle {
    /// A handle bound to `session`'s current episode generation.
    pub fn new(session: &Arc<Session>) -> Self {
        Self {
            session: Arc::downgrade(session),
            episode: session.current_episode(),
            stale: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The episode generation this handle is bound to.
    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// Whether staleness has already been observed.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Acquire a strong session reference for one operation.
    ///
    /// Fails with [`StaleEpisode`] if the session was dropped, the
    /// connection ended, or the server started a new episode since this
    /// handle was minted. The returned reference must only live for the
    /// current logical unit of work.
    pub fn lock(&self) -> Result<Arc<Session>, StaleEpisode> {
        if self.is_stale() {
            return Err(self.stale_error());
        }
        let session = match self.session.upgrade() {
            Some(session) => session,
            None => {
                self.latch_stale();
                return Err(self.stale_error());
            }
        };
        if session.is_ended() || session.current_episode() != self.episode {
            self.latch_stale();
            return Err(self.stale_error());
        }
        Ok(session)
    }

    /// First observer wins the latch; losers still read `true`.
    fn latch_stale(&self) {
        let _ = self
            .stale
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire);
    }

    fn stale_error(&self) -> StaleEpisode {
        StaleEpisode {
            episode: self.episode,
        }
    }
}

impl std::fmt::Debug for EpisodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpisodeHandle")
            .field("episode", &self.episode)
            .field("stale", &self.is_stale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilink_session::Transport;
    use epilink_test_utils::FakeTransport;

    fn live_session() -> (Arc<FakeTransport>, Arc<Session>) {
        let transport = Arc::new(FakeTransport::new());
        let session = Arc::new(
            Session::connect(Arc::clone(&transport) as Arc<dyn Transport>).unwrap(),
        );
        (transport, session)
    }

    #[test]
    fn lock_succeeds_on_live_session() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);
        assert_eq!(
            handle.lock().unwrap().current_episode(),
            handle.episode()
        );
        assert!(!handle.is_stale());
    }

    #[test]
    fn lock_fails_after_session_dropped() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);
        drop(session);
        let err = handle.lock().unwrap_err();
        assert_eq!(err.episode, handle.episode());
        assert!(handle.is_stale());
    }

    #[test]
    fn lock_fails_after_episode_replacement() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);

        // Server starts a new episode; delivery moves the generation.
        let old = session.current_episode().0;
        session.deliver(epilink_core::WorldSnapshot::new(
            EpisodeId(old + 1),
            epilink_core::TickId(1),
            epilink_core::Timestamp::default(),
            vec![],
        ));

        assert!(handle.lock().is_err());
        // A fresh handle at the new generation works.
        let fresh = EpisodeHandle::new(&session);
        assert!(fresh.lock().is_ok());
    }

    #[test]
    fn lock_fails_after_mark_ended() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);
        session.mark_ended();
        assert!(handle.lock().is_err());
    }

    #[test]
    fn staleness_is_consistent_across_threads_and_clones() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);
        session.mark_ended();

        let clones: Vec<_> = (0..8).map(|_| handle.clone()).collect();
        let handles: Vec<_> = clones
            .into_iter()
            .map(|h| std::thread::spawn(move || h.lock().is_err() && h.is_stale()))
            .collect();
        for h in handles {
            assert!(h.join().unwrap(), "every thread observes staleness");
        }
        assert!(handle.is_stale());
    }

    #[test]
    fn stale_handle_never_recovers() {
        let (_transport, session) = live_session();
        let handle = EpisodeHandle::new(&session);
        session.mark_ended();
        assert!(handle.lock().is_err());
        // Repeated locks keep failing identically.
        for _ in 0..3 {
            assert_eq!(
                handle.lock().unwrap_err().episode,
                handle.episode()
            );
        }
    }
}
