//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies an actor within an episode.
///
/// Assigned by the server at spawn time and never reused within an
/// episode. A destroyed actor's ID simply stops resolving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing simulation tick counter.
///
/// Incremented each time the server advances the simulation one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one running episode on the server.
///
/// The server allocates a fresh ID whenever the episode is replaced
/// (map reload, server restart). Client-side handles capture the ID at
/// creation time and compare it against the session's current value to
/// detect staleness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeId(pub u64);

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EpisodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`CallbackId`] allocation.
static CALLBACK_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a registered tick callback.
///
/// Allocated from a monotonic atomic counter via [`CallbackId::next`].
/// IDs are never reused within a process lifetime, so a stored ID
/// remains a stable removal token even after the callback is gone —
/// removing an already-removed ID is a no-op, never a collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Allocate a fresh, unique callback ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(CALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_ids_are_unique() {
        let a = CallbackId::next();
        let b = CallbackId::next();
        let c = CallbackId::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a < b && b < c, "IDs are monotonic");
    }

    #[test]
    fn callback_ids_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..100).map(|_| CallbackId::next()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<CallbackId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 400);
    }

    #[test]
    fn display_roundtrip() {
        assert_eq!(ActorId(7).to_string(), "7");
        assert_eq!(TickId(42).to_string(), "42");
        assert_eq!(EpisodeId(3).to_string(), "3");
    }
}
