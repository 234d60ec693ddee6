//! Error types for the Epilink client.
//!
//! Organized by subsystem: handle locking, transport round trips, actor
//! spawning, tick synchronization, and view indexing. "Not found" is
//! never an error anywhere in the client — pure lookups return `Option`
//! so that callers can tell a missing entity apart from a dead session.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::id::EpisodeId;

/// The episode behind a handle has ended or been superseded.
///
/// Returned by `EpisodeHandle::lock()` and propagated unchanged by
/// every World operation. A stale handle never recovers — obtain a new
/// one from the client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaleEpisode {
    /// The episode generation the handle was bound to.
    pub episode: EpisodeId,
}

impl fmt::Display for StaleEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "episode {} has ended or been superseded", self.episode)
    }
}

impl Error for StaleEpisode {}

/// Wire-level failure surfaced by the transport collaborator.
///
/// The transport already performs the network round trip; these are the
/// only failure shapes it reports back to the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The connection to the simulation server is gone.
    Disconnected,
    /// The round trip exceeded the transport's own deadline.
    Timeout,
    /// The server processed the request and refused it.
    Rejected {
        /// Server-supplied explanation.
        reason: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "transport disconnected"),
            Self::Timeout => write!(f, "transport round trip timed out"),
            Self::Rejected { reason } => write!(f, "request rejected: {reason}"),
        }
    }
}

impl Error for TransportError {}

/// The server rejected a spawn request.
///
/// Wraps the underlying transport failure (collision, invalid
/// blueprint, invalid parent) so callers can inspect the cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnError {
    /// The blueprint the spawn was attempted with.
    pub blueprint: String,
    /// The underlying transport failure.
    pub cause: TransportError,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to spawn '{}': {}", self.blueprint, self.cause)
    }
}

impl Error for SpawnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

/// Errors from tick waiting and tick advancing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickError {
    /// No snapshot arrived within the caller's deadline.
    ///
    /// A timed-out advance request says nothing about whether the tick
    /// happened server-side; re-query a snapshot to find out.
    Timeout {
        /// The deadline that elapsed.
        waited: Duration,
    },
    /// The transport failed before or during the wait.
    Transport(TransportError),
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { waited } => {
                write!(f, "no tick snapshot within {:?}", waited)
            }
            Self::Transport(e) => write!(f, "tick failed: {e}"),
        }
    }
}

impl Error for TickError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

/// Index access beyond the current size of an actor view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOutOfRange {
    /// The requested index.
    pub index: usize,
    /// The view's fixed size.
    pub len: usize,
}

impl fmt::Display for IndexOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {} out of range for view of {} actors", self.index, self.len)
    }
}

impl Error for IndexOutOfRange {}

/// Any failure a World operation can propagate.
///
/// Composition of the per-subsystem errors above, with `From` impls so
/// operations can use `?` across subsystem boundaries. Staleness stays
/// a distinct variant so callers can decide to reconnect rather than
/// treat an entity as absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The handle's episode has ended or been superseded.
    StaleEpisode(StaleEpisode),
    /// A transport round trip failed.
    Transport(TransportError),
    /// A spawn request was rejected.
    Spawn(SpawnError),
    /// A tick wait or advance failed.
    Tick(TickError),
    /// A view index access was out of range.
    Index(IndexOutOfRange),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleEpisode(e) => write!(f, "{e}"),
            Self::Transport(e) => write!(f, "{e}"),
            Self::Spawn(e) => write!(f, "{e}"),
            Self::Tick(e) => write!(f, "{e}"),
            Self::Index(e) => write!(f, "{e}"),
        }
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StaleEpisode(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Spawn(e) => Some(e),
            Self::Tick(e) => Some(e),
            Self::Index(e) => Some(e),
        }
    }
}

impl From<StaleEpisode> for WorldError {
    fn from(e: StaleEpisode) -> Self {
        Self::StaleEpisode(e)
    }
}

impl From<TransportError> for WorldError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<SpawnError> for WorldError {
    fn from(e: SpawnError) -> Self {
        Self::Spawn(e)
    }
}

impl From<TickError> for WorldError {
    fn from(e: TickError) -> Self {
        Self::Tick(e)
    }
}

impl From<IndexOutOfRange> for WorldError {
    fn from(e: IndexOutOfRange) -> Self {
        Self::Index(e)
    }
}
