//! The snapshot-arrival signal shared by `wait_for_tick` and `tick`.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use epilink_core::{TickError, WorldSnapshot};

struct GateState {
    /// Number of snapshots published so far. Strictly increasing; a
    /// waiter that recorded sequence `n` wakes once it exceeds `n`.
    sequence: u64,
    latest: Option<Arc<WorldSnapshot>>,
}

/// Publish/wait point for per-tick snapshots.
///
/// One producer (the snapshot pump) publishes each tick's snapshot;
/// any number of threads block in [`wait_next`] until a snapshot newer
/// than the one they entered with arrives. Publication order is the
/// delivery order: snapshot N is visible to waiters before N+1 exists.
///
/// [`wait_next`]: SnapshotGate::wait_next
pub struct SnapshotGate {
    state: Mutex<GateState>,
    arrived: Condvar,
}

impl SnapshotGate {
    /// A gate with no snapshot yet.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                sequence: 0,
                latest: None,
            }),
            arrived: Condvar::new(),
        }
    }

    /// Store `snapshot` as the latest and wake every waiter.
    pub fn publish(&self, snapshot: Arc<WorldSnapshot>) {
        let mut state = self.state.lock().unwrap();
        state.sequence += 1;
        state.latest = Some(snapshot);
        self.arrived.notify_all();
    }

    /// The most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<WorldSnapshot>> {
        self.state.lock().unwrap().latest.clone()
    }

    /// The current publication sequence number.
    ///
    /// Record this *before* issuing a tick request, then pass it to
    /// [`wait_since`](SnapshotGate::wait_since) — the confirmation
    /// cannot be missed even if it arrives before the wait starts.
    pub fn sequence(&self) -> u64 {
        self.state.lock().unwrap().sequence
    }

    /// Block until a snapshot with sequence greater than `since`
    /// arrives, or fail with [`TickError::Timeout`] after `timeout`.
    pub fn wait_since(
        &self,
        since: u64,
        timeout: Duration,
    ) -> Result<Arc<WorldSnapshot>, TickError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        loop {
            if state.sequence > since {
                // sequence > 0 implies a snapshot was stored.
                return Ok(Arc::clone(state.latest.as_ref().expect("published")));
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(TickError::Timeout { waited: timeout });
            }
            let (guard, _timed_out) = self
                .arrived
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
        }
    }

    /// Block until the next snapshot after the current one arrives.
    pub fn wait_next(&self, timeout: Duration) -> Result<Arc<WorldSnapshot>, TickError> {
        let since = self.sequence();
        self.wait_since(since, timeout)
    }
}

impl Default for SnapshotGate {
    fn default() -> Self {
        Self::new()
    }
}
