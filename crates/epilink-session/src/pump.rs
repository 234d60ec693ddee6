//! The snapshot pump: the dedicated thread that drives tick delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::warn;

use epilink_core::TransportError;

use crate::session::Session;

/// How long each poll blocks before re-checking the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Background thread that drains the transport's snapshot stream into
/// the session.
///
/// One pump per session. The pump thread loops on
/// `Transport::poll_snapshot` and hands every snapshot to
/// [`Session::deliver`], which makes the pump thread the thread tick
/// callbacks run on. On disconnect it marks the session ended and
/// exits; dropping the pump requests shutdown and joins the thread.
pub struct SnapshotPump {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SnapshotPump {
    /// Spawn the pump thread for `session`.
    pub fn start(session: Arc<Session>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name("epilink-tick".into())
            .spawn(move || pump_loop(&session, &flag))
            .expect("failed to spawn snapshot pump thread");
        Self {
            shutdown,
            thread: Some(thread),
        }
    }

    /// Request shutdown and join the pump thread.
    ///
    /// Returns once the thread has exited; bounded by one poll interval
    /// plus whatever the transport's own deadline allows.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Whether the pump thread has exited on its own (disconnect).
    pub fn is_stopped(&self) -> bool {
        self.thread
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for SnapshotPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn pump_loop(session: &Arc<Session>, shutdown: &AtomicBool) {
    loop {
        if shutdown.load(Ordering::Acquire) {
            break;
        }
        match session.transport().poll_snapshot(POLL_INTERVAL) {
            Ok(Some(snapshot)) => session.deliver(snapshot),
            // Stream idle within this poll window.
            Ok(None) | Err(TransportError::Timeout) => {}
            Err(error) => {
                warn!(%error, "snapshot stream closed");
                session.mark_ended();
                break;
            }
        }
    }
}
