//! Session layer of the Epilink client.
//!
//! Owns the synchronization protocol between caller threads and the
//! remote episode: the [`Transport`] capability consumed for every
//! round trip, the per-tick [`TickCallbackRegistry`], the blocking
//! [`SnapshotGate`] behind `wait_for_tick`/`tick`, and the
//! [`SnapshotPump`] thread that drives snapshot delivery.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod gate;
mod pump;
mod registry;
mod session;
mod transport;

pub use gate::SnapshotGate;
pub use pump::SnapshotPump;
pub use registry::{TickCallback, TickCallbackRegistry};
pub use session::Session;
pub use transport::Transport;
