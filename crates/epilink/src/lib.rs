//! Epilink: a synchronized client for remote simulation episodes.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Epilink sub-crates. For most users, adding `epilink` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use epilink::prelude::*;
//! use epilink_test_utils::FakeTransport;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // Connect over a transport. The in-process fake stands in for a
//! // real simulation server here.
//! let transport = Arc::new(FakeTransport::new());
//! let client = Client::connect(transport).unwrap();
//!
//! // The world is the facade over the current episode.
//! let world = client.world();
//! world
//!     .apply_settings(&EpisodeSettings::synchronous(0.05))
//!     .unwrap();
//!
//! // Spawn an actor and drive the simulation one step.
//! let vehicle = world
//!     .spawn_actor(
//!         "vehicle.sedan",
//!         Transform::default(),
//!         None,
//!         AttachmentType::Rigid,
//!     )
//!     .unwrap();
//! let tick = world.tick(Duration::from_secs(2)).unwrap();
//! assert_eq!(tick, TickId(1));
//! assert!(vehicle.is_alive().unwrap());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `epilink-core` | IDs, geometry, snapshots, errors, parameters |
//! | [`session`] | `epilink-session` | Transport trait, session, snapshot pump |
//! | [`client`] | `epilink-client` | Client, world facade, actor proxies |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`epilink-core`).
///
/// IDs, geometry, per-tick snapshots, weather and episode settings, and
/// the error taxonomy shared by every layer.
pub use epilink_core as types;

/// Session layer (`epilink-session`).
///
/// The [`session::Transport`] trait is the integration point for real
/// wire protocols; [`session::Session`] and [`session::SnapshotPump`]
/// implement delivery and tick synchronization on top of it.
pub use epilink_session as session;

/// Client layer (`epilink-client`).
///
/// [`client::Client`] owns the connection; [`client::World`] is the
/// facade callers use, with [`client::Actor`] and [`client::ActorView`]
/// for the actor set.
pub use epilink_client as client;

/// Common imports for typical Epilink usage.
///
/// ```rust
/// use epilink::prelude::*;
/// ```
pub mod prelude {
    // IDs and value types
    pub use epilink_core::{
        ActorId, ActorState, AttachmentType, CallbackId, EpisodeId, EpisodeSettings, LabelledPoint,
        Landmark, LightId, LightState, Location, Rotation, TickId, Timestamp, Transform, Vector3D,
        VehicleLightState, WeatherParameters, WorldSnapshot,
    };

    // Errors
    pub use epilink_core::{
        IndexOutOfRange, SpawnError, StaleEpisode, TickError, TransportError, WorldError,
    };

    // Session
    pub use epilink_session::Transport;

    // Client
    pub use epilink_client::{Actor, ActorView, Client, EpisodeHandle, LightManager, World};
}
