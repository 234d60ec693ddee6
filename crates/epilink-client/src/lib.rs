//! Client layer of Epilink: the synchronized view of a remote episode.
//!
//! [`Client`] owns the connection; [`World`] is the facade every caller
//! thread goes through. Each World operation locks the
//! [`EpisodeHandle`] exactly once, performs its session calls against
//! that one reference, and returns a value — the locked reference is
//! never retained across operations, so a concurrent episode
//! replacement turns into a clean [`StaleEpisode`] failure on the next
//! call instead of an access to the wrong session.
//!
//! [`StaleEpisode`]: epilink_core::StaleEpisode

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod actor;
mod client;
mod handle;
mod lights;
mod view;
mod world;

pub use actor::Actor;
pub use client::Client;
pub use handle::EpisodeHandle;
pub use lights::LightManager;
pub use view::ActorView;
pub use world::World;
