//! Test utilities for Epilink development.
//!
//! Provides [`FakeTransport`], an in-process scriptable stand-in for
//! the simulation server: tests configure its actor set, weather,
//! geometry query results, and failure modes, then drive snapshot
//! delivery explicitly or through a real [`SnapshotPump`].
//!
//! [`SnapshotPump`]: epilink_session::SnapshotPump

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod fake;

pub use fake::FakeTransport;
