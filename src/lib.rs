//! notesync library
//!
//! Local-first data layer for a personal notes application: in-memory
//! entity collections, trash lifecycle with a 30-day retention window,
//! hierarchical folder operations, and fire-and-forget mirroring to a
//! remote relational backend.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;
pub mod store;
pub mod sync;
