//! Media catalog and playback state of a local music player.
//!
//! [`catalog`] holds the scanned library as immutable snapshots, [`playback`]
//! owns the queue and talks to an external engine, and [`context::AppContext`]
//! wires both together for a front end.

pub mod browse;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod media;
pub mod navigation;
pub mod playback;
pub mod util;

pub use error::{Error, Result};
