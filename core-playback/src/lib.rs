//! # Playback Coordination Module
//!
//! Keeps a UI surface's view of playback consistent with an engine that
//! lives behind an asynchronous session bridge.
//!
//! ## Overview
//!
//! This module handles:
//! - Connecting to the engine and re-syncing on its push events
//! - Position polling with drag/seek arbitration for the slider
//! - Optimistic playlist submission and shuffle
//! - Resolving engine items back to catalog tracks
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{CoordinatorConfig, PlaybackCoordinator};
//!
//! let coordinator = PlaybackCoordinator::builder(bridge)
//!     .config(CoordinatorConfig::responsive())
//!     .surface_id("full_player")
//!     .spawn()?;
//!
//! coordinator.submit_playlist(catalog.tracks().to_vec(), 3);
//! let mut updates = coordinator.subscribe();
//! while updates.changed().await.is_ok() {
//!     render(&updates.borrow());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mapper;
pub mod position;
pub mod shuffle;
pub mod snapshot;

pub use cache::PlaylistCache;
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorBuilder, PlaybackCoordinator};
pub use error::{PlaybackError, Result};
pub use position::PositionArbiter;
pub use snapshot::{ConnectionState, PlaybackStateSnapshot, MIN_DURATION_MS};
