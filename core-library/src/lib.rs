//! # Library Module
//!
//! In-memory track catalog produced by the media scanner:
//! - Domain models ([`Track`], [`TrackId`], [`MediaLocator`])
//! - Natural title ordering ("Track 2" before "Track 10")
//! - Search filtering and fast-scroll section index

pub mod catalog;
pub mod error;
pub mod models;
pub mod sort;

pub use catalog::{section_index, Catalog, Section};
pub use error::{LibraryError, Result};
pub use models::{MediaLocator, Track, TrackId};
pub use sort::natural_cmp;
