//! Domain models for the track catalog

use crate::error::{LibraryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Stable identifier of a track, reused across app runs.
///
/// On Android this is the media store row id rendered as a string; it is
/// also the identifier handed to the engine, so it must survive the trip
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! track_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TrackId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

track_id_from_int!(i32, i64, u32, u64);

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URI-like reference to playable content or artwork
/// (`content://media/...`, `file:///...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaLocator(String);

impl MediaLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A playable track. Immutable once built; rescans replace tracks wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album_id: Option<String>,
    pub duration_ms: u64,
    /// Playable content
    pub locator: MediaLocator,
    pub artwork: Option<MediaLocator>,
    pub size_bytes: u64,
}

impl Track {
    /// Starts a track with the fields every scanner knows.
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_ms: u64,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album_id: None,
            duration_ms,
            locator: MediaLocator::new(locator),
            artwork: None,
            size_bytes: 0,
        }
    }

    pub fn with_album(mut self, album_id: impl Into<String>) -> Self {
        self.album_id = Some(album_id.into());
        self
    }

    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(MediaLocator::new(artwork));
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Rejects tracks that could not be played or identified.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "id".to_string(),
                message: "Track id cannot be empty".to_string(),
            });
        }

        if self.locator.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "locator".to_string(),
                message: format!("Track {} has no content locator", self.id),
            });
        }

        Ok(())
    }

    /// Average bitrate estimated from file size and duration.
    ///
    /// `None` when the track is shorter than one second, where the estimate
    /// means nothing.
    pub fn bitrate_kbps(&self) -> Option<u64> {
        let seconds = self.duration_ms / 1000;
        if seconds == 0 {
            return None;
        }
        Some(self.size_bytes.saturating_mul(8) / seconds / 1000)
    }
}

impl From<&str> for MediaLocator {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}
