//! Conversion between catalog tracks and engine items.

use bridge_traits::{EngineItem, ItemMetadata};
use core_library::Track;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Builds the engine item for `track`. The item id is the track id, which
/// is how engine transitions are resolved back to tracks.
pub fn to_engine_item(track: &Track) -> EngineItem {
    EngineItem::new(track.id.as_str(), track.locator.as_str()).with_metadata(ItemMetadata {
        title: Some(track.title.clone()),
        artist: Some(track.artist.clone()),
        artwork: track.artwork.as_ref().map(|art| art.to_string()),
        is_playable: true,
    })
}

/// Best-effort track from an item the playlist cache does not know.
///
/// Engines hand back only what was put in the item, so the duration is
/// unknown (0) and missing text falls back to placeholders.
pub fn partial_track(item: &EngineItem) -> Track {
    let mut track = Track::new(
        item.id.as_str(),
        item.metadata
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        item.metadata
            .artist
            .clone()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        0,
        item.locator.as_str(),
    );
    if let Some(artwork) = &item.metadata.artwork {
        track = track.with_artwork(artwork.as_str());
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_to_item_keeps_identity() {
        let track = Track::new(42, "Intro", "Band", 180_000, "content://media/42")
            .with_artwork("content://art/7");
        let item = to_engine_item(&track);

        assert_eq!(item.id, "42");
        assert_eq!(item.locator, "content://media/42");
        assert_eq!(item.metadata.title.as_deref(), Some("Intro"));
        assert_eq!(item.metadata.artist.as_deref(), Some("Band"));
        assert_eq!(item.metadata.artwork.as_deref(), Some("content://art/7"));
        assert!(item.metadata.is_playable);
    }

    #[test]
    fn test_partial_track_placeholders() {
        let item = EngineItem::new("77", "file:///x.mp3");
        let track = partial_track(&item);

        assert_eq!(track.id.as_str(), "77");
        assert_eq!(track.title, UNKNOWN_TITLE);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.duration_ms, 0);
        assert!(track.artwork.is_none());
    }

    #[test]
    fn test_partial_track_uses_item_metadata() {
        let source = Track::new(5, "Five", "Quintet", 5_000, "content://media/5");
        let track = partial_track(&to_engine_item(&source));

        assert_eq!(track.title, "Five");
        assert_eq!(track.artist, "Quintet");
        assert_eq!(track.duration_ms, 0);
    }
}
