//! Identity map from engine item ids back to the submitted tracks.
//!
//! The engine only knows what was put into each [`EngineItem`]; everything
//! a surface renders (artist, artwork, true duration) comes from the
//! `Track` the item was built from. The cache is rebuilt on every
//! submission.
//!
//! [`EngineItem`]: bridge_traits::EngineItem

use core_library::Track;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PlaylistCache {
    tracks: Arc<[Track]>,
    by_id: HashMap<String, usize>,
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self {
            tracks: Arc::from(Vec::new()),
            by_id: HashMap::new(),
        }
    }
}

impl PlaylistCache {
    pub fn new(tracks: Arc<[Track]>) -> Self {
        let mut by_id = HashMap::with_capacity(tracks.len());
        for (index, track) in tracks.iter().enumerate() {
            // First occurrence wins when a playlist repeats a track.
            by_id.entry(track.id.to_string()).or_insert(index);
        }
        Self { tracks, by_id }
    }

    /// Swaps in a new playlist.
    pub fn replace(&mut self, tracks: Arc<[Track]>) {
        *self = Self::new(tracks);
    }

    pub fn resolve(&self, item_id: &str) -> Option<&Track> {
        self.by_id.get(item_id).map(|&index| &self.tracks[index])
    }

    pub fn tracks(&self) -> &Arc<[Track]> {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist() -> Arc<[Track]> {
        Arc::from(vec![
            Track::new(1, "One", "A", 1_000, "content://media/1"),
            Track::new(2, "Two", "B", 2_000, "content://media/2"),
            Track::new(1, "One again", "A", 1_000, "content://media/1"),
        ])
    }

    #[test]
    fn test_resolve_by_id() {
        let cache = PlaylistCache::new(playlist());
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.resolve("2").unwrap().title, "Two");
        assert!(cache.resolve("404").is_none());
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first() {
        let cache = PlaylistCache::new(playlist());
        assert_eq!(cache.resolve("1").unwrap().title, "One");
    }

    #[test]
    fn test_replace_drops_old_entries() {
        let mut cache = PlaylistCache::new(playlist());
        cache.replace(Arc::from(vec![Track::new(
            9,
            "Nine",
            "C",
            9_000,
            "content://media/9",
        )]));

        assert!(cache.resolve("1").is_none());
        assert_eq!(cache.resolve("9").unwrap().duration_ms, 9_000);
        assert!(!cache.is_empty());
        assert!(PlaylistCache::default().is_empty());
    }
}
