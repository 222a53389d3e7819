//! Sorted, searchable track catalog.

use crate::error::{LibraryError, Result};
use crate::models::{Track, TrackId};
use crate::sort::natural_cmp;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tracing::debug;

/// Section label for titles that do not start with a letter.
pub const NON_LETTER_SECTION: char = '#';

/// One entry of the fast-scroll index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub label: char,
    /// Index of the first track in this section
    pub first_index: usize,
}

/// Immutable snapshot of the scanned tracks, ordered by title.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    by_id: HashMap<TrackId, usize>,
}

impl Catalog {
    /// Sorts `tracks` by natural title order.
    ///
    /// Fails when a track is invalid or two tracks share an id, since
    /// playback resolves engine items back to tracks by id.
    pub fn new(mut tracks: Vec<Track>) -> Result<Self> {
        for track in &tracks {
            track.validate()?;
        }

        tracks.sort_by(|a, b| natural_cmp(&a.title, &b.title));

        let mut by_id = HashMap::with_capacity(tracks.len());
        for (index, track) in tracks.iter().enumerate() {
            if by_id.insert(track.id.clone(), index).is_some() {
                return Err(LibraryError::DuplicateTrack(track.id.to_string()));
            }
        }

        debug!(count = tracks.len(), "catalog built");
        Ok(Self { tracks, by_id })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.by_id.get(id).map(|&index| &self.tracks[index])
    }

    pub fn require(&self, id: &TrackId) -> Result<&Track> {
        self.get(id).ok_or_else(|| LibraryError::NotFound {
            entity_type: "Track".to_string(),
            id: id.to_string(),
        })
    }

    /// Position of `id` in catalog order.
    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Tracks whose title or artist contains `query`, ignoring case.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<Track> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.tracks.clone();
        }

        self.tracks
            .iter()
            .filter(|track| {
                track.title.to_lowercase().contains(&query)
                    || track.artist.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    pub fn random_track(&self) -> Option<&Track> {
        self.tracks.choose(&mut rand::thread_rng())
    }
}

/// Fast-scroll index over `tracks` as currently ordered.
///
/// The label is the uppercased first letter of the title; anything else,
/// including an empty title, lands in [`NON_LETTER_SECTION`]. Each label
/// appears once, at the first track that carries it.
pub fn section_index(tracks: &[Track]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    for (index, track) in tracks.iter().enumerate() {
        let label = section_label(&track.title);
        if sections.iter().all(|section| section.label != label) {
            sections.push(Section {
                label,
                first_index: index,
            });
        }
    }
    sections
}

fn section_label(title: &str) -> char {
    match title.chars().next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().next().unwrap_or(first),
        _ => NON_LETTER_SECTION,
    }
}
