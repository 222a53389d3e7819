//! Catalog behaviour as seen by the library screen.

use core_library::{section_index, Catalog, Track};

fn scanned() -> Vec<Track> {
    (1..=12)
        .map(|n| {
            Track::new(
                n,
                format!("Chapter {n}"),
                if n % 2 == 0 { "Even Band" } else { "Odd Band" },
                60_000 * n as u64,
                format!("content://media/external/audio/media/{n}"),
            )
            .with_size(1_000_000)
        })
        .collect()
}

#[test]
fn chapters_sort_numerically() {
    let catalog = Catalog::new(scanned()).unwrap();
    let titles: Vec<_> = catalog.tracks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles.first(), Some(&"Chapter 1"));
    assert_eq!(titles.get(1), Some(&"Chapter 2"));
    assert_eq!(titles.last(), Some(&"Chapter 12"));
}

#[test]
fn filtered_results_get_their_own_sections() {
    let mut tracks = scanned();
    tracks.push(Track::new(100, "Ballad", "Even Band", 1_000, "file:///b.mp3"));
    let catalog = Catalog::new(tracks).unwrap();

    let even = catalog.search("even band");
    assert_eq!(even.len(), 7);

    let sections = section_index(&even);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].label, 'B');
    assert_eq!(sections[1].label, 'C');
    assert_eq!(sections[1].first_index, 1);
}

#[test]
fn invalid_scan_results_are_rejected() {
    let mut tracks = scanned();
    tracks.push(Track::new(200, "Broken", "Nobody", 1_000, ""));
    assert!(Catalog::new(tracks).is_err());
}
