//! Shuffled playback order for "shuffle all".
//!
//! The permutation is computed once on submission; the engine plays the
//! resulting list in order.

use core_library::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform permutation of `tracks` using the thread-local generator.
pub fn shuffled(tracks: &[Track]) -> Vec<Track> {
    shuffled_with(tracks, &mut rand::thread_rng())
}

/// Same as [`shuffled`] with a caller-supplied generator.
pub fn shuffled_with<R: Rng + ?Sized>(tracks: &[Track], rng: &mut R) -> Vec<Track> {
    let mut order = tracks.to_vec();
    order.shuffle(rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tracks(n: i64) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(i, format!("T{i}"), "A", 1_000, format!("content://media/{i}")))
            .collect()
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let input = tracks(20);
        let mut output = shuffled(&input);
        assert_eq!(output.len(), input.len());

        output.sort_by_key(|t| t.id.as_str().parse::<i64>().unwrap());
        assert_eq!(output, input);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let input = tracks(10);
        let a = shuffled_with(&input, &mut StdRng::seed_from_u64(7));
        let b = shuffled_with(&input, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_stays_empty() {
        assert!(shuffled(&[]).is_empty());
    }
}
