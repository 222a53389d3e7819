//! Natural ("alphanumeric") string ordering used for track titles.

use std::cmp::Ordering;

/// Compares two strings so that digit runs order by numeric value:
/// `"Track 2" < "Track 10"`.
///
/// Other characters compare case-insensitively. When one string runs out
/// first, the one with fewer characters overall sorts first, so `"a1"`
/// precedes `"a01"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left: Vec<char> = a.chars().collect();
    let right: Vec<char> = b.chars().collect();
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let (c1, c2) = (left[i], right[j]);

        if c1.is_ascii_digit() && c2.is_ascii_digit() {
            let end1 = digit_run_end(&left, i);
            let end2 = digit_run_end(&right, j);
            let ord = compare_digit_runs(&left[i..end1], &right[j..end2]);
            if ord != Ordering::Equal {
                return ord;
            }
            i = end1;
            j = end2;
            continue;
        }

        let ord = fold_case(c1).cmp(&fold_case(c2));
        if ord != Ordering::Equal {
            return ord;
        }
        i += 1;
        j += 1;
    }

    left.len().cmp(&right.len())
}

fn digit_run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset)
}

/// Numeric comparison of two digit runs of any length.
fn compare_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let a = strip_leading_zeros(a);
    let b = strip_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(digits: &[char]) -> &[char] {
    let first = digits.iter().position(|&c| c != '0').unwrap_or(digits.len());
    &digits[first..]
}

fn fold_case(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(natural_cmp("Track 2", "Track 10"), Ordering::Less);
        assert_eq!(natural_cmp("Track 10", "Track 9"), Ordering::Greater);
        assert_eq!(natural_cmp("Track 10", "Track 10"), Ordering::Equal);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("ABC", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_and_leading_zeros() {
        assert_eq!(natural_cmp("Song", "Song 1"), Ordering::Less);
        assert_eq!(natural_cmp("a1", "a01"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_huge_digit_runs_do_not_overflow() {
        let big = "Mix 123456789012345678901234567890";
        let bigger = "Mix 923456789012345678901234567890";
        assert_eq!(natural_cmp(big, bigger), Ordering::Less);
    }

    #[test]
    fn test_sorting_a_list() {
        let mut titles = vec!["Track 10", "track 1", "Track 2", "Album", "10 Years"];
        titles.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(titles, vec!["10 Years", "Album", "track 1", "Track 2", "Track 10"]);
    }
}
