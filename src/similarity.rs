//! Weighted edit distance over normalized song names.
//!
//! Both inputs are lowercased, stripped of "feat"/"ft" markers and reduced to
//! their whitespace tokens sorted and joined, so word order and featuring
//! annotations do not count. The distance itself is asymmetric: dropping a
//! character of `a` is cheaper than inserting one from `b`.

use regex::Regex;
use std::sync::LazyLock;

const DELETE_COST: u32 = 1;
const INSERT_COST: u32 = 2;
const SUBSTITUTE_COST: u32 = 3;

static FEATURING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"f(ea)?t\.?").expect("valid featuring pattern"));

pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = FEATURING.replace_all(&lowered, "");
    let mut tokens: Vec<&str> = stripped.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.concat()
}

pub fn distance(a: &str, b: &str) -> u32 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    weighted_distance(&a, &b)
}

/// Single-row DP: `costs[j]` holds the cost of turning `a[..i]` into `b[..j]`.
fn weighted_distance(a: &[char], b: &[char]) -> u32 {
    let mut costs: Vec<u32> = (0..=b.len() as u32).map(|j| j * INSERT_COST).collect();

    for (i, a_char) in a.iter().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = (i as u32 + 1) * DELETE_COST;
        for (j, b_char) in b.iter().enumerate() {
            let above = costs[j + 1];
            let substitution = if a_char == b_char {
                diagonal
            } else {
                diagonal + SUBSTITUTE_COST
            };
            costs[j + 1] = (above + DELETE_COST)
                .min(costs[j] + INSERT_COST)
                .min(substitution);
            diagonal = above;
        }
    }

    costs[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_sorts_tokens_and_drops_featuring() {
        assert_eq!(normalize("Hey Jude"), "heyjude");
        assert_eq!(normalize("Jude  Hey"), "heyjude");
        assert_eq!(normalize("Song FEAT. Guest"), "guestsong");
        assert_eq!(normalize("Song ft Guest"), "guestsong");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn identical_names_have_zero_distance() {
        assert_eq!(distance("Bohemian Rhapsody", "Bohemian Rhapsody"), 0);
        assert_eq!(distance("", ""), 0);
    }

    #[test]
    fn word_order_is_ignored() {
        assert_eq!(distance("Hey Jude", "Jude Hey"), 0);
    }

    #[test]
    fn featuring_marker_is_ignored() {
        assert_eq!(distance("Song feat. X", "Song X"), 0);
        assert_eq!(distance("Song ft. X", "song x"), 0);
        assert_eq!(distance("Song feat.", "Song"), 0);
    }

    #[test]
    fn featured_artist_name_still_counts() {
        // Only the marker is stripped; the guest's name stays in the token set.
        assert_eq!(distance("Song feat. X", "Song"), 1);
    }

    #[test]
    fn deletion_and_insertion_are_weighted_differently() {
        assert_eq!(distance("ab", "a"), 1);
        assert_eq!(distance("a", "ab"), 2);
        assert_ne!(distance("ab", "a"), distance("a", "ab"));
    }

    #[test]
    fn substitution_costs_three() {
        assert_eq!(distance("a", "b"), 3);
        assert_eq!(distance("cat", "cut"), 3);
    }

    #[test]
    fn empty_side_costs_per_character() {
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", "abc"), 6);
    }

    #[test]
    fn case_does_not_matter() {
        assert_eq!(distance("YESTERDAY", "yesterday"), 0);
    }

    proptest::proptest! {
        #[test]
        fn distance_to_self_is_zero(name in "\\PC{0,40}") {
            proptest::prop_assert_eq!(distance(&name, &name), 0);
        }

        #[test]
        fn distance_is_deterministic(a in "[a-z ]{0,20}", b in "[a-z ]{0,20}") {
            proptest::prop_assert_eq!(distance(&a, &b), distance(&a, &b));
        }
    }
}
