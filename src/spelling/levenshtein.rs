//! Levenshtein edit distance.
//!
//! Insertions, deletions and substitutions each cost 1. Distances are
//! measured in `char`s, not bytes.

use std::cmp::min;

/// Calculate the Levenshtein distance between two strings.
///
/// The distance to or from an empty string is the other string's length.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    distance_chars(&s1_chars, &s2_chars, usize::MAX).unwrap_or(usize::MAX)
}

/// Calculate Levenshtein distance with a maximum threshold for early termination.
///
/// Returns `None` if the distance exceeds `threshold`.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    distance_chars(&s1_chars, &s2_chars, threshold)
}

fn distance_chars(s1: &[char], s2: &[char], threshold: usize) -> Option<usize> {
    let len1 = s1.len();
    let len2 = s2.len();

    // Length difference is a lower bound on the distance
    if len1.abs_diff(len2) > threshold {
        return None;
    }
    if len1 == 0 {
        return Some(len2);
    }
    if len2 == 0 {
        return Some(len1);
    }

    // Two rows are enough: row i only depends on row i - 1
    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr_row[0] = i;
        let mut min_in_row = i;

        for j in 1..=len2 {
            let cost = if s1[i - 1] == s2[j - 1] { 0 } else { 1 };

            curr_row[j] = min(
                min(
                    prev_row[j] + 1,     // deletion
                    curr_row[j - 1] + 1, // insertion
                ),
                prev_row[j - 1] + cost, // substitution
            );
            min_in_row = min(min_in_row, curr_row[j]);
        }

        if min_in_row > threshold {
            return None;
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[len2];
    (distance <= threshold).then_some(distance)
}

/// Measures many candidates against one target word without re-decoding
/// the target each time.
#[derive(Debug, Clone)]
pub struct LevenshteinMatcher {
    target: String,
    target_chars: Vec<char>,
}

impl LevenshteinMatcher {
    /// Create a new matcher for the given target word.
    pub fn new<S: Into<String>>(target: S) -> Self {
        let target = target.into();
        let target_chars = target.chars().collect();
        LevenshteinMatcher {
            target,
            target_chars,
        }
    }

    /// The target word.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Target length in chars.
    pub fn len(&self) -> usize {
        self.target_chars.len()
    }

    /// Whether the target is the empty string.
    pub fn is_empty(&self) -> bool {
        self.target_chars.is_empty()
    }

    /// Calculate the full distance to a candidate.
    pub fn distance(&self, candidate: &str) -> usize {
        let candidate_chars: Vec<char> = candidate.chars().collect();
        distance_chars(&self.target_chars, &candidate_chars, usize::MAX).unwrap_or(usize::MAX)
    }

    /// Calculate the distance to a candidate, giving up once it exceeds `threshold`.
    pub fn distance_threshold(&self, candidate: &str, threshold: usize) -> Option<usize> {
        // Cheap length check before decoding the candidate
        let candidate_len = candidate.chars().count();
        if self.target_chars.len().abs_diff(candidate_len) > threshold {
            return None;
        }
        let candidate_chars: Vec<char> = candidate.chars().collect();
        distance_chars(&self.target_chars, &candidate_chars, threshold)
    }
}
