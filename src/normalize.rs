//! Cache-key normalization.
//!
//! The cache is word-set addressed, not string addressed: two queries whose
//! extracted terms contain the same words (ignoring order, case, and
//! duplicates) must map to the same key.

use std::collections::BTreeSet;

/// Derive the cache key for a search-term string.
///
/// Splits on whitespace, lowercases each token, deduplicates, sorts
/// ascending, and joins with `-`. Pure; empty input yields an empty key.
pub fn normalize(terms: &str) -> String {
    let words: BTreeSet<String> = terms
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    words.into_iter().collect::<Vec<_>>().join("-")
}
