//! Profanity denylist — best-effort query screening.
//!
//! The word list is fetched once at startup from a configured URL of
//! newline-separated plaintext words. Loading fails soft: any failure
//! (absent URL, transport error, non-2xx) degrades to an empty set with a
//! warning, since profanity filtering is best-effort, not safety-critical.
//!
//! Matching is whole-word over whitespace tokens only — punctuation-adjacent
//! profanity ("word!") evades detection. Known limitation, kept as-is.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{info, warn};

/// Process-wide denylist, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    words: HashSet<String>,
}

impl Denylist {
    /// Fetch and parse the denylist. Never fails — degrades to empty.
    pub async fn load(source_url: Option<&str>) -> Self {
        let Some(url) = source_url else {
            warn!("no denylist source configured — profanity filter is inactive");
            return Self::default();
        };

        let fetched = fetch_words(url).await;
        match fetched {
            Ok(text) => {
                let list = Self::from_text(&text);
                info!(words = list.len(), "denylist loaded");
                list
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to load denylist — continuing with empty set");
                Self::default()
            }
        }
    }

    /// Parse a newline-separated word list.
    ///
    /// "crime"/"crimes" are dropped: they appear in common word lists but
    /// are legitimate book-search vocabulary.
    pub fn from_text(text: &str) -> Self {
        let words = text
            .lines()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .filter(|w| w != "crime" && w != "crimes")
            .collect();
        Self { words }
    }

    /// Build from explicit words (tests).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whole-word, case-insensitive membership test over whitespace tokens.
    pub fn contains(&self, query: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        query
            .to_lowercase()
            .split_whitespace()
            .any(|token| self.words.contains(token))
    }
}

async fn fetch_words(url: &str) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| e.to_string())?;
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let response = response.error_for_status().map_err(|e| e.to_string())?;
    response.text().await.map_err(|e| e.to_string())
}
