//! Response data shapes and the model-output parser.
//!
//! [`SearchResponse`] is the unit stored in the cache and returned to the
//! caller. [`parse_model_response`] validates the synthesis model's raw text
//! against that shape strictly — all three fields must be present — and
//! reports a mismatch as `None` so callers can tell a real synthesis from
//! the [`degraded_response`] fallback they substitute. The fixed pipeline
//! must not cache the fallback; only genuine syntheses are worth keeping.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One recommended book inside a [`SearchResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookItem {
    pub title: String,
    pub author: String,
    pub description: String,
}

/// Structured, user-facing recommendation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub greeting: String,
    pub books: Vec<BookItem>,
    pub conclusion: String,
}

/// Uniform record shape produced by the bibliography client.
///
/// Multi-valued source fields arrive pre-joined with `", "`; any field the
/// source omitted carries the `"n/a"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub published_year: String,
    pub subject: String,
}

/// The fixed fallback returned whenever model output does not parse.
pub fn degraded_response() -> SearchResponse {
    SearchResponse {
        greeting: "Sorry, there was an error processing the response.".to_string(),
        books: Vec::new(),
        conclusion: String::new(),
    }
}

/// Parse raw synthesis output into a [`SearchResponse`].
///
/// Tolerates a markdown code fence around the JSON (models emit one despite
/// the JSON-only instruction). Anything else malformed yields `None`;
/// callers decide whether to substitute [`degraded_response`].
pub fn parse_model_response(raw: &str) -> Option<SearchResponse> {
    let cleaned = strip_code_fence(raw.trim());
    match serde_json::from_str::<SearchResponse>(cleaned) {
        Ok(response) => Some(response),
        Err(e) => {
            warn!(error = %e, raw_len = raw.len(), "model output failed validation");
            None
        }
    }
}

/// Remove a surrounding ``` / ```json fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // Drop the fence's language tag line, then the closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "greeting": "Hello! Here are some picks:",
        "books": [
            {"title": "Dune", "author": "Frank Herbert", "description": "Desert-planet politics."}
        ],
        "conclusion": "Want more like this?"
    }"#;

    #[test]
    fn valid_json_parses() {
        let resp = parse_model_response(VALID).unwrap();
        assert_eq!(resp.books.len(), 1);
        assert_eq!(resp.books[0].title, "Dune");
        assert_eq!(resp.conclusion, "Want more like this?");
    }

    #[test]
    fn fenced_json_parses() {
        let fenced = format!("```json\n{VALID}\n```");
        let resp = parse_model_response(&fenced).unwrap();
        assert_eq!(resp.books.len(), 1);

        let bare_fence = format!("```\n{VALID}\n```");
        assert_eq!(parse_model_response(&bare_fence).unwrap().books.len(), 1);
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(parse_model_response("Here are some books I like: Dune, ...").is_none());
    }

    #[test]
    fn truncated_json_is_rejected() {
        assert!(parse_model_response(r#"{"greeting": "Hi", "books": [{"title": "Du"#).is_none());
    }

    #[test]
    fn missing_books_field_is_rejected() {
        // Absence of the field set is a parse failure, not a valid empty state.
        assert!(parse_model_response(r#"{"greeting": "Hi", "conclusion": "Bye"}"#).is_none());
    }

    #[test]
    fn explicit_empty_books_is_valid() {
        let resp = parse_model_response(r#"{"greeting": "Hi", "books": [], "conclusion": "Sorry!"}"#)
            .unwrap();
        assert!(resp.books.is_empty());
        assert_eq!(resp.greeting, "Hi");
    }

    #[test]
    fn degraded_fallback_shape_is_fixed() {
        let resp = degraded_response();
        assert_eq!(
            resp.greeting,
            "Sorry, there was an error processing the response."
        );
        assert!(resp.books.is_empty());
        assert_eq!(resp.conclusion, "");
    }
}
