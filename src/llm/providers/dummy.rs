//! Dummy LLM provider — scripted replies for tests, echo otherwise.
//!
//! With no script loaded it echoes input back prefixed with `[echo]`, which
//! exercises the full pipeline without a real API key. Tests push queued
//! replies and later assert exact call counts; clones share the same script
//! and counters so a handle kept by the test observes calls made through
//! the service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::llm::{Completion, ProviderError, ToolOutcome, ToolSpec};

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    tool_replies: Arc<Mutex<VecDeque<ToolOutcome>>>,
    completions: Arc<AtomicU64>,
    tool_completions: Arc<AtomicU64>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue plain-completion replies, consumed in order.
    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replies
            .lock()
            .expect("dummy reply queue poisoned")
            .extend(replies.into_iter().map(Into::into));
        self
    }

    /// Queue tool-completion outcomes, consumed in order.
    pub fn with_tool_replies<I>(self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = ToolOutcome>,
    {
        self.tool_replies
            .lock()
            .expect("dummy tool queue poisoned")
            .extend(outcomes);
        self
    }

    /// Number of plain completions served so far.
    pub fn completions(&self) -> u64 {
        self.completions.load(Ordering::Relaxed)
    }

    /// Number of tool-enabled completions served so far.
    pub fn tool_completions(&self) -> u64 {
        self.tool_completions.load(Ordering::Relaxed)
    }

    pub async fn complete(&self, request: &Completion<'_>) -> Result<String, ProviderError> {
        self.completions.fetch_add(1, Ordering::Relaxed);
        let scripted = self
            .replies
            .lock()
            .expect("dummy reply queue poisoned")
            .pop_front();
        Ok(scripted.unwrap_or_else(|| format!("[echo] {}", request.user)))
    }

    pub async fn complete_with_tools(
        &self,
        request: &Completion<'_>,
        _tools: &[ToolSpec],
    ) -> Result<ToolOutcome, ProviderError> {
        self.tool_completions.fetch_add(1, Ordering::Relaxed);
        let scripted = self
            .tool_replies
            .lock()
            .expect("dummy tool queue poisoned")
            .pop_front();
        Ok(scripted.unwrap_or_else(|| ToolOutcome::Text(format!("[echo] {}", request.user))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelTier;

    fn request(user: &str) -> Completion<'_> {
        Completion {
            system: None,
            user,
            temperature: 0.0,
            max_tokens: None,
            tier: ModelTier::Extract,
        }
    }

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider::new();
        assert_eq!(p.complete(&request("hello")).await.unwrap(), "[echo] hello");
        assert_eq!(p.completions(), 1);
    }

    #[tokio::test]
    async fn scripted_replies_consumed_in_order() {
        let p = DummyProvider::new().with_replies(["first", "second"]);
        assert_eq!(p.complete(&request("a")).await.unwrap(), "first");
        assert_eq!(p.complete(&request("b")).await.unwrap(), "second");
        // Queue exhausted — falls back to echo.
        assert_eq!(p.complete(&request("c")).await.unwrap(), "[echo] c");
        assert_eq!(p.completions(), 3);
    }

    #[tokio::test]
    async fn clones_share_script_and_counters() {
        let p = DummyProvider::new().with_replies(["only"]);
        let clone = p.clone();
        assert_eq!(clone.complete(&request("x")).await.unwrap(), "only");
        assert_eq!(p.completions(), 1);
    }

    #[tokio::test]
    async fn scripted_tool_call() {
        let p = DummyProvider::new().with_tool_replies([ToolOutcome::ToolCall {
            name: "search_open_library".into(),
            arguments: r#"{"search_terms": "dune"}"#.into(),
        }]);
        let outcome = p.complete_with_tools(&request("q"), &[]).await.unwrap();
        assert!(matches!(outcome, ToolOutcome::ToolCall { ref name, .. } if name == "search_open_library"));
        assert_eq!(p.tool_completions(), 1);
    }
}
