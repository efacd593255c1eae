//! Router tests — status-code mapping and response shapes via `oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use bookscout::bibliography::{BibliographyClient, FixedBibliography};
use bookscout::cache::ResponseCache;
use bookscout::llm::providers::dummy::DummyProvider;
use bookscout::llm::{LlmProvider, ToolOutcome};
use bookscout::pipeline::{PipelineOptions, SearchService};
use bookscout::profanity::Denylist;
use bookscout::response::{BookRecord, SearchResponse};
use bookscout::server::{GatewayState, build_router};

fn record(title: &str) -> BookRecord {
    BookRecord {
        title: title.to_string(),
        author: "n/a".to_string(),
        published_year: "n/a".to_string(),
        subject: "n/a".to_string(),
    }
}

fn router_with(
    provider: LlmProvider,
    bibliography: FixedBibliography,
    denylist: Denylist,
) -> Router {
    let service = Arc::new(SearchService::new(
        provider,
        BibliographyClient::Fixed(bibliography),
        Arc::new(ResponseCache::memory()),
        denylist,
        PipelineOptions::default(),
    ));
    build_router(GatewayState {
        service,
        service_name: Arc::from("bookscout-test"),
    })
}

fn post_json(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const SYNTHESIS: &str = r#"{"greeting": "Hello!", "books": [{"title": "Dune", "author": "Frank Herbert", "description": "A match."}], "conclusion": "More?"}"#;

#[tokio::test]
async fn root_returns_banner() {
    let router = router_with(
        LlmProvider::Dummy(DummyProvider::new()),
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "This is a book search API service");
}

#[tokio::test]
async fn health_reports_provider_and_cache() {
    let router = router_with(
        LlmProvider::Dummy(DummyProvider::new()),
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["llm_provider"], "dummy");
    assert_eq!(json["cache"]["hits"], 0);
}

#[tokio::test]
async fn sample_returns_canned_structured_response() {
    let router = router_with(
        LlmProvider::Dummy(DummyProvider::new()),
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/sample", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: SearchResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed.books.len(), 2);
    assert_eq!(parsed.books[0].title, "The Great Gatsby");
}

#[tokio::test]
async fn search_books_happy_path_returns_200() {
    let dummy = DummyProvider::new().with_replies(["dune frank herbert", SYNTHESIS]);
    let router = router_with(
        LlmProvider::Dummy(dummy),
        FixedBibliography::new(vec![record("Dune")]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/search-books", r#"{"query": "books like dune"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["books"][0]["title"], "Dune");
    assert_eq!(json["conclusion"], "More?");
}

#[tokio::test]
async fn search_books_profanity_returns_400() {
    let router = router_with(
        LlmProvider::Dummy(DummyProvider::new()),
        FixedBibliography::new(vec![]),
        Denylist::from_words(["badword"]),
    );
    let response = router
        .oneshot(post_json("/search-books", r#"{"query": "badword"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "profanity");
}

#[tokio::test]
async fn search_books_no_matches_returns_404() {
    let dummy = DummyProvider::new().with_replies(["unfindable"]);
    let router = router_with(
        LlmProvider::Dummy(dummy),
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/search-books", r#"{"query": "something unfindable"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_books_upstream_failure_returns_500() {
    let dummy = DummyProvider::new().with_replies(["dune"]);
    let router = router_with(
        LlmProvider::Dummy(dummy),
        FixedBibliography::failing(),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/search-books", r#"{"query": "dune"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "internal");
}

#[tokio::test]
async fn tools_path_structured_response() {
    let dummy = DummyProvider::new()
        .with_tool_replies([ToolOutcome::ToolCall {
            name: "search_open_library".into(),
            arguments: r#"{"search_terms": "dune"}"#.into(),
        }])
        .with_replies([SYNTHESIS]);
    let router = router_with(
        LlmProvider::Dummy(dummy),
        FixedBibliography::new(vec![record("Dune")]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/searchs/tools", r#"{"query": "books like dune"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["books"][0]["title"], "Dune");
}

#[tokio::test]
async fn tools_path_raw_text_is_bare_array() {
    let dummy =
        DummyProvider::new().with_tool_replies([ToolOutcome::Text("Try the classics.".into())]);
    let router = router_with(
        LlmProvider::Dummy(dummy),
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/searchs/tools", r#"{"query": "any books?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    // Distinguishable by shape from the structured path.
    assert!(json.is_array());
    assert_eq!(json[0], "Try the classics.");
}

#[tokio::test]
async fn tools_path_disabled_provider_returns_503() {
    let router = router_with(
        LlmProvider::Disabled,
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/searchs/tools", r#"{"query": "dune"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn fixed_path_disabled_provider_returns_500() {
    // The fixed pipeline keeps its own semantics: no 503 here.
    let router = router_with(
        LlmProvider::Disabled,
        FixedBibliography::new(vec![]),
        Denylist::default(),
    );
    let response = router
        .oneshot(post_json("/search-books", r#"{"query": "dune"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
