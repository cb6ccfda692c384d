use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use lookback_core::{SearchConfig, SearchSystem};
use lookback_server::posts::{corpus, load_posts};
use lookback_server::{build_app, MISSING_KEYWORD};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

const POSTS: &str = r#"[
  {"type": "question", "id": 100, "questionId": 100, "title": "Quick fox question",
   "htmlBody": "<p>How fast is the quick fox?</p>", "tags": ["animals", "speed"]},
  {"type": "answer", "id": 101, "questionId": 100, "htmlBody": "<p>The lazy dog is slower.</p>"},
  {"type": "answer", "id": 102, "questionId": 100, "htmlBody": "<p>A fox, a fox, a quick brown fox.</p>"}
]"#;

fn build_tiny_app() -> Router {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.json");
    fs::write(&path, POSTS).unwrap();
    let posts = load_posts(&path).unwrap();
    let search = SearchSystem::build(corpus(posts), SearchConfig::default()).unwrap();
    build_app(Arc::new(search))
}

async fn call(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, body) = call(build_tiny_app(), "/?keyword=fox").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    // the answer mentions "fox" three times
    assert_eq!(arr[0]["id"], "102");
    assert_eq!(arr[0]["question_id"], "100");
    assert_eq!(arr[0]["type"], "answer");
    assert!(arr[0].get("title").is_none());
    assert_eq!(arr[1]["id"], "100");
    assert_eq!(arr[1]["type"], "question");
    assert_eq!(arr[1]["title"], "Quick fox question");
    assert_eq!(arr[1]["tags"][1], "speed");
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
}

#[tokio::test]
async fn any_path_and_parameter_case_are_accepted() {
    let (status, body) = call(build_tiny_app(), "/search?KEYWORD=lazy").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["id"], "101");

    let (status, body) = call(build_tiny_app(), "/anything?keyword=*").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn last_keyword_parameter_wins() {
    let (status, body) = call(build_tiny_app(), "/?keyword=zebra&KEYWORD=lazy").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["id"], "101");

    let (_, body) = call(build_tiny_app(), "/?Keyword=lazy&keyword=zebra").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn missing_or_empty_keyword_is_rejected() {
    for uri in ["/", "/?other=1", "/?keyword=", "/?keyword=%20"] {
        let (status, body) = call(build_tiny_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, MISSING_KEYWORD);
    }
}

#[tokio::test]
async fn malformed_query_is_a_client_error() {
    let (status, body) = call(build_tiny_app(), "/?keyword=%22quick%20fox").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("unbalanced quote"));
}

#[tokio::test]
async fn no_match_is_an_empty_array() {
    let (status, body) = call(build_tiny_app(), "/?keyword=zebra").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn health() {
    let (status, body) = call(build_tiny_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
