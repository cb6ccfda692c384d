use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lookback_core::{SearchError, SearchSystem};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod posts;

use posts::Post;

pub const MISSING_KEYWORD: &str = "The 'keyword' query parameter is required. Please supply it.";

#[derive(Serialize)]
pub struct SearchHit {
    pub id: String,
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub html_body: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SearchHit {
    fn new(post: &Post, score: f32) -> Self {
        let (title, tags) = match post {
            Post::Question { title, tags, .. } => (Some(title.clone()), Some(tags.clone())),
            Post::Answer { .. } => (None, None),
        };
        Self {
            id: post.id().to_string(),
            question_id: post.question_id().to_string(),
            kind: post.kind(),
            html_body: post.html_body().to_string(),
            score,
            title,
            tags,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchSystem<Post>>,
}

pub fn build_app(search: Arc<SearchSystem<Post>>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .fallback(search_handler)
        .with_state(AppState { search })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Parameter names are matched case-insensitively; the last occurrence wins.
fn keyword(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .rev()
        .find(|(name, _)| name.eq_ignore_ascii_case("keyword"))
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>) -> Response {
    let Some(keyword) = keyword(params) else {
        return (StatusCode::BAD_REQUEST, MISSING_KEYWORD).into_response();
    };

    match state.search.search(&keyword) {
        Ok(results) => {
            let hits: Vec<SearchHit> = results.iter().map(|r| SearchHit::new(r.entity, r.score)).collect();
            Json(hits).into_response()
        }
        Err(err @ SearchError::MalformedQuery { .. }) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        Err(err @ SearchError::InternalConsistency(_)) => {
            tracing::error!(error = %err, keyword, "search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal search error").into_response()
        }
    }
}
