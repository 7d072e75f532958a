//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - API under `/api/v1/...`
/// - Static quiz page from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/domains", get(http::http_get_domains))
        .route("/api/v1/quiz", get(http::http_get_quiz))
        .route("/api/v1/test-link", post(http::http_post_test_link))
        .route("/api/v1/test-link/:token", get(http::http_get_test_link))
        .route("/api/v1/authoring/export", post(http::http_post_authoring_export))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::RunnerConfig;
    use crate::domain::QuestionId;
    use crate::test_link::encode_at;

    fn app() -> Router {
        let state = AppState::build(&RunnerConfig::default(), vec![]).unwrap();
        build_router(Arc::new(state))
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn quiz_by_level() {
        let (status, body) = call(app(), get("/api/v1/quiz?domain=js&level=3")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["questions"].as_array().unwrap().iter().map(|q| q["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["8", "9", "10"]);
        assert_eq!(body["mode"]["kind"], "level");
    }

    #[tokio::test]
    async fn unknown_domain_is_404() {
        let (status, body) = call(app(), get("/api/v1/quiz?domain=chemistry")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown_domain");
    }

    #[tokio::test]
    async fn issue_then_open_test_link() {
        let app = app();
        let (status, link) = call(
            app.clone(),
            post_json("/api/v1/test-link", serde_json::json!({"domain": "js", "ids": "7, 3, 9", "expireMinutes": "5"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = link["token"].as_str().unwrap().to_string();
        assert_eq!(link["params"]["test"], token.as_str());
        assert_eq!(link["params"]["type"], "theoretical");

        let (status, view) = call(app.clone(), get(&format!("/api/v1/quiz?test={token}"))).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = view["questions"].as_array().unwrap().iter().map(|q| q["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["7", "3", "9"]);
        assert_eq!(view["mode"]["kind"], "public_test");

        let (status, info) = call(app, get(&format!("/api/v1/test-link/{token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["expired"], false);
        assert_eq!(info["token"]["orderedIds"], serde_json::json!(["7", "3", "9"]));
    }

    #[tokio::test]
    async fn bad_links_map_to_distinct_errors() {
        let (status, body) = call(app(), get("/api/v1/quiz?test=garbage!")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed_token");

        let (status, body) = call(
            app(),
            post_json("/api/v1/test-link", serde_json::json!({"domain": "js", "ids": ["7", "999"]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "unknown_question_id");
    }

    #[tokio::test]
    async fn expired_link_is_gone_not_malformed() {
        let issued = Utc::now() - Duration::minutes(10);
        let token = encode_at("js", "theoretical", &[QuestionId::from("1")], 1, issued).unwrap();
        let (status, body) = call(app(), get(&format!("/api/v1/quiz?test={token}"))).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["error"], "expired_token");
    }

    #[tokio::test]
    async fn empty_id_list_is_an_invalid_link() {
        let (status, body) = call(
            app(),
            post_json("/api/v1/test-link", serde_json::json!({"domain": "js", "ids": " , "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_link");
    }

    #[tokio::test]
    async fn health_and_domains() {
        let (status, body) = call(app(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        let (_, body) = call(app(), get("/api/v1/domains")).await;
        let domains: Vec<&str> = body.as_array().unwrap().iter().map(|d| d["domain"].as_str().unwrap()).collect();
        assert_eq!(domains, vec!["bible", "js", "js-homework", "math"]);
    }
}
