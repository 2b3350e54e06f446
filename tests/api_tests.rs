use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use image2story::config::ModelSelection;
use image2story::gateway::{seeded_rng_source, StoryGateway};
use image2story::llm::{ChatRequest, DisabledClient, LlmClient, LlmError};
use image2story::server::{create_router, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug)]
struct EchoLlm {
    reply: &'static str,
    seen: Arc<Mutex<Vec<ChatRequest>>>,
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.reply.to_string())
    }
}

fn offline_app() -> Router {
    let gateway = StoryGateway::new(
        Box::new(DisabledClient::new("offline test")),
        ModelSelection::default(),
    )
    .with_rng_source(seeded_rng_source(3));
    create_router(AppState::new(gateway))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
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
async fn health_reports_endpoints() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "Story generation server is running");
    assert_eq!(
        body["endpoints"],
        json!(["/generate-story-chapter", "/generate-story-title"])
    );
}

#[tokio::test]
async fn chapter_without_genre_defaults_to_fantasy() {
    let request = post_json(
        "/generate-story-chapter",
        json!({
            "prompt": "Test story prompt about a brave hero",
            "image_url": "https://via.placeholder.com/400x300.png?text=Test+Image",
            "characters": [{"name": "TestHero", "role": "protagonist"}],
            "max_tokens": 200
        }),
    );
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["chapter_index"], 0);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["message"], "Generated Fantasy chapter 1 with Epic mood");

    let text = body["story_text"].as_str().unwrap();
    assert!(text.contains("TestHero"));
    assert!(text.contains("epic atmosphere"));
}

#[tokio::test]
async fn empty_body_object_uses_all_defaults() {
    let (status, body) = send(offline_app(), post_json("/generate-story-chapter", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    let text = body["story_text"].as_str().unwrap();
    assert!(text.contains("the protagonist"));
    assert!(!text.contains("None"));
}

#[tokio::test]
async fn late_chapter_reports_its_number() {
    let request = post_json(
        "/generate-story-chapter",
        json!({"chapter_index": 7, "genre": "Sci-Fi", "mood": "Tense"}),
    );
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chapter_index"], 7);
    assert_eq!(body["message"], "Generated Sci-Fi chapter 8 with Tense mood");
    assert!(body["story_text"]
        .as_str()
        .unwrap()
        .starts_with("Chapter 8 continued the tense tale"));
}

#[tokio::test]
async fn mystery_title_contains_mood() {
    let request = post_json(
        "/generate-story-title",
        json!({"prompt": "a locked room", "genre": "Mystery", "mood": "Dark"}),
    );
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Generated Mystery title with Dark mood");
    let title = body["title"].as_str().unwrap();
    assert!(title.contains("Dark"), "title: {}", title);
    assert!(!title.starts_with('"'));
}

#[tokio::test]
async fn malformed_json_is_a_server_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/generate-story-chapter")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_field_type_is_a_server_error() {
    let request = post_json("/generate-story-title", json!({"genre": 42}));
    let (status, body) = send(offline_app(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn app_keeps_serving_after_a_bad_request() {
    let app = offline_app();
    let bad = post_json("/generate-story-chapter", json!({"chapter_index": "one"}));
    let (status, _) = send(app.clone(), bad).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(app, post_json("/generate-story-chapter", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn model_output_is_returned_when_available() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let llm = EchoLlm {
        reply: "'Salt and Static'",
        seen: seen.clone(),
    };
    let app = create_router(AppState::new(StoryGateway::new(
        Box::new(llm),
        ModelSelection::default(),
    )));

    let request = post_json("/generate-story-title", json!({"genre": "Horror", "mood": "Bleak"}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Salt and Static");
    assert_eq!(body["source"], "model");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/generate-story-chapter")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");

    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "allow-methods: {}", methods);
    }
    assert!(headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .contains("content-type"));
}

#[tokio::test]
async fn cross_origin_request_gets_cors_header() {
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
