//! HTTP surface: two generation endpoints and a health check.

use crate::gateway::StoryGateway;
use crate::story::{ChapterRequest, TitleRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, error};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub const CHAPTER_PATH: &str = "/generate-story-chapter";
pub const TITLE_PATH: &str = "/generate-story-title";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: Arc<StoryGateway>,
}

impl AppState {
    pub fn new(gateway: StoryGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// Request-level failure, rendered as `{"error": ..., "success": false}`.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::internal(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "success": false,
        }));
        (self.status_code, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Debug)]
pub struct ChapterResponse {
    pub story_text: String,
    pub chapter_index: u32,
    pub success: bool,
    pub message: String,
    pub source: &'static str,
}

#[derive(Serialize, Debug)]
pub struct TitleResponse {
    pub title: String,
    pub success: bool,
    pub message: String,
    pub source: &'static str,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(CHAPTER_PATH, post(generate_story_chapter))
        .route(TITLE_PATH, post(generate_story_title))
        .route(HEALTH_PATH, get(health_check))
        .layer(cors)
        .with_state(state)
}

async fn generate_story_chapter(
    State(state): State<AppState>,
    payload: Result<Json<ChapterRequest>, JsonRejection>,
) -> ApiResult<Json<ChapterResponse>> {
    let Json(req) = payload.map_err(|e| {
        error!("Error generating story chapter: {}", e.body_text());
        ApiError::from(e)
    })?;
    debug!(
        "Generating chapter {} for {} story...",
        req.chapter_index, req.genre
    );

    let generation = state.gateway.generate_chapter(&req).await;
    let source = generation.source();

    Ok(Json(ChapterResponse {
        story_text: generation.into_text(),
        chapter_index: req.chapter_index,
        success: true,
        message: format!(
            "Generated {} chapter {} with {} mood",
            req.genre,
            u64::from(req.chapter_index) + 1,
            req.mood
        ),
        source,
    }))
}

async fn generate_story_title(
    State(state): State<AppState>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult<Json<TitleResponse>> {
    let Json(req) = payload.map_err(|e| {
        error!("Error generating story title: {}", e.body_text());
        ApiError::from(e)
    })?;
    debug!("Generating {} title with {} mood...", req.genre, req.mood);

    let generation = state.gateway.generate_title(&req).await;
    let source = generation.source();

    Ok(Json(TitleResponse {
        title: generation.into_text(),
        success: true,
        message: format!("Generated {} title with {} mood", req.genre, req.mood),
        source,
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "Story generation server is running",
        "endpoints": [CHAPTER_PATH, TITLE_PATH],
    }))
}
