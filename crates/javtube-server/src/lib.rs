//! javtube HTTP facade
//!
//! Exposes the scraper to the desktop UI as a handful of JSON endpoints.
//! Handlers validate input and dispatch; fetching and parsing live in
//! `javtube-core`.
//!
//! | route | response |
//! |-------|----------|
//! | `GET /api/videos?page=&sort=&q=` | `[VideoSummary]` |
//! | `GET /api/actresses?page=` | `[ActressSummary]` |
//! | `GET /api/actress-videos?id=&page=` | `{videos, actress}` |
//! | `POST /api/video-url` `{videoId}` | `{videoUrl}` or 404 |
//! | `GET /api/archive-videos?user=&service=` | `[ArchiveVideo]` |

pub mod config;

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use javtube_core::{
    ActressSummary, ActressVideos, ArchiveVideo, JavtubeError, JavtubeScraper, SortMode,
    VideoSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    scraper: Arc<JavtubeScraper>,
}

impl AppState {
    pub fn new(scraper: JavtubeScraper) -> Self {
        Self {
            scraper: Arc::new(scraper),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<JavtubeError> for ApiError {
    fn from(err: JavtubeError) -> Self {
        if err.is_client_error() {
            ApiError::bad_request(err.to_string())
        } else if err.is_not_found() {
            ApiError::not_found(err.to_string())
        } else {
            error!(error = %err, "request failed");
            ApiError::internal(err.to_string())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Builds the facade router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/actresses", get(list_actresses))
        .route("/api/actress-videos", get(actress_videos))
        .route("/api/video-url", post(video_url))
        .route("/api/archive-videos", get(archive_videos))
        .route("/health", get(health))
        .fallback(fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unmatched routes get a bare 404
///
/// `OPTIONS` never reaches this: the CORS layer answers every preflight
/// with 200 and the allow headers.
async fn fallback() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        "Not found",
    )
        .into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "handler panicked");
    ApiError::internal("Internal server error").into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct VideosParams {
    page: Option<u32>,
    sort: Option<String>,
    q: Option<String>,
}

async fn list_videos(
    State(state): State<AppState>,
    params: Result<Query<VideosParams>, QueryRejection>,
) -> ApiResult<Json<Vec<VideoSummary>>> {
    let Query(params) = params?;
    let mode = SortMode::from_params(params.sort.as_deref().unwrap_or("main"), params.q.as_deref())?;
    let videos = state
        .scraper
        .list_videos(params.page.unwrap_or(1), &mode)
        .await?;
    Ok(Json(videos))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
}

async fn list_actresses(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ActressSummary>>> {
    let Query(params) = params?;
    let actresses = state
        .scraper
        .list_actresses(params.page.unwrap_or(1))
        .await?;
    Ok(Json(actresses))
}

#[derive(Debug, Deserialize)]
struct ActressParams {
    id: Option<String>,
    page: Option<u32>,
}

async fn actress_videos(
    State(state): State<AppState>,
    params: Result<Query<ActressParams>, QueryRejection>,
) -> ApiResult<Json<ActressVideos>> {
    let Query(params) = params?;
    let id = required(params.id, "id")?;
    let page = state
        .scraper
        .get_actress_videos(&id, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoUrlRequest {
    video_id: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoUrlResponse {
    video_url: String,
}

async fn video_url(
    State(state): State<AppState>,
    body: Result<Json<VideoUrlRequest>, JsonRejection>,
) -> ApiResult<Json<VideoUrlResponse>> {
    let video_id = match body {
        Ok(Json(request)) => request.video_id.and_then(|id| match id {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "unreadable video-url request body");
            None
        }
    };
    let video_id = required(video_id, "videoId")?;

    let video_url = state
        .scraper
        .resolve_video_url(&video_id)
        .await
        .ok_or_else(|| {
            JavtubeError::NotFound(format!("no playable URL for video {}", video_id))
        })?;
    Ok(Json(VideoUrlResponse { video_url }))
}

#[derive(Debug, Deserialize)]
struct ArchiveParams {
    user: Option<String>,
    service: Option<String>,
}

async fn archive_videos(
    State(state): State<AppState>,
    params: Result<Query<ArchiveParams>, QueryRejection>,
) -> ApiResult<Json<Vec<ArchiveVideo>>> {
    let Query(params) = params?;
    let user = required(params.user, "user")?;
    let videos = state
        .scraper
        .archive_videos(params.service.as_deref().unwrap_or_default(), &user)
        .await?;
    Ok(Json(videos))
}

/// A present, non-blank parameter or a 400
fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing required parameter: {}", name)))
}
