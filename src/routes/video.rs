//! Video API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Video, VideoInput};
use crate::state::AppState;

/// Create the video router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/videos", post(create_video))
        .route("/api/videos/{id}", get(get_video))
        .route("/api/videos/{id}", put(update_video))
        .route("/api/videos/{id}", patch(update_video))
        .route("/api/videos/{id}", delete(delete_video))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

/// Video row plus the resolved playback location.
#[derive(Debug, Serialize)]
struct VideoResponse {
    id: i64,
    title: String,
    title_si: String,
    url: String,
    file: Option<String>,
    description: String,
    description_si: String,
    published_at: DateTime<Utc>,
    thumbnail: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    playback_url: String,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        let playback_url = video.playback_url().to_string();
        Self {
            id: video.id,
            title: video.title,
            title_si: video.title_si,
            url: video.url,
            file: video.file,
            description: video.description,
            description_si: video.description_si,
            published_at: video.published_at,
            thumbnail: video.thumbnail,
            created_at: video.created_at,
            updated_at: video.updated_at,
            playback_url,
        }
    }
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_videos(State(state): State<AppState>) -> AppResult<Json<Vec<VideoResponse>>> {
    let videos = Video::list(state.db()).await?;
    Ok(Json(videos.into_iter().map(VideoResponse::from).collect()))
}

async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<VideoResponse>> {
    let video = Video::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(video.into()))
}

async fn create_video(
    State(state): State<AppState>,
    Json(input): Json<VideoInput>,
) -> AppResult<(StatusCode, Json<VideoResponse>)> {
    let video = Video::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(video.into())))
}

async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<VideoInput>,
) -> AppResult<Json<VideoResponse>> {
    let video = Video::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(video.into()))
}

async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if Video::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
