//! Notice board API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{Notice, NoticeInput};
use crate::state::AppState;

/// Create the notice router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notices", get(list_notices))
        .route("/api/notices", post(create_notice))
        .route("/api/notices/{id}", get(get_notice))
        .route("/api/notices/{id}", put(update_notice))
        .route("/api/notices/{id}", patch(update_notice))
        .route("/api/notices/{id}", delete(delete_notice))
}

async fn list_notices(State(state): State<AppState>) -> AppResult<Json<Vec<Notice>>> {
    let notices = Notice::list(state.db()).await?;
    Ok(Json(notices))
}

async fn get_notice(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Notice>> {
    let notice = Notice::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(notice))
}

async fn create_notice(
    State(state): State<AppState>,
    Json(input): Json<NoticeInput>,
) -> AppResult<(StatusCode, Json<Notice>)> {
    let notice = Notice::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

async fn update_notice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<NoticeInput>,
) -> AppResult<Json<Notice>> {
    let notice = Notice::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(notice))
}

async fn delete_notice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if Notice::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
