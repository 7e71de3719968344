//! Site statistic API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{Stat, StatInput};
use crate::state::AppState;

/// Create the stat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(list_stats))
        .route("/api/stats", post(create_stat))
        .route("/api/stats/{id}", get(get_stat))
        .route("/api/stats/{id}", put(update_stat))
        .route("/api/stats/{id}", patch(update_stat))
        .route("/api/stats/{id}", delete(delete_stat))
}

async fn list_stats(State(state): State<AppState>) -> AppResult<Json<Vec<Stat>>> {
    let stats = Stat::list(state.db()).await?;
    Ok(Json(stats))
}

async fn get_stat(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Stat>> {
    let stat = Stat::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(stat))
}

async fn create_stat(
    State(state): State<AppState>,
    Json(input): Json<StatInput>,
) -> AppResult<(StatusCode, Json<Stat>)> {
    let stat = Stat::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(stat)))
}

async fn update_stat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<StatInput>,
) -> AppResult<Json<Stat>> {
    let stat = Stat::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(stat))
}

async fn delete_stat(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if Stat::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
