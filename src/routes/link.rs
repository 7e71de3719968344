//! External link API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{ExternalLink, ExternalLinkInput};
use crate::state::AppState;

/// Create the external link router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/links", get(list_links))
        .route("/api/links", post(create_link))
        .route("/api/links/{id}", get(get_link))
        .route("/api/links/{id}", put(update_link))
        .route("/api/links/{id}", patch(update_link))
        .route("/api/links/{id}", delete(delete_link))
}

async fn list_links(State(state): State<AppState>) -> AppResult<Json<Vec<ExternalLink>>> {
    let links = ExternalLink::list(state.db()).await?;
    Ok(Json(links))
}

async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ExternalLink>> {
    let link = ExternalLink::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(link))
}

async fn create_link(
    State(state): State<AppState>,
    Json(input): Json<ExternalLinkInput>,
) -> AppResult<(StatusCode, Json<ExternalLink>)> {
    let link = ExternalLink::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn update_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ExternalLinkInput>,
) -> AppResult<Json<ExternalLink>> {
    let link = ExternalLink::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(link))
}

async fn delete_link(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if ExternalLink::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
