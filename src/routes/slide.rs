//! Hero slide API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{HeroSlide, HeroSlideInput};
use crate::state::AppState;

/// Create the hero slide router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/slides", get(list_slides))
        .route("/api/slides", post(create_slide))
        .route("/api/slides/{id}", get(get_slide))
        .route("/api/slides/{id}", put(update_slide))
        .route("/api/slides/{id}", patch(update_slide))
        .route("/api/slides/{id}", delete(delete_slide))
}

async fn list_slides(State(state): State<AppState>) -> AppResult<Json<Vec<HeroSlide>>> {
    let slides = HeroSlide::list(state.db()).await?;
    Ok(Json(slides))
}

async fn get_slide(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<HeroSlide>> {
    let slide = HeroSlide::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(slide))
}

async fn create_slide(
    State(state): State<AppState>,
    Json(input): Json<HeroSlideInput>,
) -> AppResult<(StatusCode, Json<HeroSlide>)> {
    let slide = HeroSlide::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(slide)))
}

async fn update_slide(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<HeroSlideInput>,
) -> AppResult<Json<HeroSlide>> {
    let slide = HeroSlide::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(slide))
}

async fn delete_slide(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if HeroSlide::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
