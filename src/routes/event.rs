//! Event API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{Event, EventInput};
use crate::state::AppState;

/// Create the event router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events", post(create_event))
        .route("/api/events/{id}", get(get_event))
        .route("/api/events/{id}", put(update_event))
        .route("/api/events/{id}", patch(update_event))
        .route("/api/events/{id}", delete(delete_event))
}

async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let events = Event::list(state.db()).await?;
    Ok(Json(events))
}

async fn get_event(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Event>> {
    let event = Event::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = Event::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<EventInput>,
) -> AppResult<Json<Event>> {
    let event = Event::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if Event::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
