//! News article API routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::{AppError, AppResult};
use crate::models::{News, NewsInput};
use crate::state::AppState;

/// Create the news router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/news", get(list_news))
        .route("/api/news", post(create_news))
        .route("/api/news/featured", get(featured_news))
        .route("/api/news/{id}", get(get_news))
        .route("/api/news/{id}", put(update_news))
        .route("/api/news/{id}", patch(update_news))
        .route("/api/news/{id}", delete(delete_news))
}

async fn list_news(State(state): State<AppState>) -> AppResult<Json<Vec<News>>> {
    let news = News::list(state.db()).await?;
    Ok(Json(news))
}

/// Up to five articles flagged for the homepage.
async fn featured_news(State(state): State<AppState>) -> AppResult<Json<Vec<News>>> {
    let news = News::list_featured(state.db()).await?;
    Ok(Json(news))
}

async fn get_news(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<News>> {
    let news = News::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(news))
}

async fn create_news(
    State(state): State<AppState>,
    Json(input): Json<NewsInput>,
) -> AppResult<(StatusCode, Json<News>)> {
    let news = News::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<NewsInput>,
) -> AppResult<Json<News>> {
    let news = News::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(news))
}

async fn delete_news(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if News::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
