//! Download publication and download category API routes.
//!
//! Publications expose only active rows through the API; download
//! category responses embed their full publication list alongside a live
//! count.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{DownloadCategory, DownloadCategoryInput, Publication, PublicationInput};
use crate::state::AppState;

/// Create the publication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/publications", get(list_publications))
        .route("/api/publications", post(create_publication))
        .route("/api/publications/{id}", get(get_publication))
        .route("/api/publications/{id}", put(update_publication))
        .route("/api/publications/{id}", patch(update_publication))
        .route("/api/publications/{id}", delete(delete_publication))
        .route("/api/download-categories", get(list_categories))
        .route("/api/download-categories", post(create_category))
        .route("/api/download-categories/{id}", get(get_category))
        .route("/api/download-categories/{id}", put(update_category))
        .route("/api/download-categories/{id}", patch(update_category))
        .route("/api/download-categories/{id}", delete(delete_category))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

/// Download category with its owned publications and a live count.
#[derive(Debug, Serialize)]
struct DownloadCategoryResponse {
    id: i64,
    name: String,
    description: String,
    position: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    publications: Vec<Publication>,
    publications_count: i64,
}

async fn category_response(
    pool: &SqlitePool,
    category: DownloadCategory,
) -> AppResult<DownloadCategoryResponse> {
    let publications = Publication::list_by_category(pool, category.id).await?;
    let publications_count = DownloadCategory::publication_count(pool, category.id).await?;

    Ok(DownloadCategoryResponse {
        id: category.id,
        name: category.name,
        description: category.description,
        position: category.position,
        created_at: category.created_at,
        updated_at: category.updated_at,
        publications,
        publications_count,
    })
}

// -------------------------------------------------------------------------
// Publication handlers
// -------------------------------------------------------------------------

async fn list_publications(State(state): State<AppState>) -> AppResult<Json<Vec<Publication>>> {
    let publications = Publication::list(state.db()).await?;
    Ok(Json(publications))
}

async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Publication>> {
    let publication = Publication::find_visible_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(publication))
}

async fn create_publication(
    State(state): State<AppState>,
    Json(input): Json<PublicationInput>,
) -> AppResult<(StatusCode, Json<Publication>)> {
    let publication = Publication::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

async fn update_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PublicationInput>,
) -> AppResult<Json<Publication>> {
    let publication = Publication::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(publication))
}

async fn delete_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if Publication::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// -------------------------------------------------------------------------
// Download category handlers
// -------------------------------------------------------------------------

async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DownloadCategoryResponse>>> {
    let categories = DownloadCategory::list(state.db()).await?;

    let mut responses = Vec::with_capacity(categories.len());
    for category in categories {
        responses.push(category_response(state.db(), category).await?);
    }

    Ok(Json(responses))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DownloadCategoryResponse>> {
    let category = DownloadCategory::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category_response(state.db(), category).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<DownloadCategoryInput>,
) -> AppResult<(StatusCode, Json<DownloadCategoryResponse>)> {
    let category = DownloadCategory::create(state.db(), input).await?;
    let response = category_response(state.db(), category).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DownloadCategoryInput>,
) -> AppResult<Json<DownloadCategoryResponse>> {
    let category = DownloadCategory::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category_response(state.db(), category).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if DownloadCategory::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
