//! Photo album and gallery image API routes.
//!
//! Album responses embed their images in display order. The flat
//! `/api/gallery` collection serves the same image rows filterable by
//! owning album.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::{Album, AlbumInput, AlbumListParams, GalleryImage, GalleryImageInput};
use crate::state::AppState;

/// Create the album router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/albums", get(list_albums))
        .route("/api/albums", post(create_album))
        .route("/api/albums/{id}", get(get_album))
        .route("/api/albums/{id}", put(update_album))
        .route("/api/albums/{id}", patch(update_album))
        .route("/api/albums/{id}", delete(delete_album))
        .route("/api/gallery", get(list_images))
        .route("/api/gallery", post(create_image))
        .route("/api/gallery/{id}", get(get_image))
        .route("/api/gallery/{id}", put(update_image))
        .route("/api/gallery/{id}", patch(update_image))
        .route("/api/gallery/{id}", delete(delete_image))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AlbumResponse {
    id: i64,
    title: String,
    slug: String,
    description: String,
    cover: Option<String>,
    is_active: bool,
    position: i64,
    published_at: Option<NaiveDate>,
    images: Vec<GalleryImageResponse>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct GalleryImageResponse {
    id: i64,
    image: String,
    caption: String,
    position: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GalleryImage> for GalleryImageResponse {
    fn from(image: GalleryImage) -> Self {
        Self {
            id: image.id,
            image: image.image,
            caption: image.caption,
            position: image.position,
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}

async fn album_response(pool: &SqlitePool, album: Album) -> AppResult<AlbumResponse> {
    let images = GalleryImage::list_by_album(pool, album.id).await?;

    Ok(AlbumResponse {
        id: album.id,
        title: album.title,
        slug: album.slug,
        description: album.description,
        cover: album.cover,
        is_active: album.is_active,
        position: album.position,
        published_at: album.published_at,
        images: images.into_iter().map(GalleryImageResponse::from).collect(),
        created_at: album.created_at,
        updated_at: album.updated_at,
    })
}

/// Gallery list query parameters.
#[derive(Debug, Deserialize)]
struct GalleryListParams {
    album: Option<i64>,
    ordering: Option<String>,
}

// -------------------------------------------------------------------------
// Album handlers
// -------------------------------------------------------------------------

async fn list_albums(
    State(state): State<AppState>,
    Query(params): Query<AlbumListParams>,
) -> AppResult<Json<Vec<AlbumResponse>>> {
    let albums = Album::list(state.db(), &params).await?;

    let mut responses = Vec::with_capacity(albums.len());
    for album in albums {
        responses.push(album_response(state.db(), album).await?);
    }

    Ok(Json(responses))
}

async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AlbumResponse>> {
    let album = Album::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(album_response(state.db(), album).await?))
}

async fn create_album(
    State(state): State<AppState>,
    Json(input): Json<AlbumInput>,
) -> AppResult<(StatusCode, Json<AlbumResponse>)> {
    let album = Album::create(state.db(), input).await?;
    let response = album_response(state.db(), album).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_album(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AlbumInput>,
) -> AppResult<Json<AlbumResponse>> {
    let album = Album::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(album_response(state.db(), album).await?))
}

async fn delete_album(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if Album::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// -------------------------------------------------------------------------
// Gallery image handlers
// -------------------------------------------------------------------------

async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<GalleryListParams>,
) -> AppResult<Json<Vec<GalleryImageResponse>>> {
    let images =
        GalleryImage::list_filtered(state.db(), params.album, params.ordering.as_deref()).await?;
    Ok(Json(
        images.into_iter().map(GalleryImageResponse::from).collect(),
    ))
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<GalleryImageResponse>> {
    let image = GalleryImage::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(image.into()))
}

async fn create_image(
    State(state): State<AppState>,
    Json(input): Json<GalleryImageInput>,
) -> AppResult<(StatusCode, Json<GalleryImageResponse>)> {
    let image = GalleryImage::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<GalleryImageInput>,
) -> AppResult<Json<GalleryImageResponse>> {
    let image = GalleryImage::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(image.into()))
}

async fn delete_image(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if GalleryImage::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
