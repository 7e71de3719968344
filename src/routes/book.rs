//! Library catalogue API routes: book categories, books, and book images.
//!
//! Book detail operations honor the same `active` visibility parameter as
//! the list, so an inactive book resolves only when the caller asks for
//! inactive rows. Book responses embed a compact category object and the
//! image list; writes address the category through `category_id`.

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
use crate::models::{
    BookInput, BookListParams, PublicationCategory, PublicationCategoryInput, PublicationEntry,
    PublicationImage, PublicationImageInput,
};
use crate::state::AppState;

/// Create the library router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books", post(create_book))
        .route("/api/books/latest", get(latest_books))
        .route("/api/books/{id}", get(get_book))
        .route("/api/books/{id}", put(update_book))
        .route("/api/books/{id}", patch(update_book))
        .route("/api/books/{id}", delete(delete_book))
        .route("/api/books/{id}/images", get(list_book_images))
        .route("/api/books/{id}/images", post(create_book_image))
        .route("/api/book-images/{id}", put(update_book_image))
        .route("/api/book-images/{id}", patch(update_book_image))
        .route("/api/book-images/{id}", delete(delete_book_image))
        .route("/api/book-categories", get(list_categories))
        .route("/api/book-categories", post(create_category))
        .route("/api/book-categories/{id}", get(get_category))
        .route("/api/book-categories/{id}", put(update_category))
        .route("/api/book-categories/{id}", patch(update_category))
        .route("/api/book-categories/{id}", delete(delete_category))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

/// Compact category embedded in book responses.
#[derive(Debug, Serialize)]
struct BookCategoryRef {
    id: i64,
    name: String,
    name_si: String,
    slug: String,
}

#[derive(Debug, Serialize)]
struct BookImageResponse {
    id: i64,
    image: String,
    caption: String,
    caption_si: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PublicationImage> for BookImageResponse {
    fn from(image: PublicationImage) -> Self {
        Self {
            id: image.id,
            image: image.image,
            caption: image.caption,
            caption_si: image.caption_si,
            created_at: image.created_at,
            updated_at: image.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct BookResponse {
    id: i64,
    category: Option<BookCategoryRef>,
    title: String,
    title_si: String,
    subtitle: String,
    subtitle_si: String,
    authors: String,
    authors_si: String,
    year: Option<i64>,
    description: String,
    description_si: String,
    cover: Option<String>,
    pdf_file: Option<String>,
    external_url: String,
    download_href: String,
    published_at: Option<NaiveDate>,
    is_active: bool,
    is_featured: bool,
    images: Vec<BookImageResponse>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Full category response with a live book count.
#[derive(Debug, Serialize)]
struct BookCategoryResponse {
    id: i64,
    name: String,
    name_si: String,
    slug: String,
    description: String,
    description_si: String,
    position: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    publications_count: i64,
}

/// Category list query parameters.
#[derive(Debug, Deserialize)]
struct BookCategoryListParams {
    search: Option<String>,
}

async fn book_response(pool: &SqlitePool, book: PublicationEntry) -> AppResult<BookResponse> {
    let category = match book.category_id {
        Some(category_id) => PublicationCategory::find_by_id(pool, category_id)
            .await?
            .map(|category| BookCategoryRef {
                id: category.id,
                name: category.name,
                name_si: category.name_si,
                slug: category.slug,
            }),
        None => None,
    };
    let images = PublicationImage::list_by_publication(pool, book.id).await?;
    let download_href = book.download_href().to_string();

    Ok(BookResponse {
        id: book.id,
        category,
        title: book.title,
        title_si: book.title_si,
        subtitle: book.subtitle,
        subtitle_si: book.subtitle_si,
        authors: book.authors,
        authors_si: book.authors_si,
        year: book.year,
        description: book.description,
        description_si: book.description_si,
        cover: book.cover,
        pdf_file: book.pdf_file,
        external_url: book.external_url,
        download_href,
        published_at: book.published_at,
        is_active: book.is_active,
        is_featured: book.is_featured,
        images: images.into_iter().map(BookImageResponse::from).collect(),
        created_at: book.created_at,
        updated_at: book.updated_at,
    })
}

async fn category_response(
    pool: &SqlitePool,
    category: PublicationCategory,
) -> AppResult<BookCategoryResponse> {
    let publications_count = PublicationCategory::publication_count(pool, category.id).await?;

    Ok(BookCategoryResponse {
        id: category.id,
        name: category.name,
        name_si: category.name_si,
        slug: category.slug,
        description: category.description,
        description_si: category.description_si,
        position: category.position,
        created_at: category.created_at,
        updated_at: category.updated_at,
        publications_count,
    })
}

async fn book_responses(
    pool: &SqlitePool,
    books: Vec<PublicationEntry>,
) -> AppResult<Vec<BookResponse>> {
    let mut responses = Vec::with_capacity(books.len());
    for book in books {
        responses.push(book_response(pool, book).await?);
    }
    Ok(responses)
}

// -------------------------------------------------------------------------
// Book handlers
// -------------------------------------------------------------------------

async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = PublicationEntry::list(state.db(), &params).await?;
    Ok(Json(book_responses(state.db(), books).await?))
}

/// Most recently published books. Honors the visibility and category
/// filters, caps the result at `limit` rows (default 6).
async fn latest_books(
    State(state): State<AppState>,
    Query(params): Query<BookListParams>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = PublicationEntry::latest(state.db(), &params).await?;
    Ok(Json(book_responses(state.db(), books).await?))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<BookListParams>,
) -> AppResult<Json<BookResponse>> {
    let book = PublicationEntry::find_gated(state.db(), id, params.include_inactive())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(book_response(state.db(), book).await?))
}

async fn create_book(
    State(state): State<AppState>,
    Json(input): Json<BookInput>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = PublicationEntry::create(state.db(), input).await?;
    let response = book_response(state.db(), book).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<BookListParams>,
    Json(input): Json<BookInput>,
) -> AppResult<Json<BookResponse>> {
    let book = PublicationEntry::update(state.db(), id, input, params.include_inactive())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(book_response(state.db(), book).await?))
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<BookListParams>,
) -> AppResult<StatusCode> {
    if PublicationEntry::delete(state.db(), id, params.include_inactive()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// -------------------------------------------------------------------------
// Book image handlers
// -------------------------------------------------------------------------

async fn list_book_images(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<BookImageResponse>>> {
    if !PublicationEntry::exists(state.db(), id).await? {
        return Err(AppError::NotFound);
    }

    let images = PublicationImage::list_by_publication(state.db(), id).await?;
    Ok(Json(
        images.into_iter().map(BookImageResponse::from).collect(),
    ))
}

async fn create_book_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PublicationImageInput>,
) -> AppResult<(StatusCode, Json<BookImageResponse>)> {
    if !PublicationEntry::exists(state.db(), id).await? {
        return Err(AppError::NotFound);
    }

    let image = PublicationImage::create(state.db(), id, input).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

async fn update_book_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PublicationImageInput>,
) -> AppResult<Json<BookImageResponse>> {
    let image = PublicationImage::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(image.into()))
}

async fn delete_book_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if PublicationImage::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// -------------------------------------------------------------------------
// Book category handlers
// -------------------------------------------------------------------------

async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<BookCategoryListParams>,
) -> AppResult<Json<Vec<BookCategoryResponse>>> {
    let categories = PublicationCategory::list(state.db(), params.search.as_deref()).await?;

    let mut responses = Vec::with_capacity(categories.len());
    for category in categories {
        responses.push(category_response(state.db(), category).await?);
    }

    Ok(Json(responses))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookCategoryResponse>> {
    let category = PublicationCategory::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category_response(state.db(), category).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<PublicationCategoryInput>,
) -> AppResult<(StatusCode, Json<BookCategoryResponse>)> {
    let category = PublicationCategory::create(state.db(), input).await?;
    let response = category_response(state.db(), category).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PublicationCategoryInput>,
) -> AppResult<Json<BookCategoryResponse>> {
    let category = PublicationCategory::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category_response(state.db(), category).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if PublicationCategory::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
