//! Photo albums and the gallery images they own.
//!
//! Album lists are filterable (`is_active`, `slug`), searchable over
//! title/description, and re-orderable within a whitelist; the SELECT is
//! assembled with sea-query. Deleting an album cascades to its images.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sea_query::{Alias, Cond, Expr, LikeExpr, Order, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{blank_to_none, double_option, escape_like, parse_bool_param, parse_ordering};
use crate::slug;
use crate::validate;

const ALBUM_COLUMNS: [&str; 12] = [
    "id",
    "title",
    "title_si",
    "slug",
    "description",
    "description_si",
    "cover",
    "is_active",
    "position",
    "published_at",
    "created_at",
    "updated_at",
];

/// Fields the `ordering` query parameter may name.
const ALBUM_ORDERING_FIELDS: [&str; 3] = ["position", "published_at", "created_at"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub slug: String,
    pub description: String,
    pub description_si: String,
    pub cover: Option<String>,
    pub is_active: bool,
    pub position: i64,
    pub published_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GalleryImage {
    pub id: i64,
    pub album_id: i64,
    pub image: String,
    pub caption: String,
    pub caption_si: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub cover: Option<String>,
    pub is_active: Option<bool>,
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageInput {
    pub album: Option<i64>,
    pub image: Option<String>,
    pub caption: Option<String>,
    pub caption_si: Option<String>,
    pub position: Option<i64>,
}

/// Album list query parameters, straight off the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumListParams {
    pub is_active: Option<String>,
    pub slug: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl Album {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let album = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, slug, description, description_si, cover, is_active, position, published_at, created_at, updated_at FROM albums WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch album")?;

        Ok(album)
    }

    /// List albums with the declared filters, search, and ordering applied.
    pub async fn list(pool: &SqlitePool, params: &AlbumListParams) -> AppResult<Vec<Self>> {
        let sql = build_album_list_query(params);
        let albums = sqlx::query_as::<_, Self>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list albums")?;

        Ok(albums)
    }

    pub async fn create(pool: &SqlitePool, input: AlbumInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let requested_slug = input.slug.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let cover = blank_to_none(input.cover);
        let is_active = input.is_active.unwrap_or(true);
        let position = input.position.unwrap_or(0);
        let published_at = input.published_at.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 200);
        validate::max_len(&mut errors, "title_si", &title_si, 200);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 220);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&title, 220)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "albums", &slug_value, None).await? {
            return Err(AppError::field("slug", "album with this slug already exists."));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO albums (title, title_si, slug, description, description_si, cover, is_active, position, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&slug_value)
        .bind(&description)
        .bind(&description_si)
        .bind(&cover)
        .bind(is_active)
        .bind(position)
        .bind(published_at)
        .fetch_one(pool)
        .await
        .context("failed to create album")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created album")))
    }

    pub async fn update(pool: &SqlitePool, id: i64, input: AlbumInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let requested_slug = input.slug.unwrap_or(current.slug);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let cover = match input.cover {
            Some(value) => blank_to_none(Some(value)),
            None => current.cover,
        };
        let is_active = input.is_active.unwrap_or(current.is_active);
        let position = input.position.unwrap_or(current.position);
        let published_at = input.published_at.unwrap_or(current.published_at);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 200);
        validate::max_len(&mut errors, "title_si", &title_si, 200);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 220);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&title, 220)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "albums", &slug_value, Some(id)).await? {
            return Err(AppError::field("slug", "album with this slug already exists."));
        }

        sqlx::query(
            r#"
            UPDATE albums
            SET title = ?, title_si = ?, slug = ?, description = ?, description_si = ?, cover = ?,
                is_active = ?, position = ?, published_at = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&slug_value)
        .bind(&description)
        .bind(&description_si)
        .bind(&cover)
        .bind(is_active)
        .bind(position)
        .bind(published_at)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update album")?;

        Self::find_by_id(pool, id).await
    }

    /// Delete an album and, via the FK cascade, all its images.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete album")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM albums WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
            .context("failed to check album existence")?;

        Ok(exists)
    }
}

impl GalleryImage {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let image = sqlx::query_as::<_, Self>(
            "SELECT id, album_id, image, caption, caption_si, position, created_at, updated_at FROM gallery_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch gallery image")?;

        Ok(image)
    }

    /// List images, optionally restricted to one album and re-ordered within
    /// the {position, created_at} whitelist.
    pub async fn list_filtered(
        pool: &SqlitePool,
        album: Option<i64>,
        ordering: Option<&str>,
    ) -> AppResult<Vec<Self>> {
        let mut query = String::from(
            "SELECT id, album_id, image, caption, caption_si, position, created_at, updated_at FROM gallery_images WHERE 1=1",
        );
        if album.is_some() {
            query.push_str(" AND album_id = ?");
        }

        let parsed = ordering
            .map(|raw| parse_ordering(raw, &["position", "created_at"]))
            .unwrap_or_default();
        if parsed.is_empty() {
            query.push_str(" ORDER BY position, created_at, id");
        } else {
            let clauses: Vec<String> = parsed
                .iter()
                .map(|(field, order)| {
                    if matches!(order, Order::Desc) {
                        format!("{field} DESC")
                    } else {
                        format!("{field} ASC")
                    }
                })
                .collect();
            query.push_str(&format!(" ORDER BY {}, id", clauses.join(", ")));
        }

        let mut query_builder = sqlx::query_as::<_, Self>(&query);
        if let Some(album_id) = album {
            query_builder = query_builder.bind(album_id);
        }

        let images = query_builder
            .fetch_all(pool)
            .await
            .context("failed to list gallery images")?;

        Ok(images)
    }

    /// Images of one album in display order, for embedding in album
    /// responses.
    pub async fn list_by_album(pool: &SqlitePool, album_id: i64) -> AppResult<Vec<Self>> {
        let images = sqlx::query_as::<_, Self>(
            "SELECT id, album_id, image, caption, caption_si, position, created_at, updated_at FROM gallery_images WHERE album_id = ? ORDER BY position, created_at, id",
        )
        .bind(album_id)
        .fetch_all(pool)
        .await
        .context("failed to list album images")?;

        Ok(images)
    }

    pub async fn create(pool: &SqlitePool, input: GalleryImageInput) -> AppResult<Self> {
        let image = input.image.unwrap_or_default();
        let caption = input.caption.unwrap_or_default();
        let caption_si = input.caption_si.unwrap_or_default();
        let position = input.position.unwrap_or(0);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "image", &image);
        validate::max_len(&mut errors, "caption", &caption, 255);
        validate::max_len(&mut errors, "caption_si", &caption_si, 255);
        validate::non_negative(&mut errors, "position", position);
        if input.album.is_none() {
            errors.add("album", "This field is required.");
        }
        errors.into_result()?;

        let Some(album_id) = input.album else {
            return Err(AppError::field("album", "This field is required."));
        };
        if !Album::exists(pool, album_id).await? {
            return Err(AppError::field(
                "album",
                format!("Invalid pk \"{album_id}\" - object does not exist."),
            ));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO gallery_images (album_id, image, caption, caption_si, position)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(album_id)
        .bind(&image)
        .bind(&caption)
        .bind(&caption_si)
        .bind(position)
        .fetch_one(pool)
        .await
        .context("failed to create gallery image")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created gallery image"))
        })
    }

    /// Update an image; supplying `album` moves it between albums.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: GalleryImageInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let album_id = input.album.unwrap_or(current.album_id);
        let image = input.image.unwrap_or(current.image);
        let caption = input.caption.unwrap_or(current.caption);
        let caption_si = input.caption_si.unwrap_or(current.caption_si);
        let position = input.position.unwrap_or(current.position);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "image", &image);
        validate::max_len(&mut errors, "caption", &caption, 255);
        validate::max_len(&mut errors, "caption_si", &caption_si, 255);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        if !Album::exists(pool, album_id).await? {
            return Err(AppError::field(
                "album",
                format!("Invalid pk \"{album_id}\" - object does not exist."),
            ));
        }

        sqlx::query(
            r#"
            UPDATE gallery_images
            SET album_id = ?, image = ?, caption = ?, caption_si = ?, position = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(album_id)
        .bind(&image)
        .bind(&caption)
        .bind(&caption_si)
        .bind(position)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update gallery image")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete gallery image")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Assemble the album list SELECT from the query parameters.
fn build_album_list_query(params: &AlbumListParams) -> String {
    let mut query = Query::select();
    query
        .columns(ALBUM_COLUMNS.map(Alias::new))
        .from(Alias::new("albums"));

    let mut cond = Cond::all();
    if let Some(flag) = parse_bool_param(params.is_active.as_deref()) {
        cond = cond.add(Expr::col(Alias::new("is_active")).eq(flag));
    }
    if let Some(slug_value) = params.slug.as_deref().filter(|s| !s.is_empty()) {
        cond = cond.add(Expr::col(Alias::new("slug")).eq(slug_value));
    }
    if let Some(term) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        // SQLite LIKE is case-insensitive for ASCII; ESCAPE makes wildcard
        // characters in the term literal.
        let pattern = format!("%{}%", escape_like(term));
        cond = cond.add(
            Cond::any()
                .add(
                    Expr::col(Alias::new("title"))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(Expr::col(Alias::new("description")).like(LikeExpr::new(pattern).escape('\\'))),
        );
    }
    query.cond_where(cond);

    let parsed = params
        .ordering
        .as_deref()
        .map(|raw| parse_ordering(raw, &ALBUM_ORDERING_FIELDS))
        .unwrap_or_default();
    if parsed.is_empty() {
        query
            .order_by(Alias::new("position"), Order::Asc)
            .order_by(Alias::new("published_at"), Order::Desc)
            .order_by(Alias::new("created_at"), Order::Desc)
            .order_by(Alias::new("id"), Order::Desc);
    } else {
        for (field, order) in parsed {
            query.order_by(Alias::new(field), order);
        }
        query.order_by(Alias::new("id"), Order::Asc);
    }

    query.to_string(SqliteQueryBuilder)
}
