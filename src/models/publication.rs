//! Downloadable publications (circulars, forms, reports) grouped into
//! download categories.
//!
//! The public API only ever sees active publications; deactivated rows stay
//! in storage for the admin console but are invisible to every verb here,
//! including retrieve and delete.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{blank_to_none, double_option};
use crate::validate;

/// A category of downloads, e.g. "Application Forms".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DownloadCategory {
    pub id: i64,
    pub name: String,
    pub name_si: String,
    pub description: String,
    pub description_si: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A downloadable file, optionally replaced by an external link.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub description: String,
    pub description_si: String,
    pub file: String,
    pub external_url: String,
    pub published_at: DateTime<Utc>,
    pub is_active: bool,
    pub cover: Option<String>,
    /// The wire name for the category reference is `category`.
    #[serde(rename = "category")]
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadCategoryInput {
    pub name: Option<String>,
    pub name_si: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub position: Option<i64>,
}

/// Create/update payload. `category` is doubly optional: absent keeps the
/// stored value, an explicit null detaches the publication.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub file: Option<String>,
    pub external_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<i64>>,
}

impl DownloadCategory {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let category = sqlx::query_as::<_, Self>(
            "SELECT id, name, name_si, description, description_si, position, created_at, updated_at FROM download_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch download category")?;

        Ok(category)
    }

    /// List all categories in menu order.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let categories = sqlx::query_as::<_, Self>(
            "SELECT id, name, name_si, description, description_si, position, created_at, updated_at FROM download_categories ORDER BY position, name, id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list download categories")?;

        Ok(categories)
    }

    pub async fn create(pool: &SqlitePool, input: DownloadCategoryInput) -> AppResult<Self> {
        let name = input.name.unwrap_or_default();
        let name_si = input.name_si.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let position = input.position.unwrap_or(0);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "name", &name);
        validate::max_len(&mut errors, "name", &name, 255);
        validate::max_len(&mut errors, "name_si", &name_si, 255);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO download_categories (name, name_si, description, description_si, position)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&description)
        .bind(&description_si)
        .bind(position)
        .fetch_one(pool)
        .await
        .context("failed to create download category")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created download category"))
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: DownloadCategoryInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(current.name);
        let name_si = input.name_si.unwrap_or(current.name_si);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let position = input.position.unwrap_or(current.position);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "name", &name);
        validate::max_len(&mut errors, "name", &name, 255);
        validate::max_len(&mut errors, "name_si", &name_si, 255);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        sqlx::query(
            r#"
            UPDATE download_categories
            SET name = ?, name_si = ?, description = ?, description_si = ?, position = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&description)
        .bind(&description_si)
        .bind(position)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update download category")?;

        Self::find_by_id(pool, id).await
    }

    /// Delete a category. Publications under it are detached, not deleted
    /// (ON DELETE SET NULL).
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM download_categories WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete download category")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM download_categories WHERE id = ?)")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to check download category existence")?;

        Ok(exists)
    }

    /// Live count of publications attached to a category.
    pub async fn publication_count(pool: &SqlitePool, id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM publications WHERE category_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to count publications")?;

        Ok(count)
    }
}

impl Publication {
    /// Find an active publication by ID. Inactive rows are invisible to the
    /// API.
    pub async fn find_visible_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let publication = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, file, external_url, published_at, is_active, cover, category_id, created_at, updated_at FROM publications WHERE id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch publication")?;

        Ok(publication)
    }

    /// List active publications, newest first.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let publications = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, file, external_url, published_at, is_active, cover, category_id, created_at, updated_at FROM publications WHERE is_active = TRUE ORDER BY published_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list publications")?;

        Ok(publications)
    }

    /// All publications of one category, for embedding in category
    /// responses. Inactive rows are included; the active gate applies
    /// only to the public publication list.
    pub async fn list_by_category(pool: &SqlitePool, category_id: i64) -> AppResult<Vec<Self>> {
        let publications = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, file, external_url, published_at, is_active, cover, category_id, created_at, updated_at FROM publications WHERE category_id = ? ORDER BY published_at DESC, id DESC",
        )
        .bind(category_id)
        .fetch_all(pool)
        .await
        .context("failed to list publications by category")?;

        Ok(publications)
    }

    pub async fn create(pool: &SqlitePool, input: PublicationInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let file = input.file.unwrap_or_default();
        let external_url = input.external_url.unwrap_or_default();
        let is_active = input.is_active.unwrap_or(true);
        let cover = blank_to_none(input.cover);
        let category_id = input.category.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "file", &file);
        validate::http_url(&mut errors, "external_url", &external_url);
        let published_at = match input.published_at {
            Some(value) => value,
            None => {
                errors.add("published_at", "This field is required.");
                Utc::now() // never persisted: the recorded error aborts below
            }
        };
        errors.into_result()?;

        if let Some(category_id) = category_id {
            if !DownloadCategory::exists(pool, category_id).await? {
                return Err(AppError::field(
                    "category",
                    format!("Invalid pk \"{category_id}\" - object does not exist."),
                ));
            }
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publications (title, title_si, description, description_si, file, external_url, published_at, is_active, cover, category_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&description)
        .bind(&description_si)
        .bind(&file)
        .bind(&external_url)
        .bind(published_at)
        .bind(is_active)
        .bind(&cover)
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("failed to create publication")?;

        // A publication created inactive is immediately invisible, so fetch
        // without the visibility filter.
        Self::find_any_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created publication")))
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: PublicationInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_visible_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let file = input.file.unwrap_or(current.file);
        let external_url = input.external_url.unwrap_or(current.external_url);
        let published_at = input.published_at.unwrap_or(current.published_at);
        let is_active = input.is_active.unwrap_or(current.is_active);
        let cover = match input.cover {
            Some(value) => blank_to_none(Some(value)),
            None => current.cover,
        };
        let category_id = input.category.unwrap_or(current.category_id);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "file", &file);
        validate::http_url(&mut errors, "external_url", &external_url);
        errors.into_result()?;

        if let Some(category_id) = category_id {
            if !DownloadCategory::exists(pool, category_id).await? {
                return Err(AppError::field(
                    "category",
                    format!("Invalid pk \"{category_id}\" - object does not exist."),
                ));
            }
        }

        sqlx::query(
            r#"
            UPDATE publications
            SET title = ?, title_si = ?, description = ?, description_si = ?, file = ?,
                external_url = ?, published_at = ?, is_active = ?, cover = ?, category_id = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&description)
        .bind(&description_si)
        .bind(&file)
        .bind(&external_url)
        .bind(published_at)
        .bind(is_active)
        .bind(&cover)
        .bind(category_id)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update publication")?;

        Self::find_any_by_id(pool, id).await
    }

    /// Delete an active publication. Deleting an inactive one reports
    /// NotFound, same as every other verb.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM publications WHERE id = ? AND is_active = TRUE")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete publication")?;

        Ok(result.rows_affected() > 0)
    }

    /// Lookup without the visibility filter, for returning rows the caller
    /// just wrote.
    async fn find_any_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let publication = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, file, external_url, published_at, is_active, cover, category_id, created_at, updated_at FROM publications WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch publication")?;

        Ok(publication)
    }
}
