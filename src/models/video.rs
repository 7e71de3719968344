//! Videos: either an external URL (YouTube and the like) or an uploaded
//! file, never neither.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::blank_to_none;
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub url: String,
    pub file: Option<String>,
    pub description: String,
    pub description_si: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub url: Option<String>,
    pub file: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
}

impl Video {
    /// Prefer the external URL; fall back to the uploaded file.
    pub fn playback_url(&self) -> &str {
        if !self.url.is_empty() {
            return &self.url;
        }
        self.file.as_deref().unwrap_or("")
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let video = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, url, file, description, description_si, published_at, thumbnail, created_at, updated_at FROM videos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch video")?;

        Ok(video)
    }

    /// List all videos, newest first.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let videos = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, url, file, description, description_si, published_at, thumbnail, created_at, updated_at FROM videos ORDER BY published_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list videos")?;

        Ok(videos)
    }

    pub async fn create(pool: &SqlitePool, input: VideoInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let url = input.url.unwrap_or_default();
        let file = blank_to_none(input.file);
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let thumbnail = blank_to_none(input.thumbnail);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::http_url(&mut errors, "url", &url);
        if url.trim().is_empty() && file.is_none() {
            errors.add(
                "non_field_errors",
                "Provide either a video file or an external URL.",
            );
        }
        let published_at = match input.published_at {
            Some(value) => value,
            None => {
                errors.add("published_at", "This field is required.");
                Utc::now() // never persisted: the recorded error aborts below
            }
        };
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO videos (title, title_si, url, file, description, description_si, published_at, thumbnail)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&url)
        .bind(&file)
        .bind(&description)
        .bind(&description_si)
        .bind(published_at)
        .bind(&thumbnail)
        .fetch_one(pool)
        .await
        .context("failed to create video")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created video")))
    }

    pub async fn update(pool: &SqlitePool, id: i64, input: VideoInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let url = input.url.unwrap_or(current.url);
        let file = match input.file {
            Some(value) => blank_to_none(Some(value)),
            None => current.file,
        };
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let published_at = input.published_at.unwrap_or(current.published_at);
        let thumbnail = match input.thumbnail {
            Some(value) => blank_to_none(Some(value)),
            None => current.thumbnail,
        };

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::http_url(&mut errors, "url", &url);
        if url.trim().is_empty() && file.is_none() {
            errors.add(
                "non_field_errors",
                "Provide either a video file or an external URL.",
            );
        }
        errors.into_result()?;

        sqlx::query(
            r#"
            UPDATE videos
            SET title = ?, title_si = ?, url = ?, file = ?, description = ?, description_si = ?,
                published_at = ?, thumbnail = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&url)
        .bind(&file)
        .bind(&description)
        .bind(&description_si)
        .bind(published_at)
        .bind(&thumbnail)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update video")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete video")?;

        Ok(result.rows_affected() > 0)
    }
}
