//! Notices and circulars, ordered by publication date then priority.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{blank_to_none, double_option};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notice {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub content: String,
    pub content_si: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Optional expiry; the frontend hides expired notices, the API keeps
    /// serving them.
    pub expires_at: Option<DateTime<Utc>>,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. `expires_at` is doubly optional: absent keeps the
/// stored value, an explicit null clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub content: Option<String>,
    pub content_si: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<i64>,
}

impl Notice {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let notice = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, content, content_si, image, published_at, expires_at, priority, created_at, updated_at FROM notices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch notice")?;

        Ok(notice)
    }

    /// List all notices: newest first, higher priority first among equals.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let notices = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, content, content_si, image, published_at, expires_at, priority, created_at, updated_at FROM notices ORDER BY published_at DESC, priority DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list notices")?;

        Ok(notices)
    }

    pub async fn create(pool: &SqlitePool, input: NoticeInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let content = input.content.unwrap_or_default();
        let content_si = input.content_si.unwrap_or_default();
        let image = blank_to_none(input.image);
        let expires_at = input.expires_at.unwrap_or_default();
        let priority = input.priority.unwrap_or(0);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "content", &content);
        validate::non_negative(&mut errors, "priority", priority);
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
            INSERT INTO notices (title, title_si, content, content_si, image, published_at, expires_at, priority)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&content)
        .bind(&content_si)
        .bind(&image)
        .bind(published_at)
        .bind(expires_at)
        .bind(priority)
        .fetch_one(pool)
        .await
        .context("failed to create notice")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created notice")))
    }

    pub async fn update(pool: &SqlitePool, id: i64, input: NoticeInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let content = input.content.unwrap_or(current.content);
        let content_si = input.content_si.unwrap_or(current.content_si);
        let image = match input.image {
            Some(value) => blank_to_none(Some(value)),
            None => current.image,
        };
        let published_at = input.published_at.unwrap_or(current.published_at);
        let expires_at = input.expires_at.unwrap_or(current.expires_at);
        let priority = input.priority.unwrap_or(current.priority);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "content", &content);
        validate::non_negative(&mut errors, "priority", priority);
        errors.into_result()?;

        sqlx::query(
            r#"
            UPDATE notices
            SET title = ?, title_si = ?, content = ?, content_si = ?, image = ?,
                published_at = ?, expires_at = ?, priority = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&content)
        .bind(&content_si)
        .bind(&image)
        .bind(published_at)
        .bind(expires_at)
        .bind(priority)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update notice")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notices WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete notice")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn expires_at_distinguishes_absent_from_null() {
        let absent: NoticeInput = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(absent.expires_at.is_none());

        let cleared: NoticeInput =
            serde_json::from_str(r#"{"title": "x", "expires_at": null}"#).unwrap();
        assert_eq!(cleared.expires_at, Some(None));

        let set: NoticeInput =
            serde_json::from_str(r#"{"expires_at": "2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.expires_at, Some(Some(_))));
    }
}
