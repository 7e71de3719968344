//! News articles for the public site, with a featured subset for the
//! homepage carousel.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::blank_to_none;
use crate::slug;
use crate::validate;

/// A news article. Sinhala translations live in the `_si` columns; empty
/// string means "not translated".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub slug: String,
    pub image: Option<String>,
    pub excerpt: String,
    pub excerpt_si: String,
    pub content: String,
    pub content_si: String,
    pub published_at: DateTime<Utc>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. Every field is optional so the same struct serves
/// partial updates; create fills the gaps with defaults before validating.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub excerpt_si: Option<String>,
    pub content: Option<String>,
    pub content_si: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_featured: Option<bool>,
}

impl News {
    /// Find an article by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let news = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, slug, image, excerpt, excerpt_si, content, content_si, published_at, is_featured, created_at, updated_at FROM news WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch news")?;

        Ok(news)
    }

    /// List all articles, newest first.
    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let news = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, slug, image, excerpt, excerpt_si, content, content_si, published_at, is_featured, created_at, updated_at FROM news ORDER BY published_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list news")?;

        Ok(news)
    }

    /// The homepage carousel: at most five featured articles, newest first.
    pub async fn list_featured(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let news = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, slug, image, excerpt, excerpt_si, content, content_si, published_at, is_featured, created_at, updated_at FROM news WHERE is_featured = TRUE ORDER BY published_at DESC, id DESC LIMIT 5",
        )
        .fetch_all(pool)
        .await
        .context("failed to list featured news")?;

        Ok(news)
    }

    /// Create a new article. Derives the slug from the title when none is
    /// supplied.
    pub async fn create(pool: &SqlitePool, input: NewsInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let requested_slug = input.slug.unwrap_or_default();
        let image = blank_to_none(input.image);
        let excerpt = input.excerpt.unwrap_or_default();
        let excerpt_si = input.excerpt_si.unwrap_or_default();
        let content = input.content.unwrap_or_default();
        let content_si = input.content_si.unwrap_or_default();
        let is_featured = input.is_featured.unwrap_or(false);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "content", &content);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 255);
        let published_at = match input.published_at {
            Some(value) => value,
            None => {
                errors.add("published_at", "This field is required.");
                Utc::now() // never persisted: the recorded error aborts below
            }
        };
        errors.into_result()?;

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&title, 255)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "news", &slug_value, None).await? {
            return Err(AppError::field("slug", "news with this slug already exists."));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO news (title, title_si, slug, image, excerpt, excerpt_si, content, content_si, published_at, is_featured)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&slug_value)
        .bind(&image)
        .bind(&excerpt)
        .bind(&excerpt_si)
        .bind(&content)
        .bind(&content_si)
        .bind(published_at)
        .bind(is_featured)
        .fetch_one(pool)
        .await
        .context("failed to create news")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created news")))
    }

    /// Update an article. Absent fields keep their current values; an empty
    /// slug is re-derived from the (possibly new) title.
    pub async fn update(pool: &SqlitePool, id: i64, input: NewsInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let requested_slug = input.slug.unwrap_or(current.slug);
        let image = match input.image {
            Some(value) => blank_to_none(Some(value)),
            None => current.image,
        };
        let excerpt = input.excerpt.unwrap_or(current.excerpt);
        let excerpt_si = input.excerpt_si.unwrap_or(current.excerpt_si);
        let content = input.content.unwrap_or(current.content);
        let content_si = input.content_si.unwrap_or(current.content_si);
        let published_at = input.published_at.unwrap_or(current.published_at);
        let is_featured = input.is_featured.unwrap_or(current.is_featured);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        validate::require(&mut errors, "content", &content);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 255);
        errors.into_result()?;

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&title, 255)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "news", &slug_value, Some(id)).await? {
            return Err(AppError::field("slug", "news with this slug already exists."));
        }

        sqlx::query(
            r#"
            UPDATE news
            SET title = ?, title_si = ?, slug = ?, image = ?, excerpt = ?, excerpt_si = ?,
                content = ?, content_si = ?, published_at = ?, is_featured = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&slug_value)
        .bind(&image)
        .bind(&excerpt)
        .bind(&excerpt_si)
        .bind(&content)
        .bind(&content_si)
        .bind(published_at)
        .bind(is_featured)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update news")?;

        Self::find_by_id(pool, id).await
    }

    /// Delete an article.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete news")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn input_deserializes_with_missing_fields() {
        let input: NewsInput = serde_json::from_str(r#"{"title": "Budget released"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("Budget released"));
        assert!(input.slug.is_none());
        assert!(input.published_at.is_none());
        assert!(input.is_featured.is_none());
    }

    #[test]
    fn row_serializes_all_columns() {
        let news = News {
            id: 1,
            title: "Opening ceremony".to_string(),
            title_si: String::new(),
            slug: "opening-ceremony".to_string(),
            image: None,
            excerpt: String::new(),
            excerpt_si: String::new(),
            content: "Full text".to_string(),
            content_si: String::new(),
            published_at: Utc::now(),
            is_featured: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&news).unwrap();
        assert_eq!(value["slug"], "opening-ceremony");
        assert_eq!(value["is_featured"], true);
        assert!(value["image"].is_null());
    }
}
