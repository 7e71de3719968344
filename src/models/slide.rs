//! Hero carousel slides for the homepage.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HeroSlide {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub subtitle: String,
    pub subtitle_si: String,
    pub image: String,
    pub button_label: String,
    pub button_label_si: String,
    pub button_url: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeroSlideInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_si: Option<String>,
    pub image: Option<String>,
    pub button_label: Option<String>,
    pub button_label_si: Option<String>,
    pub button_url: Option<String>,
    pub position: Option<i64>,
}

impl HeroSlide {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let slide = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, subtitle, subtitle_si, image, button_label, button_label_si, button_url, position, created_at, updated_at FROM hero_slides WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch hero slide")?;

        Ok(slide)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let slides = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, subtitle, subtitle_si, image, button_label, button_label_si, button_url, position, created_at, updated_at FROM hero_slides ORDER BY position, created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list hero slides")?;

        Ok(slides)
    }

    pub async fn create(pool: &SqlitePool, input: HeroSlideInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let subtitle = input.subtitle.unwrap_or_default();
        let subtitle_si = input.subtitle_si.unwrap_or_default();
        let image = input.image.unwrap_or_default();
        let button_label = input.button_label.unwrap_or_default();
        let button_label_si = input.button_label_si.unwrap_or_default();
        let button_url = input.button_url.unwrap_or_default();
        let position = input.position.unwrap_or(0);

        validate_slide(
            &title,
            &title_si,
            &subtitle,
            &subtitle_si,
            &image,
            &button_label,
            &button_label_si,
            &button_url,
            position,
        )?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO hero_slides (title, title_si, subtitle, subtitle_si, image, button_label, button_label_si, button_url, position)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&subtitle)
        .bind(&subtitle_si)
        .bind(&image)
        .bind(&button_label)
        .bind(&button_label_si)
        .bind(&button_url)
        .bind(position)
        .fetch_one(pool)
        .await
        .context("failed to create hero slide")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created hero slide")))
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: HeroSlideInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let subtitle = input.subtitle.unwrap_or(current.subtitle);
        let subtitle_si = input.subtitle_si.unwrap_or(current.subtitle_si);
        let image = input.image.unwrap_or(current.image);
        let button_label = input.button_label.unwrap_or(current.button_label);
        let button_label_si = input.button_label_si.unwrap_or(current.button_label_si);
        let button_url = input.button_url.unwrap_or(current.button_url);
        let position = input.position.unwrap_or(current.position);

        validate_slide(
            &title,
            &title_si,
            &subtitle,
            &subtitle_si,
            &image,
            &button_label,
            &button_label_si,
            &button_url,
            position,
        )?;

        sqlx::query(
            r#"
            UPDATE hero_slides
            SET title = ?, title_si = ?, subtitle = ?, subtitle_si = ?, image = ?,
                button_label = ?, button_label_si = ?, button_url = ?, position = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&subtitle)
        .bind(&subtitle_si)
        .bind(&image)
        .bind(&button_label)
        .bind(&button_label_si)
        .bind(&button_url)
        .bind(position)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update hero slide")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM hero_slides WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete hero slide")?;

        Ok(result.rows_affected() > 0)
    }
}

#[allow(clippy::too_many_arguments)]
fn validate_slide(
    title: &str,
    title_si: &str,
    subtitle: &str,
    subtitle_si: &str,
    image: &str,
    button_label: &str,
    button_label_si: &str,
    button_url: &str,
    position: i64,
) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    validate::require(&mut errors, "title", title);
    validate::max_len(&mut errors, "title", title, 255);
    validate::max_len(&mut errors, "title_si", title_si, 255);
    validate::max_len(&mut errors, "subtitle", subtitle, 255);
    validate::max_len(&mut errors, "subtitle_si", subtitle_si, 255);
    validate::require(&mut errors, "image", image);
    validate::max_len(&mut errors, "button_label", button_label, 100);
    validate::max_len(&mut errors, "button_label_si", button_label_si, 100);
    validate::http_url(&mut errors, "button_url", button_url);
    validate::non_negative(&mut errors, "position", position);
    errors.into_result()
}
