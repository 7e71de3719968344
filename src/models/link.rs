//! Curated external links (ministry sites, partner institutions).

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExternalLink {
    pub id: i64,
    pub name: String,
    pub name_si: String,
    pub url: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalLinkInput {
    pub name: Option<String>,
    pub name_si: Option<String>,
    pub url: Option<String>,
    pub position: Option<i64>,
}

impl ExternalLink {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let link = sqlx::query_as::<_, Self>(
            "SELECT id, name, name_si, url, position, created_at, updated_at FROM external_links WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch external link")?;

        Ok(link)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let links = sqlx::query_as::<_, Self>(
            "SELECT id, name, name_si, url, position, created_at, updated_at FROM external_links ORDER BY position, name, id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list external links")?;

        Ok(links)
    }

    pub async fn create(pool: &SqlitePool, input: ExternalLinkInput) -> AppResult<Self> {
        let name = input.name.unwrap_or_default();
        let name_si = input.name_si.unwrap_or_default();
        let url = input.url.unwrap_or_default();
        let position = input.position.unwrap_or(0);

        validate_link(&name, &name_si, &url, position)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO external_links (name, name_si, url, position)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&url)
        .bind(position)
        .fetch_one(pool)
        .await
        .context("failed to create external link")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created external link"))
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: ExternalLinkInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(current.name);
        let name_si = input.name_si.unwrap_or(current.name_si);
        let url = input.url.unwrap_or(current.url);
        let position = input.position.unwrap_or(current.position);

        validate_link(&name, &name_si, &url, position)?;

        sqlx::query(
            r#"
            UPDATE external_links
            SET name = ?, name_si = ?, url = ?, position = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&url)
        .bind(position)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update external link")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM external_links WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete external link")?;

        Ok(result.rows_affected() > 0)
    }
}

fn validate_link(name: &str, name_si: &str, url: &str, position: i64) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    validate::require(&mut errors, "name", name);
    validate::max_len(&mut errors, "name", name, 255);
    validate::max_len(&mut errors, "name_si", name_si, 255);
    validate::require(&mut errors, "url", url);
    validate::http_url(&mut errors, "url", url);
    validate::non_negative(&mut errors, "position", position);
    errors.into_result()
}
