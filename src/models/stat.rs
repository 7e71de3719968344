//! Headline statistics shown on the public site (students, teachers, years).

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Stat {
    pub id: i64,
    pub label: String,
    pub label_si: String,
    pub value: String,
    pub value_si: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatInput {
    pub label: Option<String>,
    pub label_si: Option<String>,
    pub value: Option<String>,
    pub value_si: Option<String>,
}

impl Stat {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let stat = sqlx::query_as::<_, Self>(
            "SELECT id, label, label_si, value, value_si, created_at, updated_at FROM stats WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch stat")?;

        Ok(stat)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let stats = sqlx::query_as::<_, Self>(
            "SELECT id, label, label_si, value, value_si, created_at, updated_at FROM stats ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list stats")?;

        Ok(stats)
    }

    pub async fn create(pool: &SqlitePool, input: StatInput) -> AppResult<Self> {
        let label = input.label.unwrap_or_default();
        let label_si = input.label_si.unwrap_or_default();
        let value = input.value.unwrap_or_default();
        let value_si = input.value_si.unwrap_or_default();

        validate_stat(&label, &label_si, &value, &value_si)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO stats (label, label_si, value, value_si)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&label)
        .bind(&label_si)
        .bind(&value)
        .bind(&value_si)
        .fetch_one(pool)
        .await
        .context("failed to create stat")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created stat")))
    }

    pub async fn update(pool: &SqlitePool, id: i64, input: StatInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let label = input.label.unwrap_or(current.label);
        let label_si = input.label_si.unwrap_or(current.label_si);
        let value = input.value.unwrap_or(current.value);
        let value_si = input.value_si.unwrap_or(current.value_si);

        validate_stat(&label, &label_si, &value, &value_si)?;

        sqlx::query(
            r#"
            UPDATE stats
            SET label = ?, label_si = ?, value = ?, value_si = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&label)
        .bind(&label_si)
        .bind(&value)
        .bind(&value_si)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update stat")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM stats WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete stat")?;

        Ok(result.rows_affected() > 0)
    }
}

fn validate_stat(label: &str, label_si: &str, value: &str, value_si: &str) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    validate::require(&mut errors, "label", label);
    validate::max_len(&mut errors, "label", label, 100);
    validate::max_len(&mut errors, "label_si", label_si, 100);
    validate::require(&mut errors, "value", value);
    validate::max_len(&mut errors, "value", value, 50);
    validate::max_len(&mut errors, "value_si", value_si, 50);
    errors.into_result()
}
