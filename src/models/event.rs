//! Calendar events, listed soonest-first by start date.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::double_option;
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub title_si: String,
    pub description: String,
    pub description_si: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

impl Event {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let event = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, start_date, end_date, created_at, updated_at FROM events WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch event")?;

        Ok(event)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let events = sqlx::query_as::<_, Self>(
            "SELECT id, title, title_si, description, description_si, start_date, end_date, created_at, updated_at FROM events ORDER BY start_date, id",
        )
        .fetch_all(pool)
        .await
        .context("failed to list events")?;

        Ok(events)
    }

    pub async fn create(pool: &SqlitePool, input: EventInput) -> AppResult<Self> {
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let end_date = input.end_date.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        let start_date = match input.start_date {
            Some(value) => value,
            None => {
                errors.add("start_date", "This field is required.");
                // never persisted: the recorded error aborts below
                NaiveDate::default()
            }
        };
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events (title, title_si, description, description_si, start_date, end_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&description)
        .bind(&description_si)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(pool)
        .await
        .context("failed to create event")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created event")))
    }

    pub async fn update(pool: &SqlitePool, id: i64, input: EventInput) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let start_date = input.start_date.unwrap_or(current.start_date);
        let end_date = input.end_date.unwrap_or(current.end_date);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "title", &title);
        validate::max_len(&mut errors, "title", &title, 255);
        validate::max_len(&mut errors, "title_si", &title_si, 255);
        errors.into_result()?;

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, title_si = ?, description = ?, description_si = ?,
                start_date = ?, end_date = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&title_si)
        .bind(&description)
        .bind(&description_si)
        .bind(start_date)
        .bind(end_date)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update event")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete event")?;

        Ok(result.rows_affected() > 0)
    }
}
