//! Newsletter signups. The public site only ever creates; listing is for
//! the back office.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NewsletterSubscription {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterSubscriptionInput {
    pub email: Option<String>,
}

impl NewsletterSubscription {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let subscription = sqlx::query_as::<_, Self>(
            "SELECT id, email, created_at, updated_at FROM newsletter_subscriptions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch newsletter subscription")?;

        Ok(subscription)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let subscriptions = sqlx::query_as::<_, Self>(
            "SELECT id, email, created_at, updated_at FROM newsletter_subscriptions ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list newsletter subscriptions")?;

        Ok(subscriptions)
    }

    pub async fn create(pool: &SqlitePool, input: NewsletterSubscriptionInput) -> AppResult<Self> {
        let email = input.email.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "email", &email);
        validate::email(&mut errors, "email", &email);
        errors.into_result()?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM newsletter_subscriptions WHERE email = ?)",
        )
        .bind(&email)
        .fetch_one(pool)
        .await
        .context("failed to check subscription email")?;
        if taken {
            return Err(AppError::field(
                "email",
                "newsletter subscription with this email already exists.",
            ));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO newsletter_subscriptions (email) VALUES (?) RETURNING id",
        )
        .bind(&email)
        .fetch_one(pool)
        .await
        .context("failed to create newsletter subscription")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created subscription"))
        })
    }
}
