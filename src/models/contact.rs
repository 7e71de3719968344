//! Contact-form messages and the site's contact information record.
//!
//! Messages are write-in (public form) plus a back-office listing. The
//! contact information table is a singleton: create is refused while a
//! row exists, updates go to the existing row.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_handled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactInfo {
    pub id: i64,
    pub organization: String,
    pub organization_si: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub address_si: String,
    pub map_url: String,
    pub map_embed: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessageInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfoInput {
    pub organization: Option<String>,
    pub organization_si: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub address_si: Option<String>,
    pub map_url: Option<String>,
    pub map_embed: Option<String>,
}

impl ContactMessage {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let message = sqlx::query_as::<_, Self>(
            "SELECT id, name, email, subject, message, is_handled, created_at, updated_at FROM contact_messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch contact message")?;

        Ok(message)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let messages = sqlx::query_as::<_, Self>(
            "SELECT id, name, email, subject, message, is_handled, created_at, updated_at FROM contact_messages ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list contact messages")?;

        Ok(messages)
    }

    pub async fn create(pool: &SqlitePool, input: ContactMessageInput) -> AppResult<Self> {
        let name = input.name.unwrap_or_default();
        let email = input.email.unwrap_or_default();
        let subject = input.subject.unwrap_or_default();
        let message = input.message.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "name", &name);
        validate::max_len(&mut errors, "name", &name, 255);
        validate::require(&mut errors, "email", &email);
        validate::email(&mut errors, "email", &email);
        validate::max_len(&mut errors, "subject", &subject, 255);
        validate::require(&mut errors, "message", &message);
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&email)
        .bind(&subject)
        .bind(&message)
        .fetch_one(pool)
        .await
        .context("failed to create contact message")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created contact message"))
        })
    }
}

impl ContactInfo {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let info = sqlx::query_as::<_, Self>(
            "SELECT id, organization, organization_si, phone, email, address, address_si, map_url, map_embed, created_at, updated_at FROM contact_info WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch contact info")?;

        Ok(info)
    }

    pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Self>> {
        let info = sqlx::query_as::<_, Self>(
            "SELECT id, organization, organization_si, phone, email, address, address_si, map_url, map_embed, created_at, updated_at FROM contact_info ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
        .context("failed to list contact info")?;

        Ok(info)
    }

    /// Create the contact record. Refused while one exists; the race
    /// between two concurrent creates is tolerated as best-effort.
    pub async fn create(pool: &SqlitePool, input: ContactInfoInput) -> AppResult<Self> {
        let organization = input.organization.unwrap_or_default();
        let organization_si = input.organization_si.unwrap_or_default();
        let phone = input.phone.unwrap_or_default();
        let email = input.email.unwrap_or_default();
        let address = input.address.unwrap_or_default();
        let address_si = input.address_si.unwrap_or_default();
        let map_url = input.map_url.unwrap_or_default();
        let map_embed = input.map_embed.unwrap_or_default();

        validate_contact_info(&organization, &organization_si, &phone, &email, &map_url)?;

        let occupied: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contact_info)")
            .fetch_one(pool)
            .await
            .context("failed to check for existing contact info")?;
        if occupied {
            return Err(AppError::field(
                "non_field_errors",
                "Contact information already exists.",
            ));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contact_info (organization, organization_si, phone, email, address, address_si, map_url, map_embed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&organization)
        .bind(&organization_si)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(&address_si)
        .bind(&map_url)
        .bind(&map_embed)
        .fetch_one(pool)
        .await
        .context("failed to create contact info")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created contact info"))
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: ContactInfoInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let organization = input.organization.unwrap_or(current.organization);
        let organization_si = input.organization_si.unwrap_or(current.organization_si);
        let phone = input.phone.unwrap_or(current.phone);
        let email = input.email.unwrap_or(current.email);
        let address = input.address.unwrap_or(current.address);
        let address_si = input.address_si.unwrap_or(current.address_si);
        let map_url = input.map_url.unwrap_or(current.map_url);
        let map_embed = input.map_embed.unwrap_or(current.map_embed);

        validate_contact_info(&organization, &organization_si, &phone, &email, &map_url)?;

        sqlx::query(
            r#"
            UPDATE contact_info
            SET organization = ?, organization_si = ?, phone = ?, email = ?, address = ?,
                address_si = ?, map_url = ?, map_embed = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&organization)
        .bind(&organization_si)
        .bind(&phone)
        .bind(&email)
        .bind(&address)
        .bind(&address_si)
        .bind(&map_url)
        .bind(&map_embed)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update contact info")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM contact_info WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete contact info")?;

        Ok(result.rows_affected() > 0)
    }
}

fn validate_contact_info(
    organization: &str,
    organization_si: &str,
    phone: &str,
    email: &str,
    map_url: &str,
) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    validate::max_len(&mut errors, "organization", organization, 255);
    validate::max_len(&mut errors, "organization_si", organization_si, 255);
    validate::max_len(&mut errors, "phone", phone, 100);
    validate::email(&mut errors, "email", email);
    validate::http_url(&mut errors, "map_url", map_url);
    errors.into_result()
}
