//! Contact message and contact information API routes.
//!
//! Messages are create+list (the public form posts, the back office
//! reads). Contact information is a full-CRUD singleton record.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{ContactInfo, ContactInfoInput, ContactMessage, ContactMessageInput};
use crate::state::AppState;

/// Create the contact router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contact", get(list_messages))
        .route("/api/contact", post(create_message))
        .route("/api/contact-info", get(list_info))
        .route("/api/contact-info", post(create_info))
        .route("/api/contact-info/{id}", get(get_info))
        .route("/api/contact-info/{id}", put(update_info))
        .route("/api/contact-info/{id}", patch(update_info))
        .route("/api/contact-info/{id}", delete(delete_info))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

/// Contact message as shown to the back office. Handling state stays
/// internal.
#[derive(Debug, Serialize)]
struct ContactMessageResponse {
    id: i64,
    name: String,
    email: String,
    subject: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(message: ContactMessage) -> Self {
        Self {
            id: message.id,
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            created_at: message.created_at,
        }
    }
}

// -------------------------------------------------------------------------
// Contact message handlers
// -------------------------------------------------------------------------

async fn list_messages(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ContactMessageResponse>>> {
    let messages = ContactMessage::list(state.db()).await?;
    Ok(Json(
        messages
            .into_iter()
            .map(ContactMessageResponse::from)
            .collect(),
    ))
}

async fn create_message(
    State(state): State<AppState>,
    Json(input): Json<ContactMessageInput>,
) -> AppResult<(StatusCode, Json<ContactMessageResponse>)> {
    let message = ContactMessage::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

// -------------------------------------------------------------------------
// Contact info handlers
// -------------------------------------------------------------------------

async fn list_info(State(state): State<AppState>) -> AppResult<Json<Vec<ContactInfo>>> {
    let info = ContactInfo::list(state.db()).await?;
    Ok(Json(info))
}

async fn get_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ContactInfo>> {
    let info = ContactInfo::find_by_id(state.db(), id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(info))
}

async fn create_info(
    State(state): State<AppState>,
    Json(input): Json<ContactInfoInput>,
) -> AppResult<(StatusCode, Json<ContactInfo>)> {
    let info = ContactInfo::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

async fn update_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ContactInfoInput>,
) -> AppResult<Json<ContactInfo>> {
    let info = ContactInfo::update(state.db(), id, input)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(info))
}

async fn delete_info(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if ContactInfo::delete(state.db(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
