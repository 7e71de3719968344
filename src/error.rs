//! Application error types.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Field-level validation messages, keyed by input field name.
///
/// Cross-field failures (e.g. "file or url required") are reported under
/// the `non_field_errors` key.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert collected errors into a terminal result: `Err` when any
    /// message has been recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Single-field validation error.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Unique-index violations that slip past the handler-level pre-checks
        // still surface to the caller as field errors, not a 500.
        if let Some(column) = unique_violation_column(&err) {
            return AppError::field(&column, "This field must be unique.");
        }
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
            }
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                Json(json!({"detail": "You do not have permission to perform this action."})),
            )
                .into_response(),
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({"errors": errors}))).into_response()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "internal server error"})),
                )
                    .into_response()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "internal server error"})),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Find a unique-constraint violation anywhere in the error chain and
/// report the offending column.
fn unique_violation_column(err: &anyhow::Error) -> Option<String> {
    err.chain().find_map(|cause| {
        let sqlx::Error::Database(db_err) = cause.downcast_ref::<sqlx::Error>()? else {
            return None;
        };
        if !db_err.is_unique_violation() {
            return None;
        }
        column_from_unique_message(db_err.message())
    })
}

/// Parse SQLite's "UNIQUE constraint failed: table.column" message.
fn column_from_unique_message(message: &str) -> Option<String> {
    let rest = message.strip_prefix("UNIQUE constraint failed: ")?;
    let first = rest.split(',').next()?.trim();
    Some(first.rsplit('.').next()?.to_string())
}
