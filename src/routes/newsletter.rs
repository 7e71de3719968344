//! Newsletter subscription API routes. Create and list only.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::error::AppResult;
use crate::models::{NewsletterSubscription, NewsletterSubscriptionInput};
use crate::state::AppState;

/// Create the newsletter router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/newsletter", get(list_subscriptions))
        .route("/api/newsletter", post(create_subscription))
}

async fn list_subscriptions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<NewsletterSubscription>>> {
    let subscriptions = NewsletterSubscription::list(state.db()).await?;
    Ok(Json(subscriptions))
}

async fn create_subscription(
    State(state): State<AppState>,
    Json(input): Json<NewsletterSubscriptionInput>,
) -> AppResult<(StatusCode, Json<NewsletterSubscription>)> {
    let subscription = NewsletterSubscription::create(state.db(), input).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}
