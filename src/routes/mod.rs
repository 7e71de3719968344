//! HTTP route handlers.

use axum::Router;

use crate::state::AppState;

pub mod album;
pub mod book;
pub mod contact;
pub mod event;
pub mod health;
pub mod link;
pub mod news;
pub mod newsletter;
pub mod notice;
pub mod publication;
pub mod slide;
pub mod stat;
pub mod video;

/// Compose every resource router into the application router.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(news::router())
        .merge(notice::router())
        .merge(publication::router())
        .merge(video::router())
        .merge(album::router())
        .merge(event::router())
        .merge(stat::router())
        .merge(link::router())
        .merge(slide::router())
        .merge(newsletter::router())
        .merge(contact::router())
        .merge(book::router())
}
