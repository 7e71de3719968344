//! Database models.
//!
//! One file per content cluster. Each model pairs a row struct
//! (`sqlx::FromRow` + `Serialize`) with an all-optional input struct used for
//! both create and partial update; the entry functions validate before any
//! write and return field-level errors.

pub mod album;
pub mod book;
pub mod contact;
pub mod event;
pub mod link;
pub mod news;
pub mod newsletter;
pub mod notice;
pub mod publication;
pub mod slide;
pub mod stat;
pub mod video;

pub use album::{Album, AlbumInput, AlbumListParams, GalleryImage, GalleryImageInput};
pub use book::{
    BookInput, BookListParams, PublicationCategory, PublicationCategoryInput, PublicationEntry,
    PublicationImage, PublicationImageInput,
};
pub use contact::{ContactInfo, ContactInfoInput, ContactMessage, ContactMessageInput};
pub use event::{Event, EventInput};
pub use link::{ExternalLink, ExternalLinkInput};
pub use news::{News, NewsInput};
pub use newsletter::{NewsletterSubscription, NewsletterSubscriptionInput};
pub use notice::{Notice, NoticeInput};
pub use publication::{DownloadCategory, DownloadCategoryInput, Publication, PublicationInput};
pub use slide::{HeroSlide, HeroSlideInput};
pub use stat::{Stat, StatInput};
pub use video::{Video, VideoInput};

/// Stored-location fields treat whitespace-only input as "no file".
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Deserializer for nullable `Option<Option<T>>` input fields.
///
/// Serde only calls this when the key is present, so JSON `null` becomes
/// `Some(None)` while an absent key stays at the `#[serde(default)]` of
/// `None`. A plain nested option cannot make that distinction.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Parse a boolean query parameter. Unrecognised values disable the filter
/// rather than erroring.
pub(crate) fn parse_bool_param(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated `ordering` parameter against a whitelist.
///
/// A minus prefix means descending. Unknown fields are dropped; an empty
/// result tells the caller to keep its default ordering.
pub(crate) fn parse_ordering(
    raw: &str,
    allowed: &[&'static str],
) -> Vec<(&'static str, sea_query::Order)> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            let (name, descending) = match part.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (part, false),
            };
            allowed.iter().copied().find(|a| *a == name).map(|field| {
                let order = if descending {
                    sea_query::Order::Desc
                } else {
                    sea_query::Order::Asc
                };
                (field, order)
            })
        })
        .collect()
}

/// Escape LIKE wildcards so search terms match literally.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
