#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Content model integration tests.
//!
//! Exercises the CRUD models against an in-memory database: slug
//! derivation, merge semantics on partial updates, visibility rules,
//! and the uniqueness and relation checks that back the API errors.

mod common;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use piriven_api::error::AppError;
use piriven_api::models::{
    Album, AlbumInput, AlbumListParams, ContactInfo, ContactInfoInput, ContactMessage,
    ContactMessageInput, DownloadCategory, DownloadCategoryInput, Event, EventInput, ExternalLink,
    ExternalLinkInput, GalleryImage, GalleryImageInput, News, NewsInput, NewsletterSubscription,
    NewsletterSubscriptionInput, Notice, NoticeInput, Publication, PublicationCategory,
    PublicationCategoryInput, PublicationInput, Video, VideoInput,
};
use serde_json::{json, Value};

fn dt(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

/// Unpack a validation error into its JSON field map.
fn field_messages(err: AppError) -> Value {
    match err {
        AppError::Validation(errors) => serde_json::to_value(&errors).unwrap(),
        other => panic!("expected a validation error, got: {other:?}"),
    }
}

fn news_input(title: &str, hour: u32) -> NewsInput {
    NewsInput {
        title: Some(title.to_string()),
        content: Some("Body text".to_string()),
        published_at: Some(dt(hour)),
        ..Default::default()
    }
}

// -------------------------------------------------------------------------
// News
// -------------------------------------------------------------------------

#[tokio::test]
async fn news_create_derives_slug_from_title() {
    let pool = common::test_pool().await;

    let article = News::create(&pool, news_input("Annual Prize Giving 2026", 9))
        .await
        .unwrap();

    assert_eq!(article.slug, "annual-prize-giving-2026");
    assert_eq!(article.title_si, "");
    assert_eq!(article.image, None);
    assert!(!article.is_featured);
}

#[tokio::test]
async fn news_rejects_duplicate_slug() {
    let pool = common::test_pool().await;

    News::create(&pool, news_input("Term Dates", 9)).await.unwrap();
    let err = News::create(&pool, news_input("Term Dates", 10))
        .await
        .unwrap_err();

    assert_eq!(
        field_messages(err),
        json!({"slug": ["news with this slug already exists."]})
    );
}

#[tokio::test]
async fn news_title_enforces_max_length() {
    let pool = common::test_pool().await;

    // 255 characters is the ceiling; one more is rejected.
    let at_limit = "word ".repeat(51);
    assert_eq!(at_limit.len(), 255);
    let article = News::create(&pool, news_input(&at_limit, 9)).await.unwrap();
    assert!(article.slug.len() <= 255);
    assert!(!article.slug.ends_with('-'));

    let over = format!("{at_limit}x");
    let err = News::create(&pool, news_input(&over, 10)).await.unwrap_err();
    assert_eq!(
        field_messages(err),
        json!({"title": ["Ensure this field has no more than 255 characters."]})
    );
}

#[tokio::test]
async fn news_missing_fields_are_reported_together() {
    let pool = common::test_pool().await;

    let err = News::create(&pool, NewsInput::default()).await.unwrap_err();
    let messages = field_messages(err);

    assert_eq!(messages["title"], json!(["This field is required."]));
    assert_eq!(messages["content"], json!(["This field is required."]));
    assert_eq!(messages["published_at"], json!(["This field is required."]));
}

#[tokio::test]
async fn news_featured_list_caps_at_five_newest() {
    let pool = common::test_pool().await;

    for hour in 1..=6 {
        let mut input = news_input(&format!("Featured {hour}"), hour);
        input.is_featured = Some(true);
        News::create(&pool, input).await.unwrap();
    }
    News::create(&pool, news_input("Plain article", 12)).await.unwrap();

    let featured = News::list_featured(&pool).await.unwrap();

    assert_eq!(featured.len(), 5);
    assert!(featured.iter().all(|n| n.is_featured));
    // Newest first; the hour-1 article falls off the end.
    assert_eq!(featured[0].title, "Featured 6");
    assert_eq!(featured[4].title, "Featured 2");
}

#[tokio::test]
async fn news_partial_update_keeps_absent_fields() {
    let pool = common::test_pool().await;

    let mut input = news_input("Library Opening", 9);
    input.title_si = Some("Sinhala title".to_string());
    input.image = Some("uploads/news/opening.jpg".to_string());
    let article = News::create(&pool, input).await.unwrap();

    let patch = NewsInput {
        excerpt: Some("Short summary".to_string()),
        ..Default::default()
    };
    let updated = News::update(&pool, article.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.title, "Library Opening");
    assert_eq!(updated.title_si, "Sinhala title");
    assert_eq!(updated.slug, "library-opening");
    assert_eq!(updated.excerpt, "Short summary");
    assert_eq!(updated.image.as_deref(), Some("uploads/news/opening.jpg"));
}

#[tokio::test]
async fn news_blank_image_clears_stored_file() {
    let pool = common::test_pool().await;

    let mut input = news_input("Sports Meet", 9);
    input.image = Some("uploads/news/sports.jpg".to_string());
    let article = News::create(&pool, input).await.unwrap();

    let patch = NewsInput {
        image: Some(String::new()),
        ..Default::default()
    };
    let updated = News::update(&pool, article.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.image, None);
}

// -------------------------------------------------------------------------
// Notices
// -------------------------------------------------------------------------

#[tokio::test]
async fn notices_order_by_published_then_priority() {
    let pool = common::test_pool().await;

    let make = |title: &str, hour: u32, priority: i64| NoticeInput {
        title: Some(title.to_string()),
        content: Some("Notice body".to_string()),
        published_at: Some(dt(hour)),
        priority: Some(priority),
        ..Default::default()
    };

    Notice::create(&pool, make("Low", 10, 0)).await.unwrap();
    Notice::create(&pool, make("High", 10, 5)).await.unwrap();
    Notice::create(&pool, make("Newer", 12, 0)).await.unwrap();

    let notices = Notice::list(&pool).await.unwrap();
    let titles: Vec<&str> = notices.iter().map(|n| n.title.as_str()).collect();

    assert_eq!(titles, ["Newer", "High", "Low"]);
}

#[tokio::test]
async fn notice_expiry_distinguishes_absent_from_null() {
    let pool = common::test_pool().await;

    let input = NoticeInput {
        title: Some("Exam schedule".to_string()),
        content: Some("Notice body".to_string()),
        published_at: Some(dt(9)),
        expires_at: Some(Some(dt(18))),
        ..Default::default()
    };
    let notice = Notice::create(&pool, input).await.unwrap();
    assert_eq!(notice.expires_at, Some(dt(18)));

    // Absent leaves the expiry in place.
    let kept = Notice::update(&pool, notice.id, NoticeInput::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.expires_at, Some(dt(18)));

    // Explicit null clears it.
    let patch = NoticeInput {
        expires_at: Some(None),
        ..Default::default()
    };
    let cleared = Notice::update(&pool, notice.id, patch).await.unwrap().unwrap();
    assert_eq!(cleared.expires_at, None);
}

// -------------------------------------------------------------------------
// Publications and download categories
// -------------------------------------------------------------------------

fn publication_input(title: &str) -> PublicationInput {
    PublicationInput {
        title: Some(title.to_string()),
        file: Some("uploads/publications/form.pdf".to_string()),
        published_at: Some(dt(9)),
        ..Default::default()
    }
}

#[tokio::test]
async fn inactive_publications_are_hidden_from_reads() {
    let pool = common::test_pool().await;

    let visible = Publication::create(&pool, publication_input("Active form")).await.unwrap();
    let mut hidden_input = publication_input("Retired form");
    hidden_input.is_active = Some(false);
    let hidden = Publication::create(&pool, hidden_input).await.unwrap();

    let listed = Publication::list(&pool).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, visible.id);

    assert!(Publication::find_visible_by_id(&pool, hidden.id).await.unwrap().is_none());
    let updated = Publication::update(&pool, hidden.id, PublicationInput::default())
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(!Publication::delete(&pool, hidden.id).await.unwrap());
}

#[tokio::test]
async fn publication_rejects_unknown_category() {
    let pool = common::test_pool().await;

    let mut input = publication_input("Orphan form");
    input.category = Some(Some(999));
    let err = Publication::create(&pool, input).await.unwrap_err();

    assert_eq!(
        field_messages(err),
        json!({"category": ["Invalid pk \"999\" - object does not exist."]})
    );
}

#[tokio::test]
async fn deleting_category_detaches_its_publications() {
    let pool = common::test_pool().await;

    let category = DownloadCategory::create(
        &pool,
        DownloadCategoryInput {
            name: Some("Forms".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let mut input = publication_input("Admission form");
    input.category = Some(Some(category.id));
    let publication = Publication::create(&pool, input).await.unwrap();
    assert_eq!(publication.category_id, Some(category.id));

    assert!(DownloadCategory::delete(&pool, category.id).await.unwrap());

    let survivor = Publication::find_visible_by_id(&pool, publication.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(survivor.category_id, None);
}

#[tokio::test]
async fn category_publication_count_is_recomputed() {
    let pool = common::test_pool().await;

    let category = DownloadCategory::create(
        &pool,
        DownloadCategoryInput {
            name: Some("Circulars".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(DownloadCategory::publication_count(&pool, category.id).await.unwrap(), 0);

    let mut first = publication_input("Circular one");
    first.category = Some(Some(category.id));
    let first = Publication::create(&pool, first).await.unwrap();
    let mut second = publication_input("Circular two");
    second.category = Some(Some(category.id));
    Publication::create(&pool, second).await.unwrap();
    assert_eq!(DownloadCategory::publication_count(&pool, category.id).await.unwrap(), 2);

    Publication::delete(&pool, first.id).await.unwrap();
    assert_eq!(DownloadCategory::publication_count(&pool, category.id).await.unwrap(), 1);
}

// -------------------------------------------------------------------------
// Videos
// -------------------------------------------------------------------------

#[tokio::test]
async fn video_requires_a_file_or_url() {
    let pool = common::test_pool().await;

    let input = VideoInput {
        title: Some("Graduation day".to_string()),
        published_at: Some(dt(9)),
        ..Default::default()
    };
    let err = Video::create(&pool, input).await.unwrap_err();

    assert_eq!(
        field_messages(err),
        json!({"non_field_errors": ["Provide either a video file or an external URL."]})
    );
}

#[tokio::test]
async fn video_playback_prefers_external_url() {
    let pool = common::test_pool().await;

    let input = VideoInput {
        title: Some("Chanting session".to_string()),
        url: Some("https://video.example.com/watch?v=1".to_string()),
        file: Some("uploads/videos/chanting.mp4".to_string()),
        published_at: Some(dt(9)),
        ..Default::default()
    };
    let video = Video::create(&pool, input).await.unwrap();

    assert_eq!(video.playback_url(), "https://video.example.com/watch?v=1");
}

// -------------------------------------------------------------------------
// Albums and gallery images
// -------------------------------------------------------------------------

fn album_input(title: &str) -> AlbumInput {
    AlbumInput {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

fn image_input(album: i64, position: i64) -> GalleryImageInput {
    GalleryImageInput {
        album: Some(album),
        image: Some(format!("uploads/gallery/img-{position}.jpg")),
        position: Some(position),
        ..Default::default()
    }
}

#[tokio::test]
async fn album_rejects_duplicate_slug() {
    let pool = common::test_pool().await;

    let album = Album::create(&pool, album_input("Vesak Festival")).await.unwrap();
    assert_eq!(album.slug, "vesak-festival");

    let err = Album::create(&pool, album_input("Vesak Festival")).await.unwrap_err();
    assert_eq!(
        field_messages(err),
        json!({"slug": ["album with this slug already exists."]})
    );
}

#[tokio::test]
async fn album_delete_cascades_to_images() {
    let pool = common::test_pool().await;

    let album = Album::create(&pool, album_input("Sports Day")).await.unwrap();
    let first = GalleryImage::create(&pool, image_input(album.id, 1)).await.unwrap();
    let second = GalleryImage::create(&pool, image_input(album.id, 2)).await.unwrap();

    assert!(Album::delete(&pool, album.id).await.unwrap());

    assert!(GalleryImage::find_by_id(&pool, first.id).await.unwrap().is_none());
    assert!(GalleryImage::find_by_id(&pool, second.id).await.unwrap().is_none());
}

#[tokio::test]
async fn gallery_image_requires_existing_album() {
    let pool = common::test_pool().await;

    let missing = GalleryImage::create(
        &pool,
        GalleryImageInput {
            image: Some("uploads/gallery/orphan.jpg".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        field_messages(missing),
        json!({"album": ["This field is required."]})
    );

    let unknown = GalleryImage::create(&pool, image_input(42, 1)).await.unwrap_err();
    assert_eq!(
        field_messages(unknown),
        json!({"album": ["Invalid pk \"42\" - object does not exist."]})
    );
}

#[tokio::test]
async fn gallery_image_moves_between_albums() {
    let pool = common::test_pool().await;

    let first = Album::create(&pool, album_input("Old Hall")).await.unwrap();
    let second = Album::create(&pool, album_input("New Hall")).await.unwrap();
    let image = GalleryImage::create(&pool, image_input(first.id, 1)).await.unwrap();

    let patch = GalleryImageInput {
        album: Some(second.id),
        ..Default::default()
    };
    GalleryImage::update(&pool, image.id, patch).await.unwrap().unwrap();

    assert!(GalleryImage::list_by_album(&pool, first.id).await.unwrap().is_empty());
    let moved = GalleryImage::list_by_album(&pool, second.id).await.unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, image.id);
}

#[tokio::test]
async fn gallery_list_filters_by_album_and_orders_by_position() {
    let pool = common::test_pool().await;

    let album = Album::create(&pool, album_input("Library")).await.unwrap();
    let other = Album::create(&pool, album_input("Shrine Room")).await.unwrap();
    GalleryImage::create(&pool, image_input(album.id, 2)).await.unwrap();
    GalleryImage::create(&pool, image_input(album.id, 1)).await.unwrap();
    GalleryImage::create(&pool, image_input(other.id, 3)).await.unwrap();

    let filtered = GalleryImage::list_filtered(&pool, Some(album.id), None).await.unwrap();
    let positions: Vec<i64> = filtered.iter().map(|i| i.position).collect();
    assert_eq!(positions, [1, 2]);

    let reversed = GalleryImage::list_filtered(&pool, None, Some("-position")).await.unwrap();
    let positions: Vec<i64> = reversed.iter().map(|i| i.position).collect();
    assert_eq!(positions, [3, 2, 1]);
}

#[tokio::test]
async fn album_list_honors_filters() {
    let pool = common::test_pool().await;

    let mut input = album_input("Vesak Lanterns");
    input.is_active = Some(false);
    Album::create(&pool, input).await.unwrap();
    Album::create(&pool, album_input("Poson Procession")).await.unwrap();

    let all = Album::list(&pool, &AlbumListParams::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let active_only = Album::list(
        &pool,
        &AlbumListParams {
            is_active: Some("true".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(active_only.len(), 1);
    assert_eq!(active_only[0].title, "Poson Procession");

    let by_slug = Album::list(
        &pool,
        &AlbumListParams {
            slug: Some("vesak-lanterns".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_slug.len(), 1);
    assert_eq!(by_slug[0].title, "Vesak Lanterns");
}

// -------------------------------------------------------------------------
// Events
// -------------------------------------------------------------------------

#[tokio::test]
async fn event_requires_title_and_start_date() {
    let pool = common::test_pool().await;

    let err = Event::create(&pool, EventInput::default()).await.unwrap_err();
    let messages = field_messages(err);

    assert_eq!(messages["title"], json!(["This field is required."]));
    assert_eq!(messages["start_date"], json!(["This field is required."]));
}

#[tokio::test]
async fn event_end_date_clears_with_explicit_null() {
    let pool = common::test_pool().await;

    let input = EventInput {
        title: Some("Katina ceremony".to_string()),
        start_date: Some(date(20)),
        end_date: Some(Some(date(22))),
        ..Default::default()
    };
    let event = Event::create(&pool, input).await.unwrap();
    assert_eq!(event.end_date, Some(date(22)));

    let patch = EventInput {
        end_date: Some(None),
        ..Default::default()
    };
    let updated = Event::update(&pool, event.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.end_date, None);
    assert_eq!(updated.start_date, date(20));
}

// -------------------------------------------------------------------------
// External links
// -------------------------------------------------------------------------

#[tokio::test]
async fn link_requires_a_well_formed_url() {
    let pool = common::test_pool().await;

    let input = ExternalLinkInput {
        name: Some("Ministry of Education".to_string()),
        url: Some("not a url".to_string()),
        ..Default::default()
    };
    let err = ExternalLink::create(&pool, input).await.unwrap_err();
    assert_eq!(field_messages(err), json!({"url": ["Enter a valid URL."]}));

    let missing = ExternalLink::create(
        &pool,
        ExternalLinkInput {
            name: Some("Ministry of Education".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(field_messages(missing), json!({"url": ["This field is required."]}));
}

// -------------------------------------------------------------------------
// Newsletter subscriptions
// -------------------------------------------------------------------------

#[tokio::test]
async fn newsletter_rejects_duplicate_email() {
    let pool = common::test_pool().await;

    let input = NewsletterSubscriptionInput {
        email: Some("reader@example.com".to_string()),
    };
    NewsletterSubscription::create(&pool, input.clone()).await.unwrap();

    let err = NewsletterSubscription::create(&pool, input).await.unwrap_err();
    assert_eq!(
        field_messages(err),
        json!({"email": ["newsletter subscription with this email already exists."]})
    );
}

#[tokio::test]
async fn newsletter_rejects_malformed_email() {
    let pool = common::test_pool().await;

    let err = NewsletterSubscription::create(
        &pool,
        NewsletterSubscriptionInput {
            email: Some("not-an-email".to_string()),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        field_messages(err),
        json!({"email": ["Enter a valid email address."]})
    );
}

// -------------------------------------------------------------------------
// Contact messages and contact info
// -------------------------------------------------------------------------

#[tokio::test]
async fn contact_message_validates_required_fields() {
    let pool = common::test_pool().await;

    let err = ContactMessage::create(&pool, ContactMessageInput::default())
        .await
        .unwrap_err();
    let messages = field_messages(err);

    assert_eq!(messages["name"], json!(["This field is required."]));
    assert_eq!(messages["email"], json!(["This field is required."]));
    assert_eq!(messages["message"], json!(["This field is required."]));
    // Subject stays optional.
    assert!(messages.get("subject").is_none());
}

#[tokio::test]
async fn contact_message_defaults_to_unhandled() {
    let pool = common::test_pool().await;

    let input = ContactMessageInput {
        name: Some("A. Parent".to_string()),
        email: Some("parent@example.com".to_string()),
        message: Some("When does the term start?".to_string()),
        ..Default::default()
    };
    let message = ContactMessage::create(&pool, input).await.unwrap();

    assert!(!message.is_handled);
    assert_eq!(message.subject, "");
}

#[tokio::test]
async fn contact_info_is_a_singleton() {
    let pool = common::test_pool().await;

    let first = ContactInfo::create(
        &pool,
        ContactInfoInput {
            organization: Some("Department of Piriven Education".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = ContactInfo::create(&pool, ContactInfoInput::default()).await.unwrap_err();
    assert_eq!(
        field_messages(err),
        json!({"non_field_errors": ["Contact information already exists."]})
    );

    // The existing row can still be changed.
    let patch = ContactInfoInput {
        phone: Some("+94 11 234 5678".to_string()),
        ..Default::default()
    };
    let updated = ContactInfo::update(&pool, first.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.phone, "+94 11 234 5678");
    assert_eq!(updated.organization, "Department of Piriven Education");
}

// -------------------------------------------------------------------------
// Book categories
// -------------------------------------------------------------------------

#[tokio::test]
async fn book_category_rejects_duplicate_name() {
    let pool = common::test_pool().await;

    let input = PublicationCategoryInput {
        name: Some("Pali Texts".to_string()),
        ..Default::default()
    };
    let category = PublicationCategory::create(&pool, input.clone()).await.unwrap();
    assert_eq!(category.slug, "pali-texts");

    let err = PublicationCategory::create(&pool, input).await.unwrap_err();
    assert_eq!(
        field_messages(err),
        json!({"name": ["publication category with this name already exists."]})
    );
}

#[tokio::test]
async fn book_category_search_escapes_like_wildcards() {
    let pool = common::test_pool().await;

    PublicationCategory::create(
        &pool,
        PublicationCategoryInput {
            name: Some("100% Exam Guides".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    PublicationCategory::create(
        &pool,
        PublicationCategoryInput {
            name: Some("General Guides".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // A literal percent must not act as a wildcard.
    let hits = PublicationCategory::list(&pool, Some("100%")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "100% Exam Guides");

    let all = PublicationCategory::list(&pool, None).await.unwrap();
    assert_eq!(all.len(), 2);
}
