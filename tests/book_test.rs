#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Library catalogue integration tests.
//!
//! Covers the book filter chain (active gate, featured, category by id or
//! slug, year, search), the `latest` shortcut, detail-level gating, and
//! book image ownership.

mod common;

use chrono::NaiveDate;
use piriven_api::error::AppError;
use piriven_api::models::{
    BookInput, BookListParams, PublicationCategory, PublicationCategoryInput, PublicationEntry,
    PublicationImage, PublicationImageInput,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn field_messages(err: AppError) -> Value {
    match err {
        AppError::Validation(errors) => serde_json::to_value(&errors).unwrap(),
        other => panic!("expected a validation error, got: {other:?}"),
    }
}

fn params(build: impl FnOnce(&mut BookListParams)) -> BookListParams {
    let mut p = BookListParams::default();
    build(&mut p);
    p
}

struct Seeded {
    pali: PublicationCategory,
    dhammapada: PublicationEntry,
    vinaya: PublicationEntry,
    jataka: PublicationEntry,
    archived: PublicationEntry,
}

/// Two categories and four books, one of them inactive.
async fn seed_library(pool: &SqlitePool) -> Seeded {
    let pali = PublicationCategory::create(
        pool,
        PublicationCategoryInput {
            name: Some("Pali Texts".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let sinhala = PublicationCategory::create(
        pool,
        PublicationCategoryInput {
            name: Some("Sinhala Literature".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let dhammapada = PublicationEntry::create(
        pool,
        BookInput {
            title: Some("Dhammapada".to_string()),
            authors: Some("Narada Thera".to_string()),
            category_id: Some(Some(pali.id)),
            year: Some(Some(2020)),
            published_at: Some(Some(date(10))),
            pdf_file: Some("uploads/library/dhammapada.pdf".to_string()),
            is_featured: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let vinaya = PublicationEntry::create(
        pool,
        BookInput {
            title: Some("Vinaya Studies".to_string()),
            subtitle: Some("A Field Survey".to_string()),
            category_id: Some(Some(pali.id)),
            year: Some(Some(2021)),
            published_at: Some(Some(date(12))),
            pdf_file: Some("uploads/library/vinaya.pdf".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let jataka = PublicationEntry::create(
        pool,
        BookInput {
            title: Some("Jataka Tales".to_string()),
            published_at: Some(Some(date(14))),
            external_url: Some("https://library.example.com/jataka".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let archived = PublicationEntry::create(
        pool,
        BookInput {
            title: Some("Archived Primer".to_string()),
            category_id: Some(Some(sinhala.id)),
            year: Some(Some(2020)),
            published_at: Some(Some(date(8))),
            pdf_file: Some("uploads/library/primer.pdf".to_string()),
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    Seeded {
        pali,
        dhammapada,
        vinaya,
        jataka,
        archived,
    }
}

fn titles(books: &[PublicationEntry]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

// -------------------------------------------------------------------------
// Filter chain
// -------------------------------------------------------------------------

#[tokio::test]
async fn list_hides_inactive_by_default() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let books = PublicationEntry::list(&pool, &BookListParams::default()).await.unwrap();

    assert_eq!(titles(&books), ["Jataka Tales", "Vinaya Studies", "Dhammapada"]);
}

#[tokio::test]
async fn active_false_lifts_the_gate() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let all = PublicationEntry::list(&pool, &params(|p| p.active = Some("False".to_string())))
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    assert!(titles(&all).contains(&"Archived Primer"));

    // Only the literal "false" lifts it; anything else keeps the gate.
    let gated = PublicationEntry::list(&pool, &params(|p| p.active = Some("0".to_string())))
        .await
        .unwrap();
    assert_eq!(gated.len(), 3);
}

#[tokio::test]
async fn featured_filter_accepts_truthy_spellings() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    for spelling in ["true", "1", "Yes"] {
        let featured =
            PublicationEntry::list(&pool, &params(|p| p.featured = Some(spelling.to_string())))
                .await
                .unwrap();
        assert_eq!(titles(&featured), ["Dhammapada"], "spelling {spelling:?}");
    }

    // Non-truthy values leave the list unfiltered.
    let unfiltered = PublicationEntry::list(&pool, &params(|p| p.featured = Some("no".to_string())))
        .await
        .unwrap();
    assert_eq!(unfiltered.len(), 3);
}

#[tokio::test]
async fn category_filter_accepts_id_and_slug() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    let by_id =
        PublicationEntry::list(&pool, &params(|p| p.category = Some(seeded.pali.id.to_string())))
            .await
            .unwrap();
    let by_slug =
        PublicationEntry::list(&pool, &params(|p| p.category = Some("pali-texts".to_string())))
            .await
            .unwrap();

    assert_eq!(titles(&by_id), ["Vinaya Studies", "Dhammapada"]);
    assert_eq!(titles(&by_id), titles(&by_slug));
}

#[tokio::test]
async fn category_filter_matches_nothing_on_bad_input() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let unknown_slug =
        PublicationEntry::list(&pool, &params(|p| p.category = Some("no-such".to_string())))
            .await
            .unwrap();
    assert!(unknown_slug.is_empty());

    // All digits but too large for an id: never treated as a slug.
    let oversized = PublicationEntry::list(
        &pool,
        &params(|p| p.category = Some("99999999999999999999".to_string())),
    )
    .await
    .unwrap();
    assert!(oversized.is_empty());
}

#[tokio::test]
async fn year_filter_parses_or_matches_nothing() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let from_2020 = PublicationEntry::list(&pool, &params(|p| p.year = Some("2020".to_string())))
        .await
        .unwrap();
    assert_eq!(titles(&from_2020), ["Dhammapada"]);

    let garbled = PublicationEntry::list(&pool, &params(|p| p.year = Some("20x20".to_string())))
        .await
        .unwrap();
    assert!(garbled.is_empty());
}

#[tokio::test]
async fn search_spans_title_subtitle_authors_description() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    // Case-insensitive match on authors.
    let by_author = PublicationEntry::list(&pool, &params(|p| p.search = Some("narada".to_string())))
        .await
        .unwrap();
    assert_eq!(titles(&by_author), ["Dhammapada"]);

    // Match on subtitle.
    let by_subtitle =
        PublicationEntry::list(&pool, &params(|p| p.search = Some("Field".to_string())))
            .await
            .unwrap();
    assert_eq!(titles(&by_subtitle), ["Vinaya Studies"]);

    let no_hit = PublicationEntry::list(&pool, &params(|p| p.search = Some("algebra".to_string())))
        .await
        .unwrap();
    assert!(no_hit.is_empty());
}

#[tokio::test]
async fn ordering_param_is_whitelisted() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    // Descending year puts the undated book last.
    let by_year = PublicationEntry::list(&pool, &params(|p| p.ordering = Some("-year".to_string())))
        .await
        .unwrap();
    assert_eq!(titles(&by_year), ["Vinaya Studies", "Dhammapada", "Jataka Tales"]);

    // Unknown fields fall back to the default ordering.
    let bogus = PublicationEntry::list(&pool, &params(|p| p.ordering = Some("bogus".to_string())))
        .await
        .unwrap();
    assert_eq!(titles(&bogus), ["Jataka Tales", "Vinaya Studies", "Dhammapada"]);
}

// -------------------------------------------------------------------------
// Latest
// -------------------------------------------------------------------------

#[tokio::test]
async fn latest_returns_newest_first_with_limit() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let newest = PublicationEntry::latest(&pool, &params(|p| p.limit = Some("2".to_string())))
        .await
        .unwrap();
    assert_eq!(titles(&newest), ["Jataka Tales", "Vinaya Studies"]);

    // Fewer books than the default cap of six.
    let capped = PublicationEntry::latest(&pool, &BookListParams::default()).await.unwrap();
    assert_eq!(capped.len(), 3);
}

#[tokio::test]
async fn latest_ignores_search_and_ordering() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let books = PublicationEntry::latest(
        &pool,
        &params(|p| {
            p.search = Some("Dhammapada".to_string());
            p.ordering = Some("year".to_string());
        }),
    )
    .await
    .unwrap();

    // The active/featured/category chain applies, but not search or ordering.
    assert_eq!(titles(&books), ["Jataka Tales", "Vinaya Studies", "Dhammapada"]);
}

#[tokio::test]
async fn latest_limit_handles_bad_values() {
    let pool = common::test_pool().await;
    seed_library(&pool).await;

    let unparseable = PublicationEntry::latest(&pool, &params(|p| p.limit = Some("abc".to_string())))
        .await
        .unwrap();
    assert_eq!(unparseable.len(), 3);

    let negative = PublicationEntry::latest(&pool, &params(|p| p.limit = Some("-5".to_string())))
        .await
        .unwrap();
    assert!(negative.is_empty());
}

// -------------------------------------------------------------------------
// Detail gating
// -------------------------------------------------------------------------

#[tokio::test]
async fn detail_reads_and_writes_respect_the_gate() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    assert!(PublicationEntry::find_gated(&pool, seeded.archived.id, false)
        .await
        .unwrap()
        .is_none());
    assert!(PublicationEntry::find_gated(&pool, seeded.archived.id, true)
        .await
        .unwrap()
        .is_some());

    let blocked = PublicationEntry::update(&pool, seeded.archived.id, BookInput::default(), false)
        .await
        .unwrap();
    assert!(blocked.is_none());
    assert!(!PublicationEntry::delete(&pool, seeded.archived.id, false).await.unwrap());

    // Lifting the gate reaches the row.
    assert!(PublicationEntry::delete(&pool, seeded.archived.id, true).await.unwrap());
    assert!(PublicationEntry::find_gated(&pool, seeded.archived.id, true)
        .await
        .unwrap()
        .is_none());
}

// -------------------------------------------------------------------------
// Validation
// -------------------------------------------------------------------------

#[tokio::test]
async fn create_requires_title_and_a_source() {
    let pool = common::test_pool().await;

    let err = PublicationEntry::create(&pool, BookInput::default()).await.unwrap_err();
    let messages = field_messages(err);

    assert_eq!(messages["title"], json!(["This field is required."]));
    assert_eq!(
        messages["non_field_errors"],
        json!(["Upload a PDF file or provide an external URL."])
    );
}

#[tokio::test]
async fn create_rejects_unknown_category() {
    let pool = common::test_pool().await;

    let err = PublicationEntry::create(
        &pool,
        BookInput {
            title: Some("Uncatalogued".to_string()),
            pdf_file: Some("uploads/library/uncatalogued.pdf".to_string()),
            category_id: Some(Some(999)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(
        field_messages(err),
        json!({"category_id": ["Invalid pk \"999\" - object does not exist."]})
    );
}

#[tokio::test]
async fn category_clears_with_explicit_null() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;
    assert_eq!(seeded.dhammapada.category_id, Some(seeded.pali.id));

    let patch = BookInput {
        category_id: Some(None),
        ..Default::default()
    };
    let detached = PublicationEntry::update(&pool, seeded.dhammapada.id, patch, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detached.category_id, None);

    // Absent keeps whatever is stored.
    let kept = PublicationEntry::update(&pool, seeded.dhammapada.id, BookInput::default(), false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.category_id, None);
}

#[tokio::test]
async fn external_url_must_be_well_formed() {
    let pool = common::test_pool().await;

    let err = PublicationEntry::create(
        &pool,
        BookInput {
            title: Some("Badly Linked".to_string()),
            external_url: Some("ftp://library.example.com/book".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(field_messages(err), json!({"external_url": ["Enter a valid URL."]}));
}

// -------------------------------------------------------------------------
// Book images
// -------------------------------------------------------------------------

#[tokio::test]
async fn images_belong_to_their_book() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    let first = PublicationImage::create(
        &pool,
        seeded.vinaya.id,
        PublicationImageInput {
            image: Some("uploads/library/images/plate-1.jpg".to_string()),
            caption: Some("Plate I".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let second = PublicationImage::create(
        &pool,
        seeded.vinaya.id,
        PublicationImageInput {
            image: Some("uploads/library/images/plate-2.jpg".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let listed = PublicationImage::list_by_publication(&pool, seeded.vinaya.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);

    assert!(PublicationImage::list_by_publication(&pool, seeded.jataka.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn image_requires_a_file() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    let err = PublicationImage::create(&pool, seeded.vinaya.id, PublicationImageInput::default())
        .await
        .unwrap_err();

    assert_eq!(field_messages(err), json!({"image": ["This field is required."]}));
}

#[tokio::test]
async fn images_cascade_on_book_delete() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    let image = PublicationImage::create(
        &pool,
        seeded.dhammapada.id,
        PublicationImageInput {
            image: Some("uploads/library/images/cover-scan.jpg".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(PublicationEntry::delete(&pool, seeded.dhammapada.id, false).await.unwrap());
    assert!(PublicationImage::find_by_id(&pool, image.id).await.unwrap().is_none());
}

#[tokio::test]
async fn image_caption_updates_merge() {
    let pool = common::test_pool().await;
    let seeded = seed_library(&pool).await;

    let image = PublicationImage::create(
        &pool,
        seeded.vinaya.id,
        PublicationImageInput {
            image: Some("uploads/library/images/frontispiece.jpg".to_string()),
            caption: Some("Frontispiece".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let patch = PublicationImageInput {
        caption_si: Some("Sinhala caption".to_string()),
        ..Default::default()
    };
    let updated = PublicationImage::update(&pool, image.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.caption, "Frontispiece");
    assert_eq!(updated.caption_si, "Sinhala caption");
    assert_eq!(updated.image, "uploads/library/images/frontispiece.jpg");
}

// -------------------------------------------------------------------------
// Download links
// -------------------------------------------------------------------------

#[tokio::test]
async fn download_href_prefers_external_url() {
    let pool = common::test_pool().await;

    let linked = PublicationEntry::create(
        &pool,
        BookInput {
            title: Some("Hosted Elsewhere".to_string()),
            pdf_file: Some("uploads/library/mirror.pdf".to_string()),
            external_url: Some("https://mirror.example.com/book".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(linked.download_href(), "https://mirror.example.com/book");

    let local = PublicationEntry::create(
        &pool,
        BookInput {
            title: Some("Hosted Here".to_string()),
            pdf_file: Some("uploads/library/local.pdf".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(local.download_href(), "uploads/library/local.pdf");
}
