//! Library catalogue: book categories, book entries, and their images.
//!
//! Book lists go through a layered filter: an always-applied visibility
//! chain (`active`, `featured`, `category`) shared with the `latest`
//! operation, plus `year`, `search`, and `ordering` on the plain list.
//! The `category` parameter accepts either a numeric id or a slug.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sea_query::{Alias, Cond, Expr, LikeExpr, Order, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult, FieldErrors};
use crate::models::{blank_to_none, double_option, escape_like, parse_ordering};
use crate::slug;
use crate::validate;

const BOOK_COLUMNS: [&str; 19] = [
    "id",
    "category_id",
    "title",
    "title_si",
    "subtitle",
    "subtitle_si",
    "authors",
    "authors_si",
    "year",
    "description",
    "description_si",
    "cover",
    "pdf_file",
    "external_url",
    "published_at",
    "is_active",
    "is_featured",
    "created_at",
    "updated_at",
];

const BOOK_ORDERING_FIELDS: [&str; 4] = ["published_at", "created_at", "year", "title"];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicationCategory {
    pub id: i64,
    pub name: String,
    pub name_si: String,
    pub slug: String,
    pub description: String,
    pub description_si: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicationEntry {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub title_si: String,
    pub subtitle: String,
    pub subtitle_si: String,
    pub authors: String,
    pub authors_si: String,
    pub year: Option<i64>,
    pub description: String,
    pub description_si: String,
    pub cover: Option<String>,
    pub pdf_file: Option<String>,
    pub external_url: String,
    pub published_at: Option<NaiveDate>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicationImage {
    pub id: i64,
    pub publication_id: i64,
    pub image: String,
    pub caption: String,
    pub caption_si: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationCategoryInput {
    pub name: Option<String>,
    pub name_si: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    pub title: Option<String>,
    pub title_si: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_si: Option<String>,
    pub authors: Option<String>,
    pub authors_si: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i64>>,
    pub description: Option<String>,
    pub description_si: Option<String>,
    pub cover: Option<String>,
    pub pdf_file: Option<String>,
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationImageInput {
    pub image: Option<String>,
    pub caption: Option<String>,
    pub caption_si: Option<String>,
}

/// Book list query parameters. `limit` only takes effect on `latest`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListParams {
    pub active: Option<String>,
    pub featured: Option<String>,
    pub category: Option<String>,
    pub year: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<String>,
}

impl BookListParams {
    /// Inactive rows stay hidden unless the caller passes `active=false`.
    pub fn include_inactive(&self) -> bool {
        self.active
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("false"))
    }
}

impl PublicationCategory {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let category = sqlx::query_as::<_, Self>(
            "SELECT id, name, name_si, slug, description, description_si, position, created_at, updated_at FROM publication_categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch publication category")?;

        Ok(category)
    }

    /// List categories, optionally narrowed by a name/description search.
    pub async fn list(pool: &SqlitePool, search: Option<&str>) -> AppResult<Vec<Self>> {
        let mut query = String::from(
            "SELECT id, name, name_si, slug, description, description_si, position, created_at, updated_at FROM publication_categories WHERE 1=1",
        );
        let term = search.map(str::trim).filter(|s| !s.is_empty());
        if term.is_some() {
            query.push_str(
                r" AND (name LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\')",
            );
        }
        query.push_str(" ORDER BY position, name, id");

        let mut query_builder = sqlx::query_as::<_, Self>(&query);
        if let Some(term) = term {
            let pattern = format!("%{}%", escape_like(term));
            query_builder = query_builder.bind(pattern.clone()).bind(pattern);
        }

        let categories = query_builder
            .fetch_all(pool)
            .await
            .context("failed to list publication categories")?;

        Ok(categories)
    }

    pub async fn create(pool: &SqlitePool, input: PublicationCategoryInput) -> AppResult<Self> {
        let name = input.name.unwrap_or_default();
        let name_si = input.name_si.unwrap_or_default();
        let requested_slug = input.slug.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let position = input.position.unwrap_or(0);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "name", &name);
        validate::max_len(&mut errors, "name", &name, 200);
        validate::max_len(&mut errors, "name_si", &name_si, 200);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 220);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        if !Self::name_available(pool, &name, None).await? {
            return Err(AppError::field(
                "name",
                "publication category with this name already exists.",
            ));
        }

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&name, 220)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "publication_categories", &slug_value, None).await? {
            return Err(AppError::field(
                "slug",
                "publication category with this slug already exists.",
            ));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publication_categories (name, name_si, slug, description, description_si, position)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&slug_value)
        .bind(&description)
        .bind(&description_si)
        .bind(position)
        .fetch_one(pool)
        .await
        .context("failed to create publication category")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created publication category"))
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: PublicationCategoryInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(current.name);
        let name_si = input.name_si.unwrap_or(current.name_si);
        let requested_slug = input.slug.unwrap_or(current.slug);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let position = input.position.unwrap_or(current.position);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "name", &name);
        validate::max_len(&mut errors, "name", &name, 200);
        validate::max_len(&mut errors, "name_si", &name_si, 200);
        validate::slug_format(&mut errors, "slug", &requested_slug);
        validate::max_len(&mut errors, "slug", &requested_slug, 220);
        validate::non_negative(&mut errors, "position", position);
        errors.into_result()?;

        if !Self::name_available(pool, &name, Some(id)).await? {
            return Err(AppError::field(
                "name",
                "publication category with this name already exists.",
            ));
        }

        let slug_value = if requested_slug.is_empty() {
            slug::slugify(&name, 220)
        } else {
            requested_slug
        };
        if !slug::slug_available(pool, "publication_categories", &slug_value, Some(id)).await? {
            return Err(AppError::field(
                "slug",
                "publication category with this slug already exists.",
            ));
        }

        sqlx::query(
            r#"
            UPDATE publication_categories
            SET name = ?, name_si = ?, slug = ?, description = ?, description_si = ?, position = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(&name_si)
        .bind(&slug_value)
        .bind(&description)
        .bind(&description_si)
        .bind(position)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update publication category")?;

        Self::find_by_id(pool, id).await
    }

    /// Delete a category. Its books survive with a cleared category.
    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM publication_categories WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete publication category")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publication_categories WHERE id = ?)")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to check publication category existence")?;

        Ok(exists)
    }

    pub async fn publication_count(pool: &SqlitePool, id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM publication_entries WHERE category_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to count category books")?;

        Ok(count)
    }

    async fn name_available(
        pool: &SqlitePool,
        name: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM publication_categories WHERE name = ? AND id != ?",
                )
                .bind(name)
                .bind(id)
                .fetch_one(pool)
                .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM publication_categories WHERE name = ?")
                    .bind(name)
                    .fetch_one(pool)
                    .await
            }
        }
        .context("failed to check category name availability")?;

        Ok(count == 0)
    }
}

impl PublicationEntry {
    /// Where a reader should be sent for the full text. The external URL
    /// wins over a stored file.
    pub fn download_href(&self) -> &str {
        if !self.external_url.is_empty() {
            return &self.external_url;
        }
        self.pdf_file.as_deref().unwrap_or("")
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let book = sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM publication_entries WHERE id = ?",
            select_book_columns()
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch book")?;

        Ok(book)
    }

    /// Fetch one book honoring the active-row gate.
    pub async fn find_gated(
        pool: &SqlitePool,
        id: i64,
        include_inactive: bool,
    ) -> AppResult<Option<Self>> {
        if include_inactive {
            return Self::find_by_id(pool, id).await;
        }

        let book = sqlx::query_as::<_, Self>(&format!(
            "SELECT {} FROM publication_entries WHERE id = ? AND is_active = TRUE",
            select_book_columns()
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch book")?;

        Ok(book)
    }

    pub async fn list(pool: &SqlitePool, params: &BookListParams) -> AppResult<Vec<Self>> {
        let sql = build_book_list_query(params);
        let books = sqlx::query_as::<_, Self>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list books")?;

        Ok(books)
    }

    /// Most recently published books, for homepage strips.
    pub async fn latest(pool: &SqlitePool, params: &BookListParams) -> AppResult<Vec<Self>> {
        let sql = build_latest_query(params);
        let books = sqlx::query_as::<_, Self>(&sql)
            .fetch_all(pool)
            .await
            .context("failed to list latest books")?;

        Ok(books)
    }

    pub async fn create(pool: &SqlitePool, input: BookInput) -> AppResult<Self> {
        let category_id = input.category_id.unwrap_or_default();
        let title = input.title.unwrap_or_default();
        let title_si = input.title_si.unwrap_or_default();
        let subtitle = input.subtitle.unwrap_or_default();
        let subtitle_si = input.subtitle_si.unwrap_or_default();
        let authors = input.authors.unwrap_or_default();
        let authors_si = input.authors_si.unwrap_or_default();
        let year = input.year.unwrap_or_default();
        let description = input.description.unwrap_or_default();
        let description_si = input.description_si.unwrap_or_default();
        let cover = blank_to_none(input.cover);
        let pdf_file = blank_to_none(input.pdf_file);
        let external_url = input.external_url.unwrap_or_default();
        let published_at = input.published_at.unwrap_or_default();
        let is_active = input.is_active.unwrap_or(true);
        let is_featured = input.is_featured.unwrap_or(false);

        validate_book_fields(
            &title,
            &title_si,
            &subtitle,
            &subtitle_si,
            &authors,
            &authors_si,
            year,
            &external_url,
            pdf_file.as_deref(),
        )?;
        check_book_category(pool, category_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publication_entries (
                category_id, title, title_si, subtitle, subtitle_si, authors, authors_si,
                year, description, description_si, cover, pdf_file, external_url,
                published_at, is_active, is_featured
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(category_id)
        .bind(&title)
        .bind(&title_si)
        .bind(&subtitle)
        .bind(&subtitle_si)
        .bind(&authors)
        .bind(&authors_si)
        .bind(year)
        .bind(&description)
        .bind(&description_si)
        .bind(&cover)
        .bind(&pdf_file)
        .bind(&external_url)
        .bind(published_at)
        .bind(is_active)
        .bind(is_featured)
        .fetch_one(pool)
        .await
        .context("failed to create book")?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("failed to fetch created book")))
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: BookInput,
        include_inactive: bool,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_gated(pool, id, include_inactive).await? else {
            return Ok(None);
        };

        let category_id = input.category_id.unwrap_or(current.category_id);
        let title = input.title.unwrap_or(current.title);
        let title_si = input.title_si.unwrap_or(current.title_si);
        let subtitle = input.subtitle.unwrap_or(current.subtitle);
        let subtitle_si = input.subtitle_si.unwrap_or(current.subtitle_si);
        let authors = input.authors.unwrap_or(current.authors);
        let authors_si = input.authors_si.unwrap_or(current.authors_si);
        let year = input.year.unwrap_or(current.year);
        let description = input.description.unwrap_or(current.description);
        let description_si = input.description_si.unwrap_or(current.description_si);
        let cover = match input.cover {
            Some(value) => blank_to_none(Some(value)),
            None => current.cover,
        };
        let pdf_file = match input.pdf_file {
            Some(value) => blank_to_none(Some(value)),
            None => current.pdf_file,
        };
        let external_url = input.external_url.unwrap_or(current.external_url);
        let published_at = input.published_at.unwrap_or(current.published_at);
        let is_active = input.is_active.unwrap_or(current.is_active);
        let is_featured = input.is_featured.unwrap_or(current.is_featured);

        validate_book_fields(
            &title,
            &title_si,
            &subtitle,
            &subtitle_si,
            &authors,
            &authors_si,
            year,
            &external_url,
            pdf_file.as_deref(),
        )?;
        check_book_category(pool, category_id).await?;

        sqlx::query(
            r#"
            UPDATE publication_entries
            SET category_id = ?, title = ?, title_si = ?, subtitle = ?, subtitle_si = ?,
                authors = ?, authors_si = ?, year = ?, description = ?, description_si = ?,
                cover = ?, pdf_file = ?, external_url = ?, published_at = ?,
                is_active = ?, is_featured = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(category_id)
        .bind(&title)
        .bind(&title_si)
        .bind(&subtitle)
        .bind(&subtitle_si)
        .bind(&authors)
        .bind(&authors_si)
        .bind(year)
        .bind(&description)
        .bind(&description_si)
        .bind(&cover)
        .bind(&pdf_file)
        .bind(&external_url)
        .bind(published_at)
        .bind(is_active)
        .bind(is_featured)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update book")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64, include_inactive: bool) -> AppResult<bool> {
        let sql = if include_inactive {
            "DELETE FROM publication_entries WHERE id = ?"
        } else {
            "DELETE FROM publication_entries WHERE id = ? AND is_active = TRUE"
        };
        let result = sqlx::query(sql)
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete book")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM publication_entries WHERE id = ?)")
                .bind(id)
                .fetch_one(pool)
                .await
                .context("failed to check book existence")?;

        Ok(exists)
    }
}

impl PublicationImage {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Self>> {
        let image = sqlx::query_as::<_, Self>(
            "SELECT id, publication_id, image, caption, caption_si, created_at, updated_at FROM publication_images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch book image")?;

        Ok(image)
    }

    pub async fn list_by_publication(
        pool: &SqlitePool,
        publication_id: i64,
    ) -> AppResult<Vec<Self>> {
        let images = sqlx::query_as::<_, Self>(
            "SELECT id, publication_id, image, caption, caption_si, created_at, updated_at FROM publication_images WHERE publication_id = ? ORDER BY created_at, id",
        )
        .bind(publication_id)
        .fetch_all(pool)
        .await
        .context("failed to list book images")?;

        Ok(images)
    }

    pub async fn create(
        pool: &SqlitePool,
        publication_id: i64,
        input: PublicationImageInput,
    ) -> AppResult<Self> {
        let image = input.image.unwrap_or_default();
        let caption = input.caption.unwrap_or_default();
        let caption_si = input.caption_si.unwrap_or_default();

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "image", &image);
        validate::max_len(&mut errors, "caption", &caption, 255);
        validate::max_len(&mut errors, "caption_si", &caption_si, 255);
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO publication_images (publication_id, image, caption, caption_si)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(publication_id)
        .bind(&image)
        .bind(&caption)
        .bind(&caption_si)
        .fetch_one(pool)
        .await
        .context("failed to create book image")?;

        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("failed to fetch created book image"))
        })
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        input: PublicationImageInput,
    ) -> AppResult<Option<Self>> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let image = input.image.unwrap_or(current.image);
        let caption = input.caption.unwrap_or(current.caption);
        let caption_si = input.caption_si.unwrap_or(current.caption_si);

        let mut errors = FieldErrors::new();
        validate::require(&mut errors, "image", &image);
        validate::max_len(&mut errors, "caption", &caption, 255);
        validate::max_len(&mut errors, "caption_si", &caption_si, 255);
        errors.into_result()?;

        sqlx::query(
            r#"
            UPDATE publication_images
            SET image = ?, caption = ?, caption_si = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&image)
        .bind(&caption)
        .bind(&caption_si)
        .bind(id)
        .execute(pool)
        .await
        .context("failed to update book image")?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM publication_images WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete book image")?;

        Ok(result.rows_affected() > 0)
    }
}

fn select_book_columns() -> String {
    BOOK_COLUMNS.join(", ")
}

#[allow(clippy::too_many_arguments)]
fn validate_book_fields(
    title: &str,
    title_si: &str,
    subtitle: &str,
    subtitle_si: &str,
    authors: &str,
    authors_si: &str,
    year: Option<i64>,
    external_url: &str,
    pdf_file: Option<&str>,
) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    validate::require(&mut errors, "title", title);
    validate::max_len(&mut errors, "title", title, 255);
    validate::max_len(&mut errors, "title_si", title_si, 255);
    validate::max_len(&mut errors, "subtitle", subtitle, 255);
    validate::max_len(&mut errors, "subtitle_si", subtitle_si, 255);
    validate::max_len(&mut errors, "authors", authors, 255);
    validate::max_len(&mut errors, "authors_si", authors_si, 255);
    if let Some(value) = year {
        validate::non_negative(&mut errors, "year", value);
    }
    validate::http_url(&mut errors, "external_url", external_url);
    if external_url.trim().is_empty() && pdf_file.is_none() {
        errors.add(
            "non_field_errors",
            "Upload a PDF file or provide an external URL.",
        );
    }
    errors.into_result()
}

async fn check_book_category(pool: &SqlitePool, category_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = category_id {
        if !PublicationCategory::exists(pool, id).await? {
            return Err(AppError::field(
                "category_id",
                format!("Invalid pk \"{id}\" - object does not exist."),
            ));
        }
    }
    Ok(())
}

/// Filter chain applied to every book read, `latest` included.
fn book_filter_cond(params: &BookListParams) -> Cond {
    let mut cond = Cond::all();

    if !params.include_inactive() {
        cond = cond.add(Expr::col(Alias::new("is_active")).eq(true));
    }

    let featured = params
        .featured
        .as_deref()
        .is_some_and(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"));
    if featured {
        cond = cond.add(Expr::col(Alias::new("is_featured")).eq(true));
    }

    if let Some(value) = params.category.as_deref().filter(|v| !v.is_empty()) {
        if value.chars().all(|c| c.is_ascii_digit()) {
            match value.parse::<i64>() {
                Ok(id) => cond = cond.add(Expr::col(Alias::new("category_id")).eq(id)),
                // Digit strings too long for an id match nothing.
                Err(_) => cond = cond.add(Expr::cust("FALSE")),
            }
        } else {
            let mut sub = Query::select();
            sub.column(Alias::new("id"))
                .from(Alias::new("publication_categories"))
                .and_where(Expr::col(Alias::new("slug")).eq(value));
            cond = cond.add(Expr::col(Alias::new("category_id")).in_subquery(sub));
        }
    }

    cond
}

fn build_book_list_query(params: &BookListParams) -> String {
    let mut query = Query::select();
    query
        .columns(BOOK_COLUMNS.map(Alias::new))
        .from(Alias::new("publication_entries"));

    let mut cond = book_filter_cond(params);

    if let Some(value) = params.year.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        match value.parse::<i64>() {
            Ok(year) => cond = cond.add(Expr::col(Alias::new("year")).eq(year)),
            Err(_) => cond = cond.add(Expr::cust("FALSE")),
        }
    }

    if let Some(term) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{}%", escape_like(term));
        let mut any = Cond::any();
        for column in ["title", "subtitle", "authors", "description"] {
            any = any.add(
                Expr::col(Alias::new(column)).like(LikeExpr::new(pattern.clone()).escape('\\')),
            );
        }
        cond = cond.add(any);
    }

    query.cond_where(cond);

    let parsed = params
        .ordering
        .as_deref()
        .map(|raw| parse_ordering(raw, &BOOK_ORDERING_FIELDS))
        .unwrap_or_default();
    if parsed.is_empty() {
        query
            .order_by(Alias::new("published_at"), Order::Desc)
            .order_by(Alias::new("created_at"), Order::Desc)
            .order_by(Alias::new("id"), Order::Desc);
    } else {
        for (field, order) in parsed {
            query.order_by(Alias::new(field), order);
        }
        query.order_by(Alias::new("id"), Order::Asc);
    }

    query.to_string(SqliteQueryBuilder)
}

fn build_latest_query(params: &BookListParams) -> String {
    let mut query = Query::select();
    query
        .columns(BOOK_COLUMNS.map(Alias::new))
        .from(Alias::new("publication_entries"))
        .cond_where(book_filter_cond(params))
        .order_by(Alias::new("published_at"), Order::Desc)
        .order_by(Alias::new("created_at"), Order::Desc)
        .order_by(Alias::new("id"), Order::Desc)
        .limit(latest_limit(params.limit.as_deref()));

    query.to_string(SqliteQueryBuilder)
}

/// Row cap for `latest`. Absent or unparseable values fall back to 6,
/// negative values clamp to zero.
fn latest_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map_or(6, |n| u64::try_from(n).unwrap_or(0))
}
