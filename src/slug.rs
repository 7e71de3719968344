//! Slug derivation and uniqueness probes.
//!
//! Slugs are derived from the English title when the caller does not supply
//! one. Duplicate slugs are rejected rather than suffixed; the UNIQUE index
//! on each slug column is the authoritative guard.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Convert text into a URL-safe slug, at most `max_len` bytes long.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with hyphens,
/// collapses consecutive hyphens, and trims leading/trailing hyphens.
pub fn slugify(text: &str, max_len: usize) -> String {
    let slug: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim
    let mut result = String::with_capacity(slug.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in slug.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    // Trim trailing hyphen
    while result.ends_with('-') {
        result.pop();
    }

    if result.len() > max_len {
        // result is ASCII here, but stay on char boundaries regardless
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        // Find a clean break point (don't cut in middle of word)
        let truncated = &result[..end];
        if let Some(last_hyphen) = truncated.rfind('-') {
            return truncated[..last_hyphen].to_string();
        }
        return truncated.to_string();
    }

    result
}

/// Check whether a slug is free in `table`, optionally ignoring one row
/// (the row being updated).
///
/// `table` is always a compile-time constant supplied by the model layer,
/// never caller input.
pub async fn slug_available(
    pool: &SqlitePool,
    table: &str,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => {
            sqlx::query_scalar(&format!(
                "SELECT COUNT(*) FROM {table} WHERE slug = ? AND id != ?"
            ))
            .bind(slug)
            .bind(id)
            .fetch_one(pool)
            .await
        }
        None => {
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE slug = ?"))
                .bind(slug)
                .fetch_one(pool)
                .await
        }
    }
    .context("failed to check slug uniqueness")?;

    Ok(count == 0)
}
