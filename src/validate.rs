//! Field validation helpers.
//!
//! Each helper appends messages to a [`FieldErrors`] collection; callers run
//! every check before deciding the fate of a write, so a single response
//! reports all offending fields at once.

use email_address::EmailAddress;
use url::Url;

use crate::error::FieldErrors;

/// Required string: must contain something other than whitespace.
pub fn require(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
    }
}

/// Maximum length in characters, matching the admin form limits.
pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

/// E-mail syntax check. Empty values pass; pair with [`require`] when the
/// field is mandatory.
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    if EmailAddress::parse_with_options(value, Default::default()).is_err() {
        errors.add(field, "Enter a valid email address.");
    }
}

/// URL check: http/https scheme with a host. Empty values pass.
pub fn http_url(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let valid = Url::parse(value)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .is_some();
    if !valid {
        errors.add(field, "Enter a valid URL.");
    }
}

/// Slug charset check: letters, digits, hyphens, underscores.
pub fn slug_format(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        errors.add(
            field,
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens.",
        );
    }
}

/// Position/priority style integers may not go below zero.
pub fn non_negative(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
}
