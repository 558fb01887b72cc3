//! Email address extraction from rendered page text
//!
//! Pure text-to-emails logic with no I/O. A single pattern recognises
//! `localpart@domain.tld`; matches are deduplicated case-insensitively while
//! keeping the casing and position of their first occurrence.

mod email_set;

pub use email_set::{EMAIL_SEPARATOR, EmailSet};

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Pattern for `localpart@domain.tld` with a TLD of two or more letters
pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(EMAIL_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("EMAIL_PATTERN is a valid regex")
});

/// Extract the distinct email addresses found in `text`, in discovery order.
///
/// Never fails; empty input yields an empty set.
#[must_use]
pub fn extract(text: &str) -> EmailSet {
    let mut emails = EmailSet::new();
    if text.is_empty() {
        return emails;
    }

    for found in EMAIL_REGEX.find_iter(text) {
        emails.insert(found.as_str());
    }

    emails
}

/// [`extract`] for text that may be absent.
#[must_use]
pub fn extract_optional(text: Option<&str>) -> EmailSet {
    text.map(extract).unwrap_or_default()
}
