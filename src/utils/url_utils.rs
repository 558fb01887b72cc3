//! URL helpers shared by the fetch pipeline and the result records.

use url::Url;

/// Prefix a bare host or path with `https://` when no web scheme is present.
///
/// Leading and trailing whitespace is removed first. An empty input stays empty.
#[must_use]
pub fn normalize_target_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Network location of a URL: host plus explicit port.
///
/// Falls back to the raw input when it cannot be parsed or has no host,
/// so a result record always carries something legible in `domain`.
#[must_use]
pub fn domain_of(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            },
            None => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Check if a URL is an absolute `http`/`https` URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
