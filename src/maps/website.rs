//! Finding the outbound business website on a listing page

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::classify::is_provider_url;
use crate::engine::BrowserTab;
use crate::utils::is_valid_url;

/// `(selector, attribute)` pairs tried in priority order
pub const WEBSITE_SELECTORS: &[(&str, &str)] = &[
    (r#"a[data-item-id="authority"]"#, "href"),
    (r#"a[aria-label*="website" i]"#, "href"),
    (r#"a[href^="http"]:not([href*="google."])"#, "href"),
    (r#"[data-value*="http"]"#, "data-value"),
    (r#"a[target="_blank"]"#, "href"),
];

static URL_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("URL_IN_TEXT is a valid regex"));

/// The provider's click-tracking wrapper (`/url?q=<target>`)
fn unwrap_redirect(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.path() != "/url" || !is_provider_url(raw) {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "q" || key == "url")
        .map(|(_, value)| value.into_owned())
}

/// Normalise one candidate link, or reject it
///
/// Accepts absolute http(s) URLs that do not belong to the map provider.
#[must_use]
pub fn accept_candidate(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')' | ']' | '\''));

    let candidate = unwrap_redirect(trimmed).unwrap_or_else(|| trimmed.to_string());

    (is_valid_url(&candidate) && !is_provider_url(&candidate)).then_some(candidate)
}

/// First acceptable URL literal in rendered text
#[must_use]
pub fn website_in_text(text: &str) -> Option<String> {
    URL_IN_TEXT
        .find_iter(text)
        .find_map(|found| accept_candidate(found.as_str()))
}

/// Structural link patterns of the loaded listing page, in priority order
///
/// A selector that cannot be evaluated is skipped.
pub async fn website_from_links(tab: &mut dyn BrowserTab) -> Option<String> {
    for (selector, attribute) in WEBSITE_SELECTORS {
        match tab.attribute_values(selector, attribute).await {
            Ok(values) => {
                if let Some(site) = values.iter().find_map(|value| accept_candidate(value)) {
                    debug!("Website found via {}: {}", selector, site);
                    return Some(site);
                }
            }
            Err(e) => debug!("Selector {} failed: {:#}", selector, e),
        }
    }
    None
}
