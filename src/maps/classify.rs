//! Map-listing URL recognition and URL-column detection

use url::Url;

use crate::scrape_types::SourceRow;

/// Column-name fragments that suggest a URL field
const URL_COLUMN_HINTS: &[&str] = &["href", "link", "website", "url", "maps", "google"];

fn parse_lower(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    Some((host, parsed.path().to_ascii_lowercase()))
}

/// `google.<tld>` with any country suffix (`google.com`, `google.co.uk`)
fn is_google_host(host: &str) -> bool {
    host.strip_prefix("google.")
        .is_some_and(|tld| !tld.is_empty() && tld.split('.').all(|label| label.len() <= 3))
}

/// Whether `url` points at a map-provider place or listing page
#[must_use]
pub fn is_maps_url(url: &str) -> bool {
    match parse_lower(url) {
        Some((host, path)) => {
            (is_google_host(&host) && path.starts_with("/maps"))
                || host
                    .strip_prefix("maps.")
                    .is_some_and(is_google_host)
                || host == "maps.app.goo.gl"
                || (host == "goo.gl" && path.starts_with("/maps"))
        }
        None => {
            let lower = url.to_ascii_lowercase();
            lower.contains("google.com/maps") || lower.contains("maps.google.com")
        }
    }
}

/// Whether `url` belongs to the map provider itself rather than a business
#[must_use]
pub fn is_provider_url(url: &str) -> bool {
    if is_maps_url(url) {
        return true;
    }

    let Some((host, _)) = parse_lower(url) else {
        return false;
    };

    is_google_host(&host)
        || host.split('.').any(|label| label == "google")
        || ["gstatic.com", "googleusercontent.com", "googleapis.com", "ggpht.com", "goo.gl", "g.page"]
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// Pick the column holding map-listing URLs
///
/// The first column whose name contains a URL hint and whose values include
/// at least one map-listing URL wins. Without such a column, the first column
/// with any map-listing value is used.
#[must_use]
pub fn detect_url_column(rows: &[SourceRow]) -> Option<String> {
    let first = rows.first()?;
    let columns: Vec<&str> = first.columns().collect();

    let has_maps_value =
        |column: &str| rows.iter().any(|row| row.get(column).is_some_and(is_maps_url));

    let hinted = columns.iter().find(|column| {
        let lower = column.to_ascii_lowercase();
        URL_COLUMN_HINTS.iter().any(|hint| lower.contains(hint)) && has_maps_value(column)
    });

    hinted
        .or_else(|| columns.iter().find(|column| has_maps_value(column)))
        .map(|column| (*column).to_string())
}
