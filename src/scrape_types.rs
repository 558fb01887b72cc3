//! Targets and per-target results

use serde::Serialize;
use std::fmt;

use crate::email_extractor::EmailSet;
use crate::utils::{domain_of, normalize_target_url};

/// One input row as ordered `(column, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    fields: Vec<(String, String)>,
}

impl SourceRow {
    #[must_use]
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    /// The URL exactly as it appeared in the input
    pub url: String,
    /// The input row the URL came from, in maps mode
    pub source_row: Option<SourceRow>,
}

impl ScrapeTarget {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source_row: None,
        }
    }

    #[must_use]
    pub fn from_row(url: impl Into<String>, row: SourceRow) -> Self {
        Self {
            url: url.into(),
            source_row: Some(row),
        }
    }
}

/// Per-row outcome of maps mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapsStatus {
    EmailsFound(usize),
    NoEmailsFound,
    NoWebsiteFound,
    Error(String),
}

impl MapsStatus {
    #[must_use]
    pub fn from_email_count(count: usize) -> Self {
        if count == 0 {
            Self::NoEmailsFound
        } else {
            Self::EmailsFound(count)
        }
    }
}

impl fmt::Display for MapsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailsFound(count) => write!(f, "{count} emails found"),
            Self::NoEmailsFound => f.write_str("No emails found"),
            Self::NoWebsiteFound => f.write_str("No website found"),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

impl Serialize for MapsStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps-mode details attached to a [`ScrapeResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapsDetails {
    pub original_url: String,
    /// Empty when no website was discovered
    pub website_url: String,
    pub status: MapsStatus,
    pub source_row: SourceRow,
}

/// Outcome for one target
///
/// **INVARIANT:** `error` is `Some` exactly when the target failed, and a
/// failed target carries no emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeResult {
    pub url: String,
    pub business: String,
    pub domain: String,
    pub emails: EmailSet,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsDetails>,
}

impl ScrapeResult {
    /// Successful direct-mode result
    ///
    /// `business` falls back to the domain when the title is missing or blank.
    #[must_use]
    pub fn scraped(url: &str, title: Option<&str>, emails: EmailSet) -> Self {
        let domain = domain_of(&normalize_target_url(url));
        let business = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| domain.clone(), str::to_string);

        Self {
            url: url.to_string(),
            business,
            domain,
            emails,
            error: None,
            maps: None,
        }
    }

    /// Failed result; business and domain both fall back to the URL's domain
    #[must_use]
    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        let domain = domain_of(&normalize_target_url(url));
        Self {
            url: url.to_string(),
            business: domain.clone(),
            domain,
            emails: EmailSet::new(),
            error: Some(error.into()),
            maps: None,
        }
    }

    #[must_use]
    pub fn with_maps(mut self, maps: MapsDetails) -> Self {
        self.maps = Some(maps);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
