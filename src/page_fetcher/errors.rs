//! Per-target fetch failures
//!
//! Every variant is recoverable at run level: it becomes the `error` of one
//! result and never aborts the run.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Scraping error: could not open a tab for {url}: {message}")]
    PageCreation { url: String, message: String },

    #[error("Page load failed: navigation timeout after {timeout_secs}s for {url}")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("Page load failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Scraping error: {message}")]
    Evaluation { url: String, message: String },
}

impl FetchError {
    /// Target the failure belongs to
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::PageCreation { url, .. }
            | Self::NavigationTimeout { url, .. }
            | Self::Navigation { url, .. }
            | Self::Evaluation { url, .. } => url,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout { .. })
    }
}
