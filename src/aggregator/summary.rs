use serde::Serialize;
use std::fmt;

use crate::email_extractor::EMAIL_SEPARATOR;
use crate::scrape_types::ScrapeResult;

/// Run-level counts derived from the final results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    /// Results without an error
    pub successful: usize,
    pub failed: usize,
    /// Emails across all results, counted from their comma-joined form
    pub total_emails: usize,
    /// Results with at least one email
    pub urls_with_emails: usize,
    /// Maps-mode results that resolved to a website
    pub websites_found: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_results(results: &[ScrapeResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            let error = result.error.as_deref().unwrap_or_default();
            if error.is_empty() {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }

            let emails = count_joined(&result.emails.joined());
            summary.total_emails += emails;
            if emails > 0 {
                summary.urls_with_emails += 1;
            }

            if result
                .maps
                .as_ref()
                .is_some_and(|maps| !maps.website_url.is_empty())
            {
                summary.websites_found += 1;
            }
        }

        summary
    }
}

/// Entries in a comma-joined email cell; blank entries are not counted
fn count_joined(cell: &str) -> usize {
    cell.split(EMAIL_SEPARATOR.trim())
        .filter(|entry| !entry.trim().is_empty())
        .count()
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} successful, {} failed, {} emails from {} URLs",
            self.total, self.successful, self.failed, self.total_emails, self.urls_with_emails
        )?;
        if self.websites_found > 0 {
            write!(f, ", {} websites found", self.websites_found)?;
        }
        Ok(())
    }
}
