//! Two-stage scraping of map listings
//!
//! Stage 1 loads the listing and looks for the business website. Stage 2
//! waits the pacing delay and loads that website in the same tab, then
//! extracts emails from it. Both stages use the PageFetcher load policy.

pub mod classify;
pub mod website;

pub use classify::{detect_url_column, is_maps_url, is_provider_url};

use std::time::Duration;
use tracing::{info, warn};

use crate::email_extractor::{EmailSet, extract};
use crate::engine::{BrowserEngine, BrowserTab};
use crate::page_fetcher::{FetchError, PageFetcher, close_tab};
use crate::scrape_types::{MapsDetails, MapsStatus, ScrapeResult, SourceRow};
use crate::utils::domain_of;

pub struct MapsResolver {
    fetcher: PageFetcher,
    request_delay: Duration,
}

impl MapsResolver {
    #[must_use]
    pub fn new(fetcher: PageFetcher, request_delay: Duration) -> Self {
        Self {
            fetcher,
            request_delay,
        }
    }

    /// Resolve a listing to its website and scrape that site for emails
    ///
    /// Never fails; every outcome is encoded in the result's status.
    pub async fn resolve_and_scrape(
        &self,
        engine: &dyn BrowserEngine,
        maps_url: &str,
        source_row: SourceRow,
    ) -> ScrapeResult {
        let mut tab = match self.fetcher.open_tab(engine, maps_url).await {
            Ok(tab) => tab,
            Err(e) => return stage_failed(maps_url, "", source_row, &e),
        };

        let result = self.scrape_listing(tab.as_mut(), maps_url, source_row).await;
        close_tab(tab, maps_url).await;
        result
    }

    async fn scrape_listing(&self, tab: &mut dyn BrowserTab, maps_url: &str, source_row: SourceRow) -> ScrapeResult {
        let website = match self.discover_website(tab, maps_url).await {
            Ok(Some(website)) => website,
            Ok(None) => {
                info!("No website found for {}", maps_url);
                return ScrapeResult {
                    url: maps_url.to_string(),
                    business: business_from_row(&source_row).unwrap_or_else(|| domain_of(maps_url)),
                    domain: domain_of(maps_url),
                    emails: EmailSet::new(),
                    error: None,
                    maps: Some(MapsDetails {
                        original_url: maps_url.to_string(),
                        website_url: String::new(),
                        status: MapsStatus::NoWebsiteFound,
                        source_row,
                    }),
                };
            }
            Err(e) => {
                warn!("Listing {} failed: {}", maps_url, e);
                return stage_failed(maps_url, "", source_row, &e);
            }
        };

        info!("Found website {} for {}", website, maps_url);
        tokio::time::sleep(self.request_delay).await;

        match self.fetcher.load(tab, &website).await {
            Ok(content) => {
                let emails = extract(&content.text);
                let status = MapsStatus::from_email_count(emails.len());
                info!("{}: {}", website, status);

                let mut result = ScrapeResult::scraped(&website, content.title.as_deref(), emails);
                if let Some(name) = business_from_row(&source_row) {
                    result.business = name;
                }
                result.url = maps_url.to_string();
                result.with_maps(MapsDetails {
                    original_url: maps_url.to_string(),
                    website_url: website,
                    status,
                    source_row,
                })
            }
            Err(e) => {
                warn!("Website {} for {} failed: {}", website, maps_url, e);
                stage_failed(maps_url, &website, source_row, &e)
            }
        }
    }

    /// Stage 1: load the listing and find the first acceptable website link
    ///
    /// # Errors
    ///
    /// Fails only when the listing page itself cannot be loaded.
    pub async fn discover_website(&self, tab: &mut dyn BrowserTab, maps_url: &str) -> Result<Option<String>, FetchError> {
        self.fetcher.navigate_and_settle(tab, maps_url).await?;

        if let Some(site) = website::website_from_links(tab).await {
            return Ok(Some(site));
        }

        let content = self.fetcher.read_content(tab, maps_url, false).await?;
        Ok(website::website_in_text(&content.text))
    }
}

/// Business name carried by the input row, when there is one
fn business_from_row(row: &SourceRow) -> Option<String> {
    ["name", "title", "business", "business_name"]
        .iter()
        .find_map(|column| {
            row.fields()
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
}

fn stage_failed(maps_url: &str, website_url: &str, source_row: SourceRow, error: &FetchError) -> ScrapeResult {
    let message = error.to_string();
    let mut result = ScrapeResult::failed(maps_url, message.clone());
    if !website_url.is_empty() {
        result.domain = domain_of(website_url);
        result.business = result.domain.clone();
    }
    if let Some(name) = business_from_row(&source_row) {
        result.business = name;
    }
    result.with_maps(MapsDetails {
        original_url: maps_url.to_string(),
        website_url: website_url.to_string(),
        status: MapsStatus::Error(message),
        source_row,
    })
}
