pub mod aggregator;
pub mod browser_session;
pub mod browser_setup;
pub mod config;
pub mod controller;
pub mod email_extractor;
pub mod engine;
pub mod io;
pub mod maps;
pub mod page_fetcher;
pub mod scrape_types;
pub mod scraper;
pub mod utils;

pub use aggregator::{ResultAggregator, RunSummary, aggregate};
pub use browser_session::{BrowserSession, SessionError};
pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ConfigError, ScrapeConfig, ScrapeConfigBuilder, ScrapeMode};
pub use controller::{DispatchLimits, LogProgress, NoOpProgress, ProgressReporter, run_all};
pub use email_extractor::{EmailSet, extract};
pub use engine::{BrowserEngine, BrowserTab, ChromiumEngine, ChromiumLauncher, EngineLauncher};
pub use maps::{MapsResolver, detect_url_column, is_maps_url};
pub use page_fetcher::{FetchError, FetchOptions, PageContent, PageFetcher};
pub use scrape_types::{MapsDetails, MapsStatus, ScrapeResult, ScrapeTarget, SourceRow};
pub use scraper::{EmailScraper, ScrapeError, ScrapeReport};

/// Scrape `urls` directly with a local Chrome and default progress logging
///
/// # Errors
///
/// Returns [`ScrapeError::Session`] when the browser cannot be started.
pub async fn scrape_urls<I, S>(config: ScrapeConfig, urls: I) -> Result<ScrapeReport, ScrapeError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EmailScraper::new(config)
        .with_progress(std::sync::Arc::new(LogProgress))
        .scrape_urls(urls)
        .await
}
