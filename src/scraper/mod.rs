//! Run drivers for direct and maps mode
//!
//! A run owns one `BrowserSession`. The session is released after dispatch
//! on every path: when dispatch returns an error, and through a drop guard
//! when the run future itself is cancelled.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::aggregator::RunSummary;
use crate::browser_session::{BrowserSession, SessionError};
use crate::config::{ScrapeConfig, ScrapeMode};
use crate::controller::{DispatchLimits, NoOpProgress, ProgressReporter, run_all};
use crate::email_extractor::extract;
use crate::engine::{BrowserEngine, ChromiumLauncher, EngineLauncher};
use crate::maps::{MapsResolver, detect_url_column, is_maps_url};
use crate::page_fetcher::PageFetcher;
use crate::scrape_types::{ScrapeResult, ScrapeTarget, SourceRow};
use crate::utils::normalize_target_url;

/// Run-level failures; per-target failures live in the results instead
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("No column with map-listing URLs found")]
    NoMapsColumn,

    #[error("Column '{0}' not found in input rows")]
    UnknownColumn(String),
}

/// Ordered results of one run plus its summary
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub mode: ScrapeMode,
    pub results: Vec<ScrapeResult>,
    pub summary: RunSummary,
}

impl ScrapeReport {
    fn empty(mode: ScrapeMode) -> Self {
        Self {
            mode,
            results: Vec::new(),
            summary: RunSummary::default(),
        }
    }
}

pub struct EmailScraper {
    config: ScrapeConfig,
    launcher: Arc<dyn EngineLauncher>,
    progress: Arc<dyn ProgressReporter>,
}

impl EmailScraper {
    /// Scraper that launches a local Chrome per run
    #[must_use]
    pub fn new(config: ScrapeConfig) -> Self {
        let launcher = Arc::new(ChromiumLauncher::new(config.clone()));
        Self::with_launcher(config, launcher)
    }

    #[must_use]
    pub fn with_launcher(config: ScrapeConfig, launcher: Arc<dyn EngineLauncher>) -> Self {
        Self {
            config,
            launcher,
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Scrape each URL directly
    ///
    /// # Errors
    ///
    /// Only [`ScrapeError::Session`], when the browser cannot be started.
    pub async fn scrape_urls<I, S>(&self, urls: I) -> Result<ScrapeReport, ScrapeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = urls.into_iter().map(ScrapeTarget::new).collect();
        self.run(ScrapeMode::Direct, targets).await
    }

    /// Resolve map listings in `rows` and scrape the websites they point to
    ///
    /// `url_column` names the listing column; `None` detects it. Rows whose
    /// value is not a map-listing URL are skipped.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::UnknownColumn`] or [`ScrapeError::NoMapsColumn`] when no
    /// listing column can be used, [`ScrapeError::Session`] when the browser
    /// cannot be started.
    pub async fn scrape_maps(
        &self,
        rows: Vec<SourceRow>,
        url_column: Option<&str>,
    ) -> Result<ScrapeReport, ScrapeError> {
        if rows.is_empty() {
            return Ok(ScrapeReport::empty(ScrapeMode::Maps));
        }

        let column = match url_column {
            Some(column) => {
                if !rows.iter().any(|row| row.get(column).is_some()) {
                    return Err(ScrapeError::UnknownColumn(column.to_string()));
                }
                column.to_string()
            }
            None => detect_url_column(&rows).ok_or(ScrapeError::NoMapsColumn)?,
        };
        info!("Using column '{}' for map listings", column);

        let total_rows = rows.len();
        let targets: Vec<ScrapeTarget> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let url = row.get(&column).unwrap_or_default().trim().to_string();
                if is_maps_url(&url) {
                    Some(ScrapeTarget::from_row(url, row))
                } else {
                    debug!("Skipping row {}: '{}' is not a map listing", index + 1, url);
                    None
                }
            })
            .collect();

        if targets.len() < total_rows {
            info!("Skipped {} rows without a map listing", total_rows - targets.len());
        }

        self.run(ScrapeMode::Maps, targets).await
    }

    async fn run(&self, mode: ScrapeMode, targets: Vec<ScrapeTarget>) -> Result<ScrapeReport, ScrapeError> {
        if targets.is_empty() {
            info!("Nothing to scrape");
            return Ok(ScrapeReport::empty(mode));
        }

        let session = SessionGuard::new(BrowserSession::new(Arc::clone(&self.launcher)));
        let outcome = self.dispatch(session.session(), mode, targets).await;
        session.release().await;
        outcome
    }

    async fn dispatch(
        &self,
        session: &BrowserSession,
        mode: ScrapeMode,
        targets: Vec<ScrapeTarget>,
    ) -> Result<ScrapeReport, ScrapeError> {
        let engine = session.acquire().await?;
        let limits = DispatchLimits::new(
            self.config.concurrency_for(mode),
            self.config.request_delay_for(mode),
        );
        let fetcher = PageFetcher::new(self.config.fetch_options());
        info!(
            "Starting {:?} run: {} targets, concurrency {}, delay {:?}",
            mode,
            targets.len(),
            limits.max_concurrent,
            limits.request_delay
        );

        let results = match mode {
            ScrapeMode::Direct => {
                let fetcher = Arc::new(fetcher);
                run_all(
                    targets,
                    limits,
                    move |target: ScrapeTarget| {
                        let engine = Arc::clone(&engine);
                        let fetcher = Arc::clone(&fetcher);
                        async move { scrape_direct(&fetcher, engine.as_ref(), &target.url).await }
                    },
                    self.progress.as_ref(),
                )
                .await
            }
            ScrapeMode::Maps => {
                let resolver = Arc::new(MapsResolver::new(fetcher, limits.request_delay));
                run_all(
                    targets,
                    limits,
                    move |target: ScrapeTarget| {
                        let engine = Arc::clone(&engine);
                        let resolver = Arc::clone(&resolver);
                        async move {
                            resolver
                                .resolve_and_scrape(
                                    engine.as_ref(),
                                    &target.url,
                                    target.source_row.clone().unwrap_or_default(),
                                )
                                .await
                        }
                    },
                    self.progress.as_ref(),
                )
                .await
            }
        };

        let summary = RunSummary::from_results(&results);
        self.progress.report_finished(&summary);
        Ok(ScrapeReport {
            mode,
            results,
            summary,
        })
    }
}

/// Releases its session on drop unless [`SessionGuard::release`] already ran
///
/// Drop cannot await, so the release is spawned onto the current runtime.
struct SessionGuard {
    session: Arc<BrowserSession>,
    released: bool,
}

impl SessionGuard {
    fn new(session: BrowserSession) -> Self {
        Self {
            session: Arc::new(session),
            released: false,
        }
    }

    fn session(&self) -> &BrowserSession {
        &self.session
    }

    async fn release(mut self) {
        self.released = true;
        self.session.release().await;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!("Run cancelled, releasing the browser session");
                let session = Arc::clone(&self.session);
                runtime.spawn(async move { session.release().await });
            }
            Err(_) => error!("Run cancelled outside a runtime, browser session not released"),
        }
    }
}

/// Fetch one direct target and turn the outcome into its result
///
/// `url` is kept verbatim in the result; the page loaded is its
/// `https://`-normalised form.
pub async fn scrape_direct(fetcher: &PageFetcher, engine: &dyn BrowserEngine, url: &str) -> ScrapeResult {
    let target_url = normalize_target_url(url);

    match fetcher.fetch(engine, &target_url).await {
        Ok(content) => {
            let emails = extract(&content.text);
            if !content.network_idle {
                debug!("{} was read before the network went idle", target_url);
            }
            info!("{}: {} emails found", target_url, emails.len());
            ScrapeResult::scraped(url, content.title.as_deref(), emails)
        }
        Err(e) => {
            warn!("{}: {}", e.url(), e);
            ScrapeResult::failed(url, e.to_string())
        }
    }
}
