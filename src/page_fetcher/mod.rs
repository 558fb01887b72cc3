//! Loading one page and reading its visible text
//!
//! Load sequence per target:
//! 1. open a fresh tab and set the user agent
//! 2. navigate, bounded by the page timeout (failure here fails the target)
//! 3. wait the fixed settle delay
//! 4. wait for network quiescence, bounded and best-effort
//! 5. read visible text and title
//!
//! The tab is closed on every path.

mod errors;
pub mod page_timeout;

pub use errors::FetchError;

use std::time::Duration;
use tracing::{debug, warn};

use crate::engine::{BrowserEngine, BrowserTab};
use page_timeout::{Bounded, best_effort, with_page_timeout};

/// Per-load settings, usually built with `ScrapeConfig::fetch_options()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub page_timeout: Duration,
    pub settle_delay: Duration,
    pub network_idle_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        crate::config::ScrapeConfig::default().fetch_options()
    }
}

/// What a successful load produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Body text then head text, separated by a space
    pub text: String,
    pub title: Option<String>,
    /// Whether the page reached network quiescence before the idle timeout
    pub network_idle: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PageFetcher {
    options: FetchOptions,
}

impl PageFetcher {
    #[must_use]
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Load `url` in a fresh tab of `engine` and read its content
    ///
    /// # Errors
    ///
    /// A [`FetchError`] describing why this one target failed.
    pub async fn fetch(&self, engine: &dyn BrowserEngine, url: &str) -> Result<PageContent, FetchError> {
        let mut tab = self.open_tab(engine, url).await?;
        let outcome = self.load(tab.as_mut(), url).await;
        close_tab(tab, url).await;
        outcome
    }

    /// Open a tab carrying the configured user agent
    pub async fn open_tab(&self, engine: &dyn BrowserEngine, url: &str) -> Result<Box<dyn BrowserTab>, FetchError> {
        let mut tab = engine.open_tab().await.map_err(|e| FetchError::PageCreation {
            url: url.to_string(),
            message: format!("{e:#}"),
        })?;

        if let Err(e) = tab.set_user_agent(&self.options.user_agent).await {
            warn!("Failed to set user agent for {}: {:#}", url, e);
        }

        Ok(tab)
    }

    /// Navigate an already prepared tab and read it
    pub async fn load(&self, tab: &mut dyn BrowserTab, url: &str) -> Result<PageContent, FetchError> {
        let network_idle = self.navigate_and_settle(tab, url).await?;
        self.read_content(tab, url, network_idle).await
    }

    /// Steps 2-4 of the load sequence; returns whether the network went idle
    pub async fn navigate_and_settle(&self, tab: &mut dyn BrowserTab, url: &str) -> Result<bool, FetchError> {
        debug!("Navigating to {}", url);

        match with_page_timeout(tab.navigate(url), self.options.page_timeout).await {
            Bounded::Done(()) => {}
            Bounded::Failed(e) => {
                return Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: format!("{e:#}"),
                });
            }
            Bounded::TimedOut => {
                return Err(FetchError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: self.options.page_timeout.as_secs(),
                });
            }
        }

        tokio::time::sleep(self.options.settle_delay).await;

        let network_idle = best_effort(
            tab.wait_for_network_idle(),
            self.options.network_idle_timeout,
            "Network idle",
            url,
        )
        .await;

        Ok(network_idle)
    }

    /// Step 5 of the load sequence
    ///
    /// A missing title is not an error; unreadable text is.
    pub async fn read_content(
        &self,
        tab: &mut dyn BrowserTab,
        url: &str,
        network_idle: bool,
    ) -> Result<PageContent, FetchError> {
        let text = match with_page_timeout(tab.visible_text(), self.options.page_timeout).await {
            Bounded::Done(text) => text,
            Bounded::Failed(e) => {
                return Err(FetchError::Evaluation {
                    url: url.to_string(),
                    message: format!("{e:#}"),
                });
            }
            Bounded::TimedOut => {
                return Err(FetchError::Evaluation {
                    url: url.to_string(),
                    message: format!(
                        "reading page text timed out after {}s",
                        self.options.page_timeout.as_secs()
                    ),
                });
            }
        };

        let title = match with_page_timeout(tab.title(), self.options.page_timeout).await {
            Bounded::Done(title) => title,
            Bounded::Failed(e) => {
                debug!("No title for {}: {:#}", url, e);
                None
            }
            Bounded::TimedOut => None,
        };

        Ok(PageContent {
            text,
            title,
            network_idle,
        })
    }
}

/// Close a tab, logging instead of failing
pub async fn close_tab(tab: Box<dyn BrowserTab>, url: &str) {
    if let Err(e) = tab.close().await {
        warn!("Failed to close tab for {}: {:#}", url, e);
    }
}
