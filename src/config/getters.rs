//! Getter methods for `ScrapeConfig`

use std::path::PathBuf;
use std::time::Duration;

use super::types::{ScrapeConfig, ScrapeMode};
use crate::page_fetcher::FetchOptions;
use crate::utils::{DEFAULT_DIRECT_REQUEST_DELAY, DEFAULT_MAPS_REQUEST_DELAY};

impl ScrapeConfig {
    #[must_use]
    pub fn page_timeout_secs(&self) -> u64 {
        self.page_timeout_secs
    }

    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    #[must_use]
    pub fn network_idle_timeout(&self) -> Duration {
        self.network_idle_timeout
    }

    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn chrome_executable(&self) -> Option<&PathBuf> {
        self.chrome_executable.as_ref()
    }

    /// Pacing delay for a run in `mode`
    #[must_use]
    pub fn request_delay_for(&self, mode: ScrapeMode) -> Duration {
        match (self.request_delay, mode) {
            (Some(delay), _) => delay,
            (None, ScrapeMode::Direct) => DEFAULT_DIRECT_REQUEST_DELAY,
            (None, ScrapeMode::Maps) => DEFAULT_MAPS_REQUEST_DELAY,
        }
    }

    /// Effective concurrency for a run in `mode`
    ///
    /// Maps mode always runs one target at a time.
    #[must_use]
    pub fn concurrency_for(&self, mode: ScrapeMode) -> usize {
        match mode {
            ScrapeMode::Direct => self.max_concurrent,
            ScrapeMode::Maps => 1,
        }
    }

    /// Navigation, settle and identification settings for the page fetcher
    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_timeout: self.page_timeout(),
            settle_delay: self.settle_delay,
            network_idle_timeout: self.network_idle_timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}
