//! Builder for `ScrapeConfig`
//!
//! Chained setters with validation in `build()`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::types::ScrapeConfig;
use crate::utils::MAX_CONCURRENT_LIMIT;

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page timeout must be at least 1 second")]
    ZeroPageTimeout,

    #[error("max_concurrent must be between 1 and {max}, got {0}", max = MAX_CONCURRENT_LIMIT)]
    ConcurrencyOutOfRange(usize),

    #[error("user agent must not be empty")]
    EmptyUserAgent,

    #[error("chrome executable does not exist: {0}")]
    MissingChromeExecutable(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeConfigBuilder {
    page_timeout_secs: Option<u64>,
    settle_delay: Option<Duration>,
    network_idle_timeout: Option<Duration>,
    request_delay: Option<Duration>,
    max_concurrent: Option<usize>,
    user_agent: Option<String>,
    headless: Option<bool>,
    chrome_executable: Option<PathBuf>,
}

impl ScrapeConfig {
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::default()
    }
}

impl ScrapeConfigBuilder {
    #[must_use]
    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.page_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn network_idle_timeout(mut self, timeout: Duration) -> Self {
        self.network_idle_timeout = Some(timeout);
        self
    }

    /// Pacing delay; overrides the per-mode default
    #[must_use]
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    #[must_use]
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero page timeout, a concurrency limit
    /// outside `1..=100`, an empty user agent, or a chrome path that does not exist.
    pub fn build(self) -> Result<ScrapeConfig, ConfigError> {
        let defaults = ScrapeConfig::default();

        let page_timeout_secs = self.page_timeout_secs.unwrap_or(defaults.page_timeout_secs);
        if page_timeout_secs == 0 {
            return Err(ConfigError::ZeroPageTimeout);
        }

        let max_concurrent = self.max_concurrent.unwrap_or(defaults.max_concurrent);
        if !(1..=MAX_CONCURRENT_LIMIT).contains(&max_concurrent) {
            return Err(ConfigError::ConcurrencyOutOfRange(max_concurrent));
        }

        let user_agent = self.user_agent.unwrap_or(defaults.user_agent);
        if user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }

        if let Some(path) = &self.chrome_executable {
            if !path.exists() {
                return Err(ConfigError::MissingChromeExecutable(path.clone()));
            }
        }

        Ok(ScrapeConfig {
            page_timeout_secs,
            settle_delay: self.settle_delay.unwrap_or(defaults.settle_delay),
            network_idle_timeout: self
                .network_idle_timeout
                .unwrap_or(defaults.network_idle_timeout),
            request_delay: self.request_delay,
            max_concurrent,
            user_agent,
            headless: self.headless.unwrap_or(defaults.headless),
            chrome_executable: self.chrome_executable,
        })
    }
}
