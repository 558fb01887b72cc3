//! Core configuration types for scrape runs
//!
//! This module contains the main `ScrapeConfig` struct and the run mode that
//! decides how its concurrency and pacing values are applied.

use std::path::PathBuf;
use std::time::Duration;

use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_MAX_CONCURRENT, DEFAULT_NETWORK_IDLE_TIMEOUT,
    DEFAULT_PAGE_TIMEOUT_SECS, DEFAULT_SETTLE_DELAY,
};

/// How targets reach the page that is scraped for emails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMode {
    /// Each target URL is the page to scrape
    Direct,
    /// Each target is a map listing that must first be resolved to a website
    Maps,
}

/// Main configuration struct for scrape runs
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Timeout in seconds for navigating to a page until its document is parsed
    ///
    /// Default: 15 seconds
    pub(crate) page_timeout_secs: u64,

    /// Fixed wait after the document is parsed, before content is read
    ///
    /// Default: 3 seconds
    pub(crate) settle_delay: Duration,

    /// Upper bound on the best-effort wait for network quiescence
    ///
    /// Reaching this bound is not an error; the page is read as-is.
    ///
    /// Default: 10 seconds
    pub(crate) network_idle_timeout: Duration,

    /// Pacing delay a task keeps its concurrency slot after finishing
    ///
    /// `None` picks the mode default: 500 ms for direct mode, 3 s for maps mode.
    pub(crate) request_delay: Option<Duration>,

    /// Maximum number of fetches in flight (ignored in maps mode)
    ///
    /// Default: 10, Range: 1-100
    pub(crate) max_concurrent: usize,

    /// User agent sent with every page load
    pub(crate) user_agent: String,

    /// Run Chrome without a window
    ///
    /// Default: true
    pub(crate) headless: bool,

    /// Explicit Chrome/Chromium binary, bypassing discovery
    pub(crate) chrome_executable: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            settle_delay: DEFAULT_SETTLE_DELAY,
            network_idle_timeout: DEFAULT_NETWORK_IDLE_TIMEOUT,
            request_delay: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            user_agent: CHROME_USER_AGENT.to_string(),
            headless: true,
            chrome_executable: None,
        }
    }
}
