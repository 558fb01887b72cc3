//! Shared configuration constants for emailscrape
//!
//! Default values used by the config builder and the fetch pipeline.

use std::time::Duration;

/// Default per-request navigation timeout: 15 seconds
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 15;

/// Default settle delay after the document is parsed: 3 seconds
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Default bound on the best-effort network quiescence wait: 10 seconds
pub const DEFAULT_NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pacing delay for direct mode: 500 ms
pub const DEFAULT_DIRECT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default pacing delay for maps mode: 3 seconds
pub const DEFAULT_MAPS_REQUEST_DELAY: Duration = Duration::from_secs(3);

/// Default maximum number of fetches in flight
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Upper bound accepted for `max_concurrent`
pub const MAX_CONCURRENT_LIMIT: usize = 100;

/// Quiet window used by the network idle heuristic
///
/// The page counts as idle once no new resource entries have appeared
/// for this long.
/// Extra time every CDP request gets beyond the page timeout
pub const CDP_REQUEST_HEADROOM: Duration = Duration::from_secs(15);

/// Lower bound for the CDP request timeout
pub const MIN_CDP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const NETWORK_IDLE_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Polling interval for readiness checks inside a tab
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Desktop Chrome user agent sent with every request
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
