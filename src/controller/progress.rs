//! Progress reporting for scrape runs
//!
//! Defines the `ProgressReporter` trait for run lifecycle events and provides
//! a no-op and a log-backed implementation.

use tracing::info;

use crate::aggregator::RunSummary;

/// Hook for run progress
///
/// Called from the task collecting results, never from inside a fetch.
pub trait ProgressReporter: Send + Sync {
    /// Report that `total` targets were scheduled
    fn report_started(&self, total: usize);

    /// Report that one more target settled
    fn report_target_completed(&self, done: usize, total: usize, url: &str, ok: bool);

    /// Report the final counts
    fn report_finished(&self, summary: &RunSummary);
}

/// Progress reporter that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_started(&self, _total: usize) {}

    #[inline(always)]
    fn report_target_completed(&self, _done: usize, _total: usize, _url: &str, _ok: bool) {}

    #[inline(always)]
    fn report_finished(&self, _summary: &RunSummary) {}
}

/// Progress reporter writing one `info!` line per event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_started(&self, total: usize) {
        info!("Scraping {} targets", total);
    }

    fn report_target_completed(&self, done: usize, total: usize, url: &str, ok: bool) {
        let outcome = if ok { "done" } else { "failed" };
        info!("[{}/{}] {} {}", done, total, outcome, url);
    }

    fn report_finished(&self, summary: &RunSummary) {
        info!("Finished: {}", summary);
    }
}
