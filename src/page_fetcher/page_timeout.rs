//! Timeout helpers for tab operations
//!
//! Engine operations have no deadline of their own, so every call the fetcher
//! makes goes through one of these.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of a bounded engine call
pub enum Bounded<T> {
    Done(T),
    Failed(anyhow::Error),
    TimedOut,
}

/// Run `operation` for at most `timeout`
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration) -> Bounded<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(Ok(value)) => Bounded::Done(value),
        Ok(Err(e)) => Bounded::Failed(e),
        Err(_) => Bounded::TimedOut,
    }
}

/// Wait for `operation` until `timeout`, treating failure and timeout alike
///
/// Returns `true` only when the operation completed successfully in time.
pub async fn best_effort<F>(operation: F, timeout: Duration, operation_name: &str, url: &str) -> bool
where
    F: Future<Output = Result<()>>,
{
    match with_page_timeout(operation, timeout).await {
        Bounded::Done(()) => true,
        Bounded::Failed(e) => {
            debug!("{} failed for {}: {:#}, continuing", operation_name, url, e);
            false
        }
        Bounded::TimedOut => {
            info!(
                "{} timeout after {:?} for {}, continuing",
                operation_name, timeout, url
            );
            false
        }
    }
}
