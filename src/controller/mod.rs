//! Bounded, paced dispatch of scrape tasks
//!
//! Every target is spawned at once. A counting semaphore limits how many run
//! at a time, and each task keeps its slot for the pacing delay after its
//! fetch settles, so the delay gates slot release rather than task start.
//! A panicking task becomes a failure result for its own target. Dropping
//! the `run_all` future aborts every task it spawned.

pub mod progress;

pub use progress::{LogProgress, NoOpProgress, ProgressReporter};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error};

use crate::aggregator::ResultAggregator;
use crate::scrape_types::{ScrapeResult, ScrapeTarget};

/// Concurrency cap and pacing for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchLimits {
    /// Clamped to `1..=Semaphore::MAX_PERMITS` at dispatch
    pub max_concurrent: usize,
    pub request_delay: Duration,
}

impl DispatchLimits {
    #[must_use]
    pub fn new(max_concurrent: usize, request_delay: Duration) -> Self {
        Self {
            max_concurrent,
            request_delay,
        }
    }

    /// One target at a time
    #[must_use]
    pub fn serial(request_delay: Duration) -> Self {
        Self::new(1, request_delay)
    }

    fn permits(&self) -> usize {
        self.max_concurrent.clamp(1, Semaphore::MAX_PERMITS)
    }
}

/// Join handle that aborts its task when dropped unfinished
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run `fetch` for every target and return results in target order
///
/// Never fails: faults and panics inside a task are converted to a failure
/// result whose error starts with `Exception:`.
pub async fn run_all<F, Fut>(
    targets: Vec<ScrapeTarget>,
    limits: DispatchLimits,
    fetch: F,
    progress: &dyn ProgressReporter,
) -> Vec<ScrapeResult>
where
    F: Fn(ScrapeTarget) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ScrapeResult> + Send + 'static,
{
    let total = targets.len();
    progress.report_started(total);

    let semaphore = Arc::new(Semaphore::new(limits.permits()));
    let fetch = Arc::new(fetch);
    let mut active_tasks = FuturesUnordered::new();

    for (index, target) in targets.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetch = Arc::clone(&fetch);
        let request_delay = limits.request_delay;

        let handle = AbortOnDrop(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err("concurrency limiter closed".to_string());
            };

            let result = fetch(target).await;

            tokio::time::sleep(request_delay).await;
            Ok(result)
        }));

        active_tasks.push(async move { (index, handle.await) });
    }

    let mut aggregator = ResultAggregator::new(total);
    let mut done = 0;

    while let Some((index, joined)) = active_tasks.next().await {
        let url = targets[index].url.as_str();

        let result = match joined {
            Ok(Ok(result)) => result,
            Ok(Err(message)) => {
                error!("Task for {} could not run: {}", url, message);
                ScrapeResult::failed(url, format!("Exception: {message}"))
            }
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    join_error.to_string()
                };
                error!("Task for {} panicked: {}", url, message);
                ScrapeResult::failed(url, format!("Exception: {message}"))
            }
        };

        done += 1;
        debug!("Target #{} settled ({}/{})", index, done, total);
        progress.report_target_completed(done, total, url, result.is_success());
        aggregator.record(index, result);
    }

    aggregator.finish(&targets)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
