//! Ordering per-target results and summarising a run
//!
//! Tasks finish in any order. `ResultAggregator` slots each result by the
//! index of its target so the output always lines up with the input.

mod summary;

pub use summary::RunSummary;

use tracing::warn;

use crate::scrape_types::{ScrapeResult, ScrapeTarget};

pub struct ResultAggregator {
    slots: Vec<Option<ScrapeResult>>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            slots: vec![None; expected],
        }
    }

    /// Store the result for target `index`
    ///
    /// Out-of-range indices are ignored; a second result for the same index
    /// replaces the first.
    pub fn record(&mut self, index: usize, result: ScrapeResult) {
        match self.slots.get_mut(index) {
            Some(slot) => {
                if slot.is_some() {
                    warn!("Duplicate result for target #{}, keeping the latest", index);
                }
                *slot = Some(result);
            }
            None => warn!("Dropping result for unknown target #{}", index),
        }
    }

    /// Results in target order
    ///
    /// A target that never reported gets a failure result, so the output has
    /// exactly one entry per target.
    #[must_use]
    pub fn finish(self, targets: &[ScrapeTarget]) -> Vec<ScrapeResult> {
        self.slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| ScrapeResult::failed(&target.url, "Exception: task produced no result"))
            })
            .collect()
    }
}

/// Order `(index, result)` completions and summarise them
#[must_use]
pub fn aggregate(
    targets: &[ScrapeTarget],
    completions: impl IntoIterator<Item = (usize, ScrapeResult)>,
) -> (Vec<ScrapeResult>, RunSummary) {
    let mut aggregator = ResultAggregator::new(targets.len());
    for (index, result) in completions {
        aggregator.record(index, result);
    }
    let results = aggregator.finish(targets);
    let summary = RunSummary::from_results(&results);
    (results, summary)
}
