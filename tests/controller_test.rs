use emailscrape::aggregator::RunSummary;
use emailscrape::controller::{DispatchLimits, NoOpProgress, ProgressReporter, run_all};
use emailscrape::{EmailSet, ScrapeResult, ScrapeTarget};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn targets(count: usize) -> Vec<ScrapeTarget> {
    (0..count)
        .map(|i| ScrapeTarget::new(format!("https://site{i}.test")))
        .collect()
}

fn ok_result(target: &ScrapeTarget) -> ScrapeResult {
    ScrapeResult::scraped(&target.url, None, EmailSet::new())
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_max_concurrent() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let results = {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        run_all(
            targets(12),
            DispatchLimits::new(3, Duration::from_millis(50)),
            move |target: ScrapeTarget| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    ok_result(&target)
                }
            },
            &NoOpProgress,
        )
        .await
    };

    assert_eq!(results.len(), 12);
    assert_eq!(peak.load(Ordering::SeqCst), 3);
    assert_eq!(in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn results_follow_input_order_not_completion_order() {
    let input = targets(5);

    let results = run_all(
        input.clone(),
        DispatchLimits::new(5, Duration::ZERO),
        |target: ScrapeTarget| async move {
            // Later targets finish first
            let index: u64 = target
                .url
                .trim_start_matches("https://site")
                .trim_end_matches(".test")
                .parse()
                .expect("numbered target");
            tokio::time::sleep(Duration::from_millis(100 * (5 - index))).await;
            ok_result(&target)
        },
        &NoOpProgress,
    )
    .await;

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    let expected: Vec<&str> = input.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, expected);
}

#[tokio::test(start_paused = true)]
async fn pacing_delay_gates_slot_release() {
    let starts = Arc::new(Mutex::new(Vec::new()));
    let began = Instant::now();

    {
        let starts = Arc::clone(&starts);
        run_all(
            targets(4),
            DispatchLimits::new(2, Duration::from_secs(1)),
            move |target: ScrapeTarget| {
                let starts = Arc::clone(&starts);
                async move {
                    starts.lock().expect("starts lock").push(Instant::now());
                    ok_result(&target)
                }
            },
            &NoOpProgress,
        )
        .await;
    }

    let mut starts = starts.lock().expect("starts lock").clone();
    starts.sort();
    assert_eq!(starts.len(), 4);
    // Two slots: the second pair can only start once the first pair's delay elapsed
    assert!(starts[1] - began < Duration::from_millis(10));
    assert!(starts[2] - began >= Duration::from_secs(1));
    assert!(starts[3] - began >= Duration::from_secs(1));
    assert!(began.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn serial_dispatch_spaces_every_start() {
    let starts = Arc::new(Mutex::new(Vec::new()));

    {
        let starts = Arc::clone(&starts);
        run_all(
            targets(3),
            DispatchLimits::serial(Duration::from_secs(3)),
            move |target: ScrapeTarget| {
                let starts = Arc::clone(&starts);
                async move {
                    starts.lock().expect("starts lock").push(Instant::now());
                    ok_result(&target)
                }
            },
            &NoOpProgress,
        )
        .await;
    }

    let mut starts = starts.lock().expect("starts lock").clone();
    starts.sort();
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(3));
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_task_becomes_failure_for_its_own_target() {
    let input = vec![
        ScrapeTarget::new("https://a.test"),
        ScrapeTarget::new("https://boom.test"),
        ScrapeTarget::new("https://c.test"),
    ];

    let results = run_all(
        input,
        DispatchLimits::new(2, Duration::ZERO),
        |target: ScrapeTarget| async move {
            if target.url.contains("boom") {
                panic!("selector engine exploded");
            }
            ok_result(&target)
        },
        &NoOpProgress,
    )
    .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_success());
    assert!(results[2].is_success());

    let failed = &results[1];
    assert_eq!(failed.url, "https://boom.test");
    let error = failed.error.as_deref().expect("panic recorded as error");
    assert!(error.starts_with("Exception:"));
    assert!(error.contains("selector engine exploded"));
    assert!(failed.emails.is_empty());
}

#[derive(Default)]
struct RecordingProgress {
    started: AtomicUsize,
    completed: Mutex<Vec<(usize, usize, String, bool)>>,
}

impl ProgressReporter for RecordingProgress {
    fn report_started(&self, total: usize) {
        self.started.store(total, Ordering::SeqCst);
    }

    fn report_target_completed(&self, done: usize, total: usize, url: &str, ok: bool) {
        self.completed
            .lock()
            .expect("progress lock")
            .push((done, total, url.to_string(), ok));
    }

    fn report_finished(&self, _summary: &RunSummary) {}
}

#[tokio::test(start_paused = true)]
async fn progress_sees_every_target_once() {
    let progress = RecordingProgress::default();

    run_all(
        vec![ScrapeTarget::new("https://a.test"), ScrapeTarget::new("https://b.test")],
        DispatchLimits::new(2, Duration::ZERO),
        |target: ScrapeTarget| async move {
            if target.url.contains("b.test") {
                ScrapeResult::failed(&target.url, "Page load failed: refused")
            } else {
                ok_result(&target)
            }
        },
        &progress,
    )
    .await;

    assert_eq!(progress.started.load(Ordering::SeqCst), 2);
    let completed = progress.completed.lock().expect("progress lock").clone();
    assert_eq!(completed.len(), 2);
    assert_eq!(completed.iter().map(|c| c.0).collect::<Vec<_>>(), [1, 2]);
    assert!(completed.iter().any(|c| c.2 == "https://a.test" && c.3));
    assert!(completed.iter().any(|c| c.2 == "https://b.test" && !c.3));
}

#[tokio::test]
async fn empty_batch_returns_nothing() {
    let results = run_all(
        Vec::new(),
        DispatchLimits::new(4, Duration::from_secs(1)),
        |target: ScrapeTarget| async move { ok_result(&target) },
        &NoOpProgress,
    )
    .await;
    assert!(results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_run_aborts_pending_tasks() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let run = {
        let started = Arc::clone(&started);
        let finished = Arc::clone(&finished);
        run_all(
            targets(4),
            DispatchLimits::new(2, Duration::ZERO),
            move |target: ScrapeTarget| {
                let started = Arc::clone(&started);
                let finished = Arc::clone(&finished);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    ok_result(&target)
                }
            },
            &NoOpProgress,
        )
    };

    assert!(tokio::time::timeout(Duration::from_secs(1), run).await.is_err());
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(started.load(Ordering::SeqCst), 2);
    assert_eq!(finished.load(Ordering::SeqCst), 0);
}
