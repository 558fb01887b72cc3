mod common;

use common::{FakeEngine, FakePage};
use emailscrape::{FetchError, FetchOptions, PageFetcher, ScrapeConfig};
use std::time::Duration;
use tokio::time::Instant;

fn fetcher() -> PageFetcher {
    PageFetcher::new(ScrapeConfig::default().fetch_options())
}

#[tokio::test(start_paused = true)]
async fn reads_text_and_title_after_settle_delay() {
    let engine = FakeEngine::new([(
        "https://a.test",
        FakePage::text("contact: info@a.test").with_title("Acme"),
    )]);
    let began = Instant::now();

    let content = fetcher().fetch(&engine, "https://a.test").await.expect("page loads");

    assert_eq!(content.text, "contact: info@a.test");
    assert_eq!(content.title.as_deref(), Some("Acme"));
    assert!(content.network_idle);
    assert!(began.elapsed() >= Duration::from_secs(3));
    assert_eq!(engine.stats.tabs_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn sends_configured_user_agent() {
    let engine = FakeEngine::new([("https://a.test", FakePage::text(""))]);
    let options = FetchOptions {
        user_agent: "TestAgent/2.0".to_string(),
        ..FetchOptions::default()
    };

    PageFetcher::new(options)
        .fetch(&engine, "https://a.test")
        .await
        .expect("page loads");

    assert_eq!(engine.stats.user_agents(), ["TestAgent/2.0"]);
}

#[tokio::test(start_paused = true)]
async fn hanging_navigation_times_out() {
    let engine = FakeEngine::new([("https://b.test", FakePage::Hang)]);
    let began = Instant::now();

    let err = fetcher().fetch(&engine, "https://b.test").await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("timeout"));
    assert!(began.elapsed() >= Duration::from_secs(15));
    assert!(began.elapsed() < Duration::from_secs(16));
    assert_eq!(engine.stats.tabs_closed(), 1, "tab closed on the failure path");
}

#[tokio::test(start_paused = true)]
async fn dns_failure_is_a_navigation_error() {
    let engine = FakeEngine::new([]);

    let err = fetcher().fetch(&engine, "https://nowhere.test").await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Navigation {
            url: "https://nowhere.test".to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        }
    );
    assert!(err.to_string().starts_with("Page load failed:"));
    assert_eq!(engine.stats.tabs_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn unreadable_page_is_a_content_error() {
    let engine = FakeEngine::new([("https://c.test", FakePage::Unreadable)]);

    let err = fetcher().fetch(&engine, "https://c.test").await.unwrap_err();

    assert!(matches!(err, FetchError::Evaluation { .. }));
    assert!(err.to_string().starts_with("Scraping error:"));
    assert_eq!(engine.stats.tabs_closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn busy_network_is_not_fatal() {
    let engine = FakeEngine::new([("https://busy.test", FakePage::text("sales@busy.test").busy())]);
    let began = Instant::now();

    let content = fetcher().fetch(&engine, "https://busy.test").await.expect("still read");

    assert!(!content.network_idle);
    assert_eq!(content.text, "sales@busy.test");
    // settle delay plus the full idle timeout
    assert!(began.elapsed() >= Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn page_creation_failure_after_shutdown() {
    let engine = FakeEngine::new([("https://a.test", FakePage::text(""))]);
    emailscrape::BrowserEngine::shutdown(&engine).await.expect("shutdown");

    let err = fetcher().fetch(&engine, "https://a.test").await.unwrap_err();

    assert!(matches!(err, FetchError::PageCreation { .. }));
    assert_eq!(engine.stats.tabs_opened(), 0);
}
