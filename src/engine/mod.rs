//! Browser engine abstraction
//!
//! The scraping pipeline only talks to a browser through these traits, so the
//! fetch, maps and session logic run unchanged against Chrome or a scripted
//! engine in tests.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use chromium::{ChromiumEngine, ChromiumLauncher};

/// A running browser that hands out isolated tabs
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open a fresh blank tab
    async fn open_tab(&self) -> Result<Box<dyn BrowserTab>>;

    /// Close the browser and release its OS resources
    ///
    /// Tabs opened afterwards fail. Calling this more than once is allowed.
    async fn shutdown(&self) -> Result<()>;
}

/// One browser tab
///
/// A tab is used by a single task at a time and must be closed with
/// [`BrowserTab::close`] when the task is done with it.
#[async_trait]
pub trait BrowserTab: Send {
    /// Override the user agent for every following request of this tab
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()>;

    /// Navigate and return once the document has been parsed
    ///
    /// Fails when the navigation itself fails (DNS, refused connection, TLS).
    /// Has no timeout of its own; callers bound it.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Resolve once the page has stopped issuing network requests
    ///
    /// May never resolve on busy pages; callers bound it.
    async fn wait_for_network_idle(&mut self) -> Result<()>;

    /// Human-visible text of the document body followed by the head
    async fn visible_text(&mut self) -> Result<String>;

    async fn title(&mut self) -> Result<Option<String>>;

    /// `attribute` of every element matching the CSS `selector`, in document order
    ///
    /// Elements without the attribute are skipped.
    async fn attribute_values(&mut self, selector: &str, attribute: &str) -> Result<Vec<String>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// Starts browser engines on demand
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserEngine>>;
}
