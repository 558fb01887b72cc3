//! Chrome-backed engine built on chromiumoxide

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::page::Page;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{BrowserEngine, BrowserTab, EngineLauncher};
use crate::browser_setup::{LaunchOptions, launch_browser};
use crate::config::ScrapeConfig;
use crate::utils::{NETWORK_IDLE_QUIET_WINDOW, READINESS_POLL_INTERVAL};

/// Body text followed by head text, matching what a reader of the page sees
const VISIBLE_TEXT_SCRIPT: &str = r"(() => {
    const body = document.body ? document.body.innerText : '';
    const head = document.head ? document.head.innerText : '';
    return body + ' ' + head;
})()";

const LOAD_STATE_SCRIPT: &str = r"(() => {
    let resources = 0;
    try { resources = performance.getEntriesByType('resource').length; } catch (_) {}
    return { readyState: document.readyState, resources: resources };
})()";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadState {
    ready_state: String,
    resources: u64,
}

/// Chrome process plus the task draining its CDP event stream
///
/// The handler MUST be aborted when the browser goes away or it keeps running.
struct ChromeProcess {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl ChromeProcess {
    /// Remove the profile directory
    ///
    /// Call only after `browser.wait()` so Chrome has released its file handles.
    fn cleanup_user_data_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up Chrome profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up profile directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for ChromeProcess {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop() kills the Chrome process
        if self.user_data_dir.is_some() {
            warn!("Chrome process dropped without shutdown - removing profile directory in Drop");
            self.cleanup_user_data_dir();
        }
    }
}

/// A launched Chrome instance shared by every task of a run
pub struct ChromiumEngine {
    process: RwLock<Option<ChromeProcess>>,
    open_tabs: Arc<AtomicUsize>,
}

impl ChromiumEngine {
    /// Launch Chrome with the identification and window settings from `config`
    pub async fn launch(config: &ScrapeConfig) -> Result<Self> {
        let options = LaunchOptions::from_config(config);
        let (browser, handler, user_data_dir) = launch_browser(&options).await?;

        Ok(Self {
            process: RwLock::new(Some(ChromeProcess {
                browser,
                handler,
                user_data_dir: Some(user_data_dir),
            })),
            open_tabs: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Tabs opened and not yet closed
    #[must_use]
    pub fn open_tabs(&self) -> usize {
        self.open_tabs.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_tab(&self) -> Result<Box<dyn BrowserTab>> {
        let guard = self.process.read().await;
        let process = guard
            .as_ref()
            .ok_or_else(|| anyhow!("browser has been shut down"))?;

        let page = process
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create blank page")?;

        self.open_tabs.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ChromiumTab {
            page,
            open_tabs: Arc::clone(&self.open_tabs),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut guard = self.process.write().await;

        if let Some(mut process) = guard.take() {
            info!("Shutting down browser");

            if let Err(e) = process.browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }

            if let Err(e) = process.browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }

            process.cleanup_user_data_dir();
        }

        Ok(())
    }
}

struct ChromiumTab {
    page: Page,
    open_tabs: Arc<AtomicUsize>,
}

impl ChromiumTab {
    async fn load_state(&self) -> Result<LoadState> {
        self.page
            .evaluate(LOAD_STATE_SCRIPT)
            .await
            .context("Failed to read document state")?
            .into_value::<LoadState>()
            .map_err(|e| anyhow!("Failed to convert document state: {e}"))
    }
}

#[async_trait]
impl BrowserTab for ChromiumTab {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.page
            .set_user_agent(SetUserAgentOverrideParams::new(user_agent))
            .await
            .context("Failed to override user agent")?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .with_context(|| format!("Navigation request failed for {url}"))?;

        if let Some(error_text) = response.result.error_text.as_deref() {
            bail!("{error_text}");
        }

        // CDP answers before the new document is parsed; evaluation errors while
        // the old execution context is torn down mean "not ready yet".
        loop {
            match self.load_state().await {
                Ok(state) if state.ready_state != "loading" => return Ok(()),
                Ok(_) => {}
                Err(e) => debug!("Document not ready for {}: {:#}", url, e),
            }
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
    }

    async fn wait_for_network_idle(&mut self) -> Result<()> {
        let mut last_resources = None;
        let mut quiet_since = Instant::now();

        loop {
            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
            let state = self.load_state().await?;

            if state.ready_state != "complete" || last_resources != Some(state.resources) {
                last_resources = Some(state.resources);
                quiet_since = Instant::now();
                continue;
            }

            if quiet_since.elapsed() >= NETWORK_IDLE_QUIET_WINDOW {
                return Ok(());
            }
        }
    }

    async fn visible_text(&mut self) -> Result<String> {
        self.page
            .evaluate(VISIBLE_TEXT_SCRIPT)
            .await
            .context("Failed to read page text")?
            .into_value::<String>()
            .map_err(|e| anyhow!("Failed to convert page text: {e}"))
    }

    async fn title(&mut self) -> Result<Option<String>> {
        self.page.get_title().await.context("Failed to read page title")
    }

    async fn attribute_values(&mut self, selector: &str, attribute: &str) -> Result<Vec<String>> {
        // JSON string literals are valid JS string literals
        let script = format!(
            r"Array.from(document.querySelectorAll({selector}))
                .map(el => el.getAttribute({attribute}))
                .filter(value => typeof value === 'string' && value.length > 0)",
            selector = serde_json::to_string(selector)?,
            attribute = serde_json::to_string(attribute)?,
        );

        self.page
            .evaluate(script)
            .await
            .with_context(|| format!("Failed to query selector {selector}"))?
            .into_value::<Vec<String>>()
            .map_err(|e| anyhow!("Failed to convert attribute values: {e}"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.open_tabs.fetch_sub(1, Ordering::Relaxed);
        self.page.close().await.context("Failed to close page")?;
        Ok(())
    }
}

/// Launches one [`ChromiumEngine`] per call with a fixed configuration
pub struct ChromiumLauncher {
    config: ScrapeConfig,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserEngine>> {
        let engine = ChromiumEngine::launch(&self.config).await?;
        Ok(Arc::new(engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chrome/Chromium to be installed
    async fn reads_text_title_and_links_from_data_url() {
        let engine = ChromiumEngine::launch(&ScrapeConfig::default())
            .await
            .expect("failed to launch browser");
        let mut tab = engine.open_tab().await.expect("failed to open tab");
        tab.set_user_agent("EmailScrapeTest/1.0").await.expect("user agent override");

        tab.navigate(
            "data:text/html,<title>Acme</title><p>Mail info@acme.test</p>\
             <a data-item-id=\"authority\" href=\"https://acme.test/\">site</a>\
             <p id=\"ua\"></p><script>document.getElementById('ua').textContent=navigator.userAgent</script>",
        )
        .await
        .expect("navigation failed");

        let text = tab.visible_text().await.expect("text");
        assert!(text.contains("info@acme.test"));
        assert!(text.contains("EmailScrapeTest/1.0"));
        assert_eq!(tab.title().await.expect("title").as_deref(), Some("Acme"));

        let links = tab
            .attribute_values(r#"a[data-item-id="authority"]"#, "href")
            .await
            .expect("links");
        assert_eq!(links, vec!["https://acme.test/".to_string()]);

        tab.close().await.expect("close");
        assert_eq!(engine.open_tabs(), 0);
        engine.shutdown().await.expect("shutdown");
    }
}
