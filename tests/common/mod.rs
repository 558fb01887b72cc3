//! Scripted browser engine for driving the scraping pipeline without Chrome

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use emailscrape::{BrowserEngine, BrowserTab, EngineLauncher, ScrapeConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a scripted URL behaves when a tab navigates to it
#[derive(Debug, Clone)]
pub enum FakePage {
    Ready {
        text: String,
        title: Option<String>,
        /// `(selector, values)` answered by `attribute_values`
        links: Vec<(String, Vec<String>)>,
        network_idle: bool,
    },
    /// Navigation never completes
    Hang,
    /// Navigation fails with this engine message
    Unreachable(String),
    /// Loads, but its text cannot be read back
    Unreadable,
    /// Loads, then reading its text panics the task
    Crash(&'static str),
}

impl FakePage {
    pub fn text(text: &str) -> Self {
        Self::Ready {
            text: text.to_string(),
            title: None,
            links: Vec::new(),
            network_idle: true,
        }
    }

    pub fn with_title(mut self, value: &str) -> Self {
        if let Self::Ready { title, .. } = &mut self {
            *title = Some(value.to_string());
        }
        self
    }

    pub fn with_link(mut self, selector: &str, value: &str) -> Self {
        if let Self::Ready { links, .. } = &mut self {
            links.push((selector.to_string(), vec![value.to_string()]));
        }
        self
    }

    /// Keeps issuing requests, so the network never goes idle
    pub fn busy(mut self) -> Self {
        if let Self::Ready { network_idle, .. } = &mut self {
            *network_idle = false;
        }
        self
    }
}

/// Counters shared by the engine and all of its tabs
#[derive(Debug, Default)]
pub struct EngineStats {
    pub tabs_opened: AtomicUsize,
    pub tabs_closed: AtomicUsize,
    pub open_now: AtomicUsize,
    pub max_open: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
    pub user_agents: Mutex<Vec<String>>,
}

impl EngineStats {
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().expect("navigations lock").clone()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().expect("user agents lock").clone()
    }

    pub fn tabs_opened(&self) -> usize {
        self.tabs_opened.load(Ordering::SeqCst)
    }

    pub fn tabs_closed(&self) -> usize {
        self.tabs_closed.load(Ordering::SeqCst)
    }

    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

pub struct FakeEngine {
    pages: Arc<HashMap<String, FakePage>>,
    load_time: Duration,
    shut_down: AtomicBool,
    pub stats: Arc<EngineStats>,
}

impl FakeEngine {
    pub fn new(pages: impl IntoIterator<Item = (&'static str, FakePage)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|(url, page)| (url.to_string(), page)).collect()),
            load_time: Duration::ZERO,
            shut_down: AtomicBool::new(false),
            stats: Arc::new(EngineStats::default()),
        }
    }

    /// Every navigation takes `load_time` before the document is parsed
    pub fn with_load_time(mut self, load_time: Duration) -> Self {
        self.load_time = load_time;
        self
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn open_tab(&self) -> Result<Box<dyn BrowserTab>> {
        if self.shut_down.load(Ordering::SeqCst) {
            bail!("browser has been shut down");
        }

        self.stats.tabs_opened.fetch_add(1, Ordering::SeqCst);
        let open = self.stats.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_open.fetch_max(open, Ordering::SeqCst);

        Ok(Box::new(FakeTab {
            pages: Arc::clone(&self.pages),
            load_time: self.load_time,
            current: None,
            stats: Arc::clone(&self.stats),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeTab {
    pages: Arc<HashMap<String, FakePage>>,
    load_time: Duration,
    current: Option<FakePage>,
    stats: Arc<EngineStats>,
}

#[async_trait]
impl BrowserTab for FakeTab {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.stats
            .user_agents
            .lock()
            .expect("user agents lock")
            .push(user_agent.to_string());
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.stats
            .navigations
            .lock()
            .expect("navigations lock")
            .push(url.to_string());
        tokio::time::sleep(self.load_time).await;

        match self.pages.get(url).cloned() {
            None => bail!("net::ERR_NAME_NOT_RESOLVED"),
            Some(FakePage::Hang) => std::future::pending().await,
            Some(FakePage::Unreachable(message)) => bail!("{message}"),
            Some(page) => {
                self.current = Some(page);
                Ok(())
            }
        }
    }

    async fn wait_for_network_idle(&mut self) -> Result<()> {
        match &self.current {
            Some(FakePage::Ready { network_idle: false, .. }) => std::future::pending().await,
            _ => Ok(()),
        }
    }

    async fn visible_text(&mut self) -> Result<String> {
        match &self.current {
            Some(FakePage::Ready { text, .. }) => Ok(text.clone()),
            Some(FakePage::Crash(message)) => panic!("{message}"),
            _ => bail!("Execution context was destroyed"),
        }
    }

    async fn title(&mut self) -> Result<Option<String>> {
        match &self.current {
            Some(FakePage::Ready { title, .. }) => Ok(title.clone()),
            _ => Ok(None),
        }
    }

    async fn attribute_values(&mut self, selector: &str, _attribute: &str) -> Result<Vec<String>> {
        match &self.current {
            Some(FakePage::Ready { links, .. }) => Ok(links
                .iter()
                .filter(|(s, _)| s == selector)
                .flat_map(|(_, values)| values.clone())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.stats.tabs_closed.fetch_add(1, Ordering::SeqCst);
        self.stats.open_now.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one shared [`FakeEngine`] and counts launches
pub struct FakeLauncher {
    engine: Arc<FakeEngine>,
    fail_with: Option<String>,
    launch_time: Duration,
    pub launches: AtomicUsize,
}

impl FakeLauncher {
    pub fn new(engine: FakeEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            fail_with: None,
            launch_time: Duration::ZERO,
            launches: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(FakeEngine::new([]))
        }
    }

    pub fn with_launch_time(mut self, launch_time: Duration) -> Self {
        self.launch_time = launch_time;
        self
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.engine.stats)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserEngine>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.launch_time).await;
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        let engine: Arc<dyn BrowserEngine> = self.engine.clone();
        Ok(engine)
    }
}

/// Default configuration with no pacing, for tests that do not measure it
pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig::builder()
        .request_delay(Duration::ZERO)
        .build()
        .expect("valid test config")
}

pub const MAPS_URL: &str = "https://www.google.com/maps/place/Acme+Plumbing/data=!4m2!3m1!1s0x47c5";
pub const AUTHORITY_SELECTOR: &str = r#"a[data-item-id="authority"]"#;
