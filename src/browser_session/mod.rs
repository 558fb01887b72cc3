//! Run-scoped browser lifecycle
//!
//! A `BrowserSession` starts the browser lazily on first `acquire()` and hands
//! the same engine to every caller until `release()`. After release the
//! session is closed for good; a new run builds a new session.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::engine::{BrowserEngine, ChromiumLauncher, EngineLauncher};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The browser could not be started; the whole run is aborted
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser session already released")]
    Closed,
}

enum SessionState {
    Idle,
    Running(Arc<dyn BrowserEngine>),
    Closed,
}

pub struct BrowserSession {
    launcher: Arc<dyn EngineLauncher>,
    state: Mutex<SessionState>,
}

impl BrowserSession {
    #[must_use]
    pub fn new(launcher: Arc<dyn EngineLauncher>) -> Self {
        Self {
            launcher,
            state: Mutex::new(SessionState::Idle),
        }
    }

    /// Session backed by a locally launched Chrome
    #[must_use]
    pub fn chromium(config: &ScrapeConfig) -> Self {
        Self::new(Arc::new(ChromiumLauncher::new(config.clone())))
    }

    /// Get the running engine, launching it on first use
    ///
    /// Concurrent callers wait for the same launch; at most one engine exists
    /// per session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Launch`] when the browser fails to start and
    /// [`SessionError::Closed`] after [`BrowserSession::release`].
    pub async fn acquire(&self) -> Result<Arc<dyn BrowserEngine>, SessionError> {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Running(engine) => Ok(Arc::clone(engine)),
            SessionState::Closed => Err(SessionError::Closed),
            SessionState::Idle => {
                info!("Launching browser for scrape session");
                let engine = self
                    .launcher
                    .launch()
                    .await
                    .map_err(|e| SessionError::Launch(format!("{e:#}")))?;
                *state = SessionState::Running(Arc::clone(&engine));
                Ok(engine)
            }
        }
    }

    /// Tear the browser down
    ///
    /// Safe to call when nothing was acquired and safe to call twice.
    /// Teardown failures are logged, never returned.
    pub async fn release(&self) {
        let previous = std::mem::replace(&mut *self.state.lock().await, SessionState::Closed);

        if let SessionState::Running(engine) = previous {
            info!("Releasing browser session");
            if let Err(e) = engine.shutdown().await {
                warn!("Browser shutdown failed: {:#}", e);
            }
        }
    }

    /// Whether a browser is currently running for this session
    pub async fn is_active(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Running(_))
    }
}
