//! The session handle shared by every page object of one test.
//!
//! A [`Session`] bundles the driver, the configuration and the evidence
//! recorder. Cloning it is cheap; all clones talk to the same browser.

use crate::config::ProbeConfig;
use crate::driver::{MemoryDriver, SessionDriver, VirtualApp};
use crate::evidence::Evidence;
use crate::locator::{ElementQuery, Locator, Selector, TextMatch};
use crate::result::{ProbeError, ProbeResult};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Shared handle to one browsing session
#[derive(Debug, Clone)]
pub struct Session {
    driver: Arc<dyn SessionDriver>,
    config: Arc<ProbeConfig>,
    evidence: Evidence,
}

impl Session {
    /// Wrap a driver; evidence goes under the configured directory
    #[must_use]
    pub fn new(driver: Arc<dyn SessionDriver>, config: Arc<ProbeConfig>) -> Self {
        let evidence = Evidence::new("session", &config.evidence_dir);
        Self {
            driver,
            config,
            evidence,
        }
    }

    /// Session over an in-memory application
    #[must_use]
    pub fn memory(app: impl VirtualApp + 'static, config: ProbeConfig) -> Self {
        Self::new(Arc::new(MemoryDriver::new(app)), Arc::new(config))
    }

    /// Replace the evidence recorder
    #[must_use]
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn SessionDriver> {
        &self.driver
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Evidence recorder
    #[must_use]
    pub const fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    // ------------------------------------------------------------------
    // Locator factories
    // ------------------------------------------------------------------

    fn bind(&self, selector: Selector) -> Locator {
        Locator::new(self.clone(), ElementQuery::new(selector))
    }

    /// Elements matching a CSS selector
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Locator {
        self.bind(Selector::css(css))
    }

    /// Elements carrying the configured test-id attribute
    #[must_use]
    pub fn get_by_test_id(&self, value: impl Into<String>) -> Locator {
        self.bind(Selector::test_id(
            self.config.test_id_attribute.clone(),
            value.into(),
        ))
    }

    /// Elements with an ARIA role and optional accessible name
    #[must_use]
    pub fn get_by_role(&self, role: impl Into<String>, name: Option<TextMatch>) -> Locator {
        self.bind(Selector::role(role, name))
    }

    /// Inputs by placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<TextMatch>) -> Locator {
        self.bind(Selector::Placeholder(text.into()))
    }

    /// Smallest elements whose text matches
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<TextMatch>) -> Locator {
        self.bind(Selector::Text(text.into()))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Navigate to a route or absolute URL
    pub async fn goto(&self, path: &str) -> ProbeResult<()> {
        let url = self.config.resolve_url(path);
        info!(%url, "navigate");
        self.driver.goto(&url).await
    }

    /// Wait until `document.readyState` reports the DOM is parsed
    pub async fn wait_for_load_state(&self) -> ProbeResult<()> {
        let timeout = self.config.navigation_timeout();
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let state = self.driver.ready_state().await?;
            if state == "interactive" || state == "complete" {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ProbeError::Timeout {
                    what: format!("DOMContentLoaded (readyState `{state}`)"),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    /// Current URL
    pub async fn url(&self) -> ProbeResult<String> {
        self.driver.url().await
    }

    /// Document title
    pub async fn title(&self) -> ProbeResult<String> {
        self.driver.title().await
    }

    /// History back
    pub async fn go_back(&self) -> ProbeResult<()> {
        info!("history back");
        self.driver.go_back().await
    }

    /// Reload
    pub async fn reload(&self) -> ProbeResult<()> {
        info!("reload");
        self.driver.reload().await
    }

    /// Full-page PNG capture written to `destination`
    pub async fn screenshot_to(&self, destination: &Path) -> ProbeResult<Vec<u8>> {
        let bytes = self.driver.screenshot(true).await?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(destination, &bytes).await?;
        info!(path = %destination.display(), bytes = bytes.len(), "screenshot saved");
        Ok(bytes)
    }

    /// Release the browser
    pub async fn close(&self) -> ProbeResult<()> {
        self.driver.close().await
    }

    // ------------------------------------------------------------------
    // Network emulation
    // ------------------------------------------------------------------

    /// Run `body` with the network offline, then go back online.
    ///
    /// The session is restored even when `body` fails or panics; a panic is
    /// resumed once the restore has been attempted.
    pub async fn while_offline<F, Fut, T>(&self, body: F) -> ProbeResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProbeResult<T>>,
    {
        self.driver.set_offline(true).await?;
        info!("network offline");
        let outcome = AssertUnwindSafe(body()).catch_unwind().await;
        let restored = self.driver.set_offline(false).await;
        info!("network online");
        match outcome {
            Err(panic) => {
                if let Err(e) = &restored {
                    warn!(error = %e, "failed to restore network after panic");
                }
                std::panic::resume_unwind(panic)
            }
            Ok(Err(e)) => {
                if let Err(restore) = restored {
                    warn!(error = %restore, "failed to restore network");
                }
                Err(e)
            }
            Ok(Ok(value)) => restored.map(|()| value),
        }
    }

    // ------------------------------------------------------------------
    // Evidence
    // ------------------------------------------------------------------

    /// Run `fut` as a named step: traced under a span and recorded
    pub async fn step<T, Fut>(&self, name: &str, fut: Fut) -> ProbeResult<T>
    where
        Fut: Future<Output = ProbeResult<T>>,
    {
        let started = Instant::now();
        let result = fut.instrument(info_span!("step", name)).await;
        let error = result.as_ref().err().map(ToString::to_string);
        self.evidence.record_step(name, started.elapsed(), error);
        result
    }

    /// Attach bytes to the scenario report; failures are logged, not returned
    pub fn attach(&self, name: &str, bytes: &[u8], mime: &str) {
        match self.evidence.attach(name, bytes, mime) {
            Ok(path) => info!(name, path = %path.display(), "attachment saved"),
            Err(e) => warn!(name, error = %e, "attachment dropped"),
        }
    }
}
