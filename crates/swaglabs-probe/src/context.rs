//! Per-scenario test context.
//!
//! A [`TestContext`] is created when a scenario starts and torn down when
//! it ends. It owns the driver (one browser or one in-memory document), the
//! [`Session`] over it, the scenario's [`Fixtures`] and its evidence. Two
//! contexts never share anything, so scenarios can run in parallel.

use crate::config::ProbeConfig;
use crate::driver::{MemoryDriver, SessionDriver, VirtualApp};
use crate::evidence::{Evidence, ScenarioReport};
use crate::fixture::{Fixtures, PageRole, Setup};
use crate::result::ProbeResult;
use crate::session::Session;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Lifecycle of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Created, driver open
    Ready,
    /// Teardown finished
    Closed,
}

/// Everything one scenario runs against. Clones share the same browser.
#[derive(Debug, Clone)]
pub struct TestContext {
    session: Session,
    fixtures: Fixtures,
    state: Arc<Mutex<ContextState>>,
}

impl TestContext {
    /// Context over an already-running driver
    #[must_use]
    pub fn new(name: &str, driver: Arc<dyn SessionDriver>, config: ProbeConfig) -> Self {
        let evidence = Evidence::new(name, &config.evidence_dir);
        let session = Session::new(driver, Arc::new(config)).with_evidence(evidence);
        let fixtures = Fixtures::new(session.clone());
        Self {
            session,
            fixtures,
            state: Arc::new(Mutex::new(ContextState::Ready)),
        }
    }

    /// Context over a simulated application
    #[must_use]
    pub fn memory(name: &str, app: impl VirtualApp + 'static, config: ProbeConfig) -> Self {
        Self::new(name, Arc::new(MemoryDriver::new(app)), config)
    }

    /// Context over a freshly launched Chromium
    #[cfg(feature = "browser")]
    pub async fn chromium(name: &str, config: ProbeConfig) -> ProbeResult<Self> {
        let driver = crate::driver::ChromiumDriver::launch(&config).await?;
        Ok(Self::new(name, Arc::new(driver), config))
    }

    /// Override a fixture recipe
    #[must_use]
    pub fn with_setup(mut self, role: PageRole, setup: Setup) -> Self {
        self.fixtures = self.fixtures.with_setup(role, setup);
        self
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        self.session.evidence().name()
    }

    /// The session
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The fixture registry
    #[must_use]
    pub const fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// The evidence recorder
    #[must_use]
    pub const fn evidence(&self) -> &Evidence {
        self.session.evidence()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ContextState {
        self.state
            .lock()
            .map_or(ContextState::Closed, |state| *state)
    }

    /// Capture the page and attach it to the evidence
    pub async fn attach_screenshot(&self, name: &str) -> ProbeResult<()> {
        let bytes = self.session.driver().screenshot(true).await?;
        self.session.attach(name, &bytes, "image/png");
        Ok(())
    }

    /// Restore the network and close the driver. Runs once; later calls
    /// return immediately.
    pub async fn teardown(&self) -> ProbeResult<()> {
        {
            let Ok(mut state) = self.state.lock() else {
                return Ok(());
            };
            if *state == ContextState::Closed {
                return Ok(());
            }
            *state = ContextState::Closed;
        }
        if let Err(e) = self.session.driver().set_offline(false).await {
            warn!(scenario = self.name(), error = %e, "could not restore network");
        }
        info!(scenario = self.name(), "teardown");
        self.session.close().await
    }
}

/// Run `body` against `ctx`, then tear the context down.
///
/// On failure a screenshot is attached before teardown. The finished report
/// is written to `report.json` in the scenario's evidence directory and
/// returned when the body passed; otherwise the body's error is returned.
/// A panic in `body` is resumed after teardown.
pub async fn run_scenario<F, Fut>(ctx: TestContext, body: F) -> ProbeResult<ScenarioReport>
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = ProbeResult<()>>,
{
    info!(scenario = ctx.name(), "scenario started");
    let outcome = AssertUnwindSafe(body(ctx.clone())).catch_unwind().await;

    let failure = match &outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(_) => Some("scenario panicked".to_string()),
    };
    if let Some(message) = &failure {
        error!(scenario = ctx.name(), error = %message, "scenario failed");
        if let Err(e) = ctx.attach_screenshot("failure").await {
            warn!(scenario = ctx.name(), error = %e, "no failure screenshot");
        }
    }
    let teardown = ctx.teardown().await;

    let report = ctx.evidence().finish(failure);
    if let Err(e) = report.write_json(&ctx.evidence().dir().join("report.json")) {
        warn!(scenario = ctx.name(), error = %e, "report not written");
    }
    info!(
        scenario = ctx.name(),
        status = ?report.status,
        duration_ms = report.duration_ms,
        "scenario finished"
    );

    match outcome {
        Err(panic) => std::panic::resume_unwind(panic),
        Ok(Err(e)) => Err(e),
        Ok(Ok(())) => teardown.map(|()| report),
    }
}
