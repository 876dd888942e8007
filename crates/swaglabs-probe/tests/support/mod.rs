//! Shared helpers for the scenario suites.

#![allow(dead_code)]

pub mod storefront;

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use swaglabs_probe::prelude::*;

pub use storefront::Storefront;

/// Same origin as the live site so URL assertions read identically
pub const BASE_URL: &str = "https://www.saucedemo.com";

/// Fast-polling configuration writing evidence under `dir`
pub fn config(dir: &Path) -> ProbeConfig {
    ProbeConfig::new()
        .with_base_url(BASE_URL)
        .with_action_timeout(Duration::from_millis(400))
        .with_navigation_timeout(Duration::from_millis(400))
        .with_poll_interval(Duration::from_millis(5))
        .with_evidence_dir(dir)
}

/// Run `body` as a scenario over `app` and return its report.
///
/// Panics with the scenario error so the failing step shows in test output.
pub async fn scenario<F, Fut>(name: &str, app: Storefront, body: F) -> ScenarioReport
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = ProbeResult<()>>,
{
    swaglabs_probe::logging::init();
    let dir = tempfile::tempdir().expect("evidence dir");
    let ctx = TestContext::memory(name, app, config(dir.path()));
    match run_scenario(ctx, body).await {
        Ok(report) => report,
        Err(e) => panic!("scenario `{name}` failed: {e}"),
    }
}

/// Same as [`scenario`] for a storefront already signed in as the standard user
pub async fn signed_in_scenario<F, Fut>(name: &str, body: F) -> ScenarioReport
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = ProbeResult<()>>,
{
    scenario(name, Storefront::signed_in(users::STANDARD.username), body).await
}

/// Run `body` and return its error instead of panicking
pub async fn failing_scenario<F, Fut>(name: &str, app: Storefront, body: F) -> ProbeError
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = ProbeResult<()>>,
{
    let dir = tempfile::tempdir().expect("evidence dir");
    let ctx = TestContext::memory(name, app, config(dir.path()));
    match run_scenario(ctx, body).await {
        Ok(_) => panic!("scenario `{name}` was expected to fail"),
        Err(e) => e,
    }
}

/// Log in as `user` through the login fixture
pub async fn login_as(ctx: &TestContext, user: User) -> ProbeResult<()> {
    let login = ctx.fixtures().login_page().await?;
    login.login(user.username, user.password).await?;
    expect_url(ctx.session(), r".*/inventory\.html").await
}
