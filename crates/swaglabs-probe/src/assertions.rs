//! Auto-retrying assertions for eventually-consistent pages.
//!
//! Each assertion re-runs its check every poll interval until it passes or
//! the timeout elapses, then fails with [`ProbeError::AssertionFailed`]
//! carrying the last observed value. Errors that polling cannot fix (a
//! strict-mode violation, a closed session, a bad regex) end the wait
//! immediately.

use crate::locator::{Locator, TextMatch};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Assertion holds
    Pass,
    /// Assertion does not hold yet; carries what was observed
    Fail(String),
}

impl Check {
    /// `Pass` when `holds`, otherwise `Fail` with the observation
    #[must_use]
    pub fn from_bool(holds: bool, observed: impl FnOnce() -> String) -> Self {
        if holds {
            Self::Pass
        } else {
            Self::Fail(observed())
        }
    }

    /// Whether the check passed
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Timing of a retrying assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total time allowed
    pub timeout: Duration,
    /// Pause between attempts
    pub poll_interval: Duration,
}

impl RetryConfig {
    /// Timing taken from a session's action timeout and poll interval
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        Self {
            timeout: session.config().action_timeout(),
            poll_interval: session.config().poll_interval(),
        }
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Poll `check` until it passes or `config.timeout` elapses
pub async fn retry<F, Fut>(config: RetryConfig, description: &str, mut check: F) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Check>>,
{
    let deadline = Instant::now() + config.timeout;
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        match check().await? {
            Check::Pass => {
                debug!(description, attempts, "assertion passed");
                return Ok(());
            }
            Check::Fail(observed) => {
                if Instant::now() >= deadline {
                    return Err(ProbeError::AssertionFailed {
                        message: format!(
                            "expected {description}, got {observed} after {attempts} attempts in {}ms",
                            config.timeout.as_millis()
                        ),
                    });
                }
            }
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}

/// Wait until the current URL matches `pattern`
pub async fn expect_url(session: &Session, pattern: &str) -> ProbeResult<()> {
    let regex = Regex::new(pattern).map_err(|e| ProbeError::InvalidSelector {
        selector: pattern.to_string(),
        message: e.to_string(),
    })?;
    let regex = &regex;
    let config = RetryConfig::for_session(session);
    retry(config, &format!("URL matching /{pattern}/"), move || async move {
        let url = session.url().await?;
        Ok(Check::from_bool(regex.is_match(&url), || format!("`{url}`")))
    })
    .await
}

/// Wait until the document title matches
pub async fn expect_title(session: &Session, expected: impl Into<TextMatch>) -> ProbeResult<()> {
    let expected = &expected.into();
    let config = RetryConfig::for_session(session);
    retry(config, &format!("title {expected}"), move || async move {
        let title = session.title().await?;
        Ok(Check::from_bool(expected.matches(&title)?, || {
            format!("`{title}`")
        }))
    })
    .await
}

/// Start an assertion on a locator
#[must_use]
pub fn expect_locator(locator: &Locator) -> LocatorAssertions {
    LocatorAssertions {
        locator: locator.clone(),
        config: RetryConfig::for_session(locator.session()).with_timeout(locator.timeout()),
    }
}

/// Retrying assertions over one locator
#[derive(Debug, Clone)]
pub struct LocatorAssertions {
    locator: Locator,
    config: RetryConfig,
}

impl LocatorAssertions {
    /// Override how long to keep retrying
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Exactly `expected` elements match
    pub async fn to_have_count(&self, expected: usize) -> ProbeResult<()> {
        let description = format!("`{}` to have count {expected}", self.locator.selector());
        retry(self.config, &description, move || async move {
            let count = self.locator.count().await?;
            Ok(Check::from_bool(count == expected, || count.to_string()))
        })
        .await
    }

    /// The single match is rendered
    pub async fn to_be_visible(&self) -> ProbeResult<()> {
        let description = format!("`{}` to be visible", self.locator.selector());
        retry(self.config, &description, move || async move {
            let visible = self.locator.is_visible().await?;
            Ok(Check::from_bool(visible, || "hidden or missing".to_string()))
        })
        .await
    }

    /// Nothing is rendered for this locator
    pub async fn to_be_hidden(&self) -> ProbeResult<()> {
        let description = format!("`{}` to be hidden", self.locator.selector());
        retry(self.config, &description, move || async move {
            let visible = self.locator.is_visible().await?;
            Ok(Check::from_bool(!visible, || "visible".to_string()))
        })
        .await
    }

    /// The single match's text matches
    pub async fn to_have_text(&self, expected: impl Into<TextMatch>) -> ProbeResult<()> {
        let expected = &expected.into();
        let description = format!("`{}` to have text {expected}", self.locator.selector());
        retry(self.config, &description, move || async move {
            let texts = self.locator.all_text_contents().await?;
            match texts.as_slice() {
                [only] => Ok(Check::from_bool(expected.matches(only)?, || {
                    format!("`{}`", only.trim())
                })),
                [] => Ok(Check::Fail("no element".to_string())),
                many => Err(ProbeError::AmbiguousMatch {
                    selector: self.locator.selector(),
                    count: many.len(),
                }),
            }
        })
        .await
    }
}
