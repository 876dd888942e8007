//! swaglabs-probe: page objects, fixtures and scenarios for the Swag Labs
//! storefront.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SWAGLABS-PROBE Architecture                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Scenario   │    │ Page       │    │ SessionDriver      │    │
//! │   │ (Rust)     │───►│ Objects +  │───►│ Chromium (CDP) or  │    │
//! │   │            │    │ Locators   │    │ in-memory document │    │
//! │   └────────────┘    └────────────┘    └────────────────────┘    │
//! │         │                                                        │
//! │         ▼                                                        │
//! │   TestContext ── Fixtures ── Evidence (steps, screenshots)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```ignore
//! use swaglabs_probe::prelude::*;
//!
//! let ctx = TestContext::chromium("valid login", ProbeConfig::from_env()?).await?;
//! run_scenario(ctx, |ctx| async move {
//!     let login = ctx.fixtures().login_page().await?;
//!     login.login(users::STANDARD.username, users::STANDARD.password).await?;
//!     expect_url(ctx.session(), r".*/inventory\.html").await
//! })
//! .await?;
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Retrying assertions
#[allow(clippy::missing_errors_doc)]
pub mod assertions;
/// Configuration
pub mod config;
/// Per-scenario context and runner
#[allow(clippy::missing_errors_doc)]
pub mod context;
/// Test data: users, products, messages
pub mod data;
/// Session drivers
#[allow(clippy::missing_errors_doc)]
pub mod driver;
/// Step and attachment recording
#[allow(clippy::missing_errors_doc, clippy::format_push_string)]
pub mod evidence;
/// Page fixtures
#[allow(clippy::missing_errors_doc)]
pub mod fixture;
/// Auto-waiting locators
#[allow(clippy::missing_errors_doc)]
pub mod locator;
/// Tracing setup
pub mod logging;
/// Page objects
#[allow(clippy::missing_errors_doc)]
pub mod pages;
/// Error types
pub mod result;
/// Session handle
#[allow(clippy::missing_errors_doc)]
pub mod session;

pub use assertions::{expect_locator, expect_title, expect_url, LocatorAssertions};
pub use config::ProbeConfig;
pub use context::{run_scenario, ContextState, TestContext};
#[cfg(feature = "browser")]
pub use driver::ChromiumDriver;
pub use driver::{MemoryDriver, SessionDriver, VirtualApp};
pub use evidence::{render_junit, Evidence, ScenarioReport, Status};
pub use fixture::{FixturePage, Fixtures, PageRole, Setup};
pub use locator::{ElementQuery, Locator, Selector, TextMatch, WaitState};
pub use result::{ProbeError, ProbeResult};
pub use session::Session;

/// Everything a scenario usually needs
pub mod prelude {
    pub use super::assertions::*;
    pub use super::config::ProbeConfig;
    pub use super::context::*;
    pub use super::data::{errors, products, users, Customer, User, PASSWORD};
    pub use super::driver::{Document, MemoryDriver, Node, SessionDriver, StaticApp, VirtualApp};
    pub use super::evidence::*;
    pub use super::fixture::*;
    pub use super::locator::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::session::Session;
}
