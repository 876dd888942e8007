//! Remote session drivers.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  SessionDriver (async trait)                                   │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  ChromiumDriver        │   │  MemoryDriver               │  │
//! │  │  (feature "browser")   │   │  (always available)         │  │
//! │  │                        │   │                             │  │
//! │  │  CDP via chromiumoxide │   │  VirtualApp + Document tree │  │
//! │  └────────────────────────┘   └─────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both drivers evaluate an [`ElementQuery`] the same way: every step runs
//! against the result of the previous one, matches stay in document order,
//! and nothing is cached between calls.

#[cfg(feature = "browser")]
pub mod cdp;
pub mod memory;

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
pub use memory::{Document, MemoryDriver, Node, StaticApp, VirtualApp};

use crate::locator::ElementQuery;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a single resolution reports about one matched element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Raw `textContent`
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Serialized children
    pub inner_html: String,
}

impl ElementSnapshot {
    /// Create a visible snapshot with the given text
    #[must_use]
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            inner_html: String::new(),
        }
    }
}

/// Action dispatched against the first element a query resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ElementAction {
    /// Mouse click
    Click,
    /// Replace the value of an input
    Fill(String),
    /// Choose an `<option>` by value
    SelectOption(String),
}

impl std::fmt::Display for ElementAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Fill(value) => write!(f, "fill({} chars)", value.chars().count()),
            Self::SelectOption(value) => write!(f, "select_option({value})"),
        }
    }
}

/// Handle to one live browsing session.
///
/// A session is owned by exactly one test context. Implementations take
/// `&self` and synchronise internally so the handle can sit behind an `Arc`.
#[async_trait]
pub trait SessionDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Current URL
    async fn url(&self) -> ProbeResult<String>;

    /// `document.readyState`
    async fn ready_state(&self) -> ProbeResult<String>;

    /// Go back in history
    async fn go_back(&self) -> ProbeResult<()>;

    /// Reload the current document
    async fn reload(&self) -> ProbeResult<()>;

    /// Document title
    async fn title(&self) -> ProbeResult<String>;

    /// Resolve a query against the live document
    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Act on the first element the query resolves to
    async fn perform(&self, query: &ElementQuery, action: &ElementAction) -> ProbeResult<()>;

    /// PNG capture of the viewport or full page
    async fn screenshot(&self, full_page: bool) -> ProbeResult<Vec<u8>>;

    /// Toggle network emulation
    async fn set_offline(&self, offline: bool) -> ProbeResult<()>;

    /// Release the session; further calls fail
    async fn close(&self) -> ProbeResult<()>;
}

/// Collapse runs of whitespace and trim, as text matching sees it
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
