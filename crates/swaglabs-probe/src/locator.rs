//! Lazy, strict, auto-waiting element locators.
//!
//! A [`Locator`] is a description of how to find elements: an
//! [`ElementQuery`] plus the session it will run against. Building one never
//! touches the browser. Every async operation re-resolves the query against
//! the live document, so a locator stays valid across re-renders.
//!
//! # Waiting rules
//!
//! - `count`, `is_visible`, `all_text_contents` resolve once and never wait;
//!   zero matches is a valid answer.
//! - `text_content`, `inner_html` wait for exactly one attached match.
//! - `click`, `fill`, `select_option` wait for exactly one visible match.
//! - Any single-element operation that sees more than one match fails
//!   straight away with [`ProbeError::AmbiguousMatch`].

use crate::driver::{normalize_whitespace, ElementAction, ElementSnapshot};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How text is compared against an element's normalised text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TextMatch {
    /// Whole-string, case-sensitive equality
    Exact(String),
    /// Case-insensitive substring
    Contains(String),
    /// Regular expression
    Pattern {
        /// Regex source
        source: String,
        /// Compile with the `i` flag
        ignore_case: bool,
    },
}

impl TextMatch {
    /// Whole-string match
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Case-insensitive substring match
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    /// Case-sensitive regex
    #[must_use]
    pub fn pattern(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
            ignore_case: false,
        }
    }

    /// Case-insensitive regex
    #[must_use]
    pub fn pattern_ignore_case(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
            ignore_case: true,
        }
    }

    /// Compare against raw element text (whitespace is normalised first)
    pub fn matches(&self, text: &str) -> ProbeResult<bool> {
        let text = normalize_whitespace(text);
        match self {
            Self::Exact(expected) => Ok(text == normalize_whitespace(expected)),
            Self::Contains(needle) => Ok(text
                .to_lowercase()
                .contains(&normalize_whitespace(needle).to_lowercase())),
            Self::Pattern {
                source,
                ignore_case,
            } => {
                let regex = RegexBuilder::new(source)
                    .case_insensitive(*ignore_case)
                    .build()
                    .map_err(|e| ProbeError::InvalidSelector {
                        selector: self.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(regex.is_match(&text))
            }
        }
    }
}

impl From<&str> for TextMatch {
    fn from(text: &str) -> Self {
        Self::Contains(text.to_string())
    }
}

impl From<String> for TextMatch {
    fn from(text: String) -> Self {
        Self::Contains(text)
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(text) => write!(f, "{}s", quote(text)),
            Self::Contains(text) => write!(f, "{}i", quote(text)),
            Self::Pattern {
                source,
                ignore_case,
            } => write!(f, "/{source}/{}", if *ignore_case { "i" } else { "" }),
        }
    }
}

/// One selection strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Selector {
    /// Compound CSS selector
    Css(String),
    /// Test-id attribute equality
    TestId {
        /// Attribute name, e.g. `data-test`
        attribute: String,
        /// Expected value
        value: String,
    },
    /// ARIA role with optional accessible name
    Role {
        /// Role name, e.g. `button`
        role: String,
        /// Accessible name filter
        name: Option<TextMatch>,
    },
    /// `placeholder` attribute
    Placeholder(TextMatch),
    /// Smallest element whose text matches
    Text(TextMatch),
}

impl Selector {
    /// CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Test-id selector
    #[must_use]
    pub fn test_id(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TestId {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<TextMatch>) -> Self {
        Self::Role {
            role: role.into(),
            name,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::TestId { attribute, value } => {
                write!(f, "internal:testid=[{attribute}={}s]", quote(value))
            }
            Self::Role { role, name: None } => write!(f, "internal:role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "internal:role={role}[name={name}]"),
            Self::Placeholder(text) => write!(f, "internal:attr=[placeholder={text}]"),
            Self::Text(text) => write!(f, "internal:text={text}"),
        }
    }
}

/// Narrowing applied to the current match set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Filter {
    /// Keep elements whose text matches
    HasText(TextMatch),
    /// Keep elements containing a match for the inner query
    Has(ElementQuery),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasText(text) => write!(f, "internal:has-text={text}"),
            Self::Has(inner) => write!(f, "internal:has={}", quote(&inner.to_string())),
        }
    }
}

/// One step of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum QueryStep {
    /// Descendants of the current set matching the selector
    Select(Selector),
    /// Narrow the current set
    Filter(Filter),
    /// Pick one by position; negative counts from the end
    Nth(i32),
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(selector) => selector.fmt(f),
            Self::Filter(filter) => filter.fmt(f),
            Self::Nth(index) => write!(f, "nth={index}"),
        }
    }
}

/// Serializable description of a lookup, shipped to the driver on every call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementQuery {
    /// Steps applied in order, starting from the document
    pub steps: Vec<QueryStep>,
}

impl ElementQuery {
    /// Query starting with one selector
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            steps: vec![QueryStep::Select(selector)],
        }
    }

    /// Append a descendant selector
    #[must_use]
    pub fn then(mut self, selector: Selector) -> Self {
        self.steps.push(QueryStep::Select(selector));
        self
    }

    /// Append a filter
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.steps.push(QueryStep::Filter(filter));
        self
    }

    /// Append a positional pick
    #[must_use]
    pub fn nth(mut self, index: i32) -> Self {
        self.steps.push(QueryStep::Nth(index));
        self
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            step.fmt(f)?;
        }
        Ok(())
    }
}

/// Target state for [`Locator::wait_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Exactly one element in the document
    Attached,
    /// No element in the document
    Detached,
    /// Exactly one element, rendered
    #[default]
    Visible,
    /// No element, or one that is not rendered
    Hidden,
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        };
        f.write_str(name)
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// A locator bound to a session.
///
/// Cheap to clone; holds no element handles.
#[derive(Debug, Clone)]
pub struct Locator {
    session: Session,
    query: ElementQuery,
    timeout: Duration,
}

impl Locator {
    /// Bind a query to a session, using the session's action timeout
    #[must_use]
    pub fn new(session: Session, query: ElementQuery) -> Self {
        let timeout = session.config().action_timeout();
        Self {
            session,
            query,
            timeout,
        }
    }

    /// Override the wait bound for this locator
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying query
    #[must_use]
    pub const fn query(&self) -> &ElementQuery {
        &self.query
    }

    /// Canonical selector string
    #[must_use]
    pub fn selector(&self) -> String {
        self.query.to_string()
    }

    /// Wait bound for single-element operations
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Session this locator resolves against
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn derive(&self, query: ElementQuery) -> Self {
        Self {
            session: self.session.clone(),
            query,
            timeout: self.timeout,
        }
    }

    // ------------------------------------------------------------------
    // Chaining
    // ------------------------------------------------------------------

    /// First match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.nth(-1)
    }

    /// Match at `index`; negative counts from the end
    #[must_use]
    pub fn nth(&self, index: i32) -> Self {
        self.derive(self.query.clone().nth(index))
    }

    /// Narrow by an arbitrary filter
    #[must_use]
    pub fn filter(&self, filter: Filter) -> Self {
        self.derive(self.query.clone().filter(filter))
    }

    /// Keep matches whose text matches
    #[must_use]
    pub fn has_text(&self, text: impl Into<TextMatch>) -> Self {
        self.filter(Filter::HasText(text.into()))
    }

    /// Keep matches containing an element found by `inner`
    #[must_use]
    pub fn has(&self, inner: &Self) -> Self {
        self.filter(Filter::Has(inner.query.clone()))
    }

    /// Descendants matching a CSS selector
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        self.derive(self.query.clone().then(Selector::css(css)))
    }

    /// Descendants with the given test id
    #[must_use]
    pub fn get_by_test_id(&self, value: impl Into<String>) -> Self {
        let selector =
            Selector::test_id(self.session.config().test_id_attribute.clone(), value.into());
        self.derive(self.query.clone().then(selector))
    }

    /// Descendants with the given role
    #[must_use]
    pub fn get_by_role(&self, role: impl Into<String>, name: Option<TextMatch>) -> Self {
        self.derive(self.query.clone().then(Selector::role(role, name)))
    }

    /// Descendants with a matching placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<TextMatch>) -> Self {
        self.derive(self.query.clone().then(Selector::Placeholder(text.into())))
    }

    /// Descendants whose own text matches
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<TextMatch>) -> Self {
        self.derive(self.query.clone().then(Selector::Text(text.into())))
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    async fn resolve(&self) -> ProbeResult<Vec<ElementSnapshot>> {
        let matches = self.session.driver().query(&self.query).await?;
        debug!(selector = %self.query, count = matches.len(), "resolved");
        Ok(matches)
    }

    async fn pause(&self) {
        tokio::time::sleep(self.session.config().poll_interval()).await;
    }

    /// Wait until exactly one element matches (and is visible, if asked)
    async fn wait_for_single(&self, require_visible: bool) -> ProbeResult<ElementSnapshot> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let mut matches = self.resolve().await?;
            match matches.len() {
                0 => {
                    if Instant::now() >= deadline {
                        return Err(ProbeError::NotFound {
                            selector: self.selector(),
                            timeout_ms: self.timeout.as_millis() as u64,
                        });
                    }
                }
                1 => {
                    let element = matches.remove(0);
                    if !require_visible || element.visible {
                        return Ok(element);
                    }
                    if Instant::now() >= deadline {
                        return Err(ProbeError::Timeout {
                            what: format!("`{}` to be visible", self.selector()),
                            ms: self.timeout.as_millis() as u64,
                        });
                    }
                }
                count => {
                    return Err(ProbeError::AmbiguousMatch {
                        selector: self.selector(),
                        count,
                    })
                }
            }
            self.pause().await;
        }
    }

    async fn act(&self, action: ElementAction) -> ProbeResult<()> {
        self.wait_for_single(true).await?;
        debug!(selector = %self.query, %action, "perform");
        self.session.driver().perform(&self.query, &action).await
    }

    /// Number of current matches
    pub async fn count(&self) -> ProbeResult<usize> {
        Ok(self.resolve().await?.len())
    }

    /// Whether the single match is rendered; `false` when nothing matches
    pub async fn is_visible(&self) -> ProbeResult<bool> {
        let matches = self.resolve().await?;
        match matches.as_slice() {
            [] => Ok(false),
            [only] => Ok(only.visible),
            many => Err(ProbeError::AmbiguousMatch {
                selector: self.selector(),
                count: many.len(),
            }),
        }
    }

    /// Raw text of every match, in document order
    pub async fn all_text_contents(&self) -> ProbeResult<Vec<String>> {
        Ok(self.resolve().await?.into_iter().map(|m| m.text).collect())
    }

    /// Raw text of the single match
    pub async fn text_content(&self) -> ProbeResult<String> {
        Ok(self.wait_for_single(false).await?.text)
    }

    /// Serialized children of the single match
    pub async fn inner_html(&self) -> ProbeResult<String> {
        Ok(self.wait_for_single(false).await?.inner_html)
    }

    /// Click the single visible match
    pub async fn click(&self) -> ProbeResult<()> {
        self.act(ElementAction::Click).await
    }

    /// Replace the value of the single visible match
    pub async fn fill(&self, value: impl Into<String>) -> ProbeResult<()> {
        self.act(ElementAction::Fill(value.into())).await
    }

    /// Choose an option by value on the single visible `<select>`
    pub async fn select_option(&self, value: impl Into<String>) -> ProbeResult<()> {
        self.act(ElementAction::SelectOption(value.into())).await
    }

    /// Wait until the locator reaches `state`
    pub async fn wait_for(&self, state: WaitState) -> ProbeResult<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let matches = self.resolve().await?;
            let reached = match (state, matches.as_slice()) {
                (WaitState::Detached, found) => found.is_empty(),
                (WaitState::Hidden, []) => true,
                (WaitState::Attached | WaitState::Visible, []) => false,
                (WaitState::Attached, [_]) => true,
                (WaitState::Visible, [only]) => only.visible,
                (WaitState::Hidden, [only]) => !only.visible,
                (_, many) => {
                    return Err(ProbeError::AmbiguousMatch {
                        selector: self.selector(),
                        count: many.len(),
                    })
                }
            };
            if reached {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ProbeError::Timeout {
                    what: format!("`{}` to be {state}", self.selector()),
                    ms: self.timeout.as_millis() as u64,
                });
            }
            self.pause().await;
        }
    }
}
