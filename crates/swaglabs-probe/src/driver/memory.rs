//! In-memory session driver.
//!
//! [`MemoryDriver`] renders documents from a [`VirtualApp`] and evaluates
//! [`ElementQuery`] steps against them with the same rules the browser-side
//! resolver uses. It lets page objects and scenario suites run without a
//! browser process, and records every call for verification.
//!
//! The CSS support is deliberately small: compound selectors built from a
//! tag, `#id`, `.class` and attribute tests (`[a]`, `[a=v]`, `[a^=v]`,
//! `[a$=v]`, `[a*=v]`), joined by descendant whitespace or `,`. Anything
//! else is rejected as [`ProbeError::InvalidSelector`].

use super::{normalize_whitespace, ElementAction, ElementSnapshot, SessionDriver};
use crate::locator::{ElementQuery, Filter, QueryStep, Selector};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use base64::Engine;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 1x1 transparent PNG returned by [`MemoryDriver::screenshot`]
const BLANK_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// One element of a rendered document.
///
/// An element's text content is its own `text` followed by the text of its
/// children, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes, including `id`, `class` and the current `value`
    pub attrs: BTreeMap<String, String>,
    /// Text that precedes the children
    pub text: String,
    /// Child elements
    pub children: Vec<Node>,
    /// Not rendered (hides the whole subtree)
    pub hidden: bool,
}

impl Node {
    /// Element with the given tag
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Set the own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append one child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Mark as not rendered
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Attribute value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.get("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Text content of the subtree
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", value.replace('"', "&quot;"));
        }
        out.push('>');
        out.push_str(&self.inner_html());
        let _ = write!(out, "</{}>", self.tag);
    }

    /// Serialized children (own text first)
    #[must_use]
    pub fn inner_html(&self) -> String {
        let mut out = self
            .text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }
}

/// A rendered page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// `document.title`
    pub title: String,
    /// Root element (usually `body`)
    pub root: Node,
}

impl Document {
    /// Document with a title and root element
    #[must_use]
    pub fn new(title: impl Into<String>, root: Node) -> Self {
        Self {
            title: title.into(),
            root,
        }
    }

    /// Empty document shown before the first navigation
    #[must_use]
    pub fn blank() -> Self {
        Self::new("", Node::element("body"))
    }
}

/// Server and client behaviour of a simulated web application.
///
/// Paths are origin-relative and may carry a query string.
pub trait VirtualApp: Send + std::fmt::Debug {
    /// Handle a full navigation and return the path actually shown
    /// (different from `path` when the app redirects)
    fn navigate(&mut self, path: &str) -> String;

    /// Render the document for `path`
    fn render(&self, path: &str) -> Document;

    /// Click on `target`; returns the new path on client-side navigation
    fn click(&mut self, path: &str, target: &Node) -> Option<String>;

    /// Replace the value of the `target` input
    fn fill(&mut self, path: &str, target: &Node, value: &str);

    /// Choose an option on the `target` select; may navigate
    fn select(&mut self, path: &str, target: &Node, value: &str) -> Option<String>;
}

/// A fixed document that keeps filled values and selected options
#[derive(Debug, Clone, Default)]
pub struct StaticApp {
    document: Document,
}

impl StaticApp {
    /// Serve `document` for every path
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn set_value(node: &mut Node, target: &Node, value: &str) -> bool {
        if node == target {
            node.attrs.insert("value".to_string(), value.to_string());
            return true;
        }
        node.children
            .iter_mut()
            .any(|child| Self::set_value(child, target, value))
    }
}

impl VirtualApp for StaticApp {
    fn navigate(&mut self, path: &str) -> String {
        path.to_string()
    }

    fn render(&self, _path: &str) -> Document {
        self.document.clone()
    }

    fn click(&mut self, _path: &str, _target: &Node) -> Option<String> {
        None
    }

    fn fill(&mut self, _path: &str, target: &Node, value: &str) {
        Self::set_value(&mut self.document.root, target, value);
    }

    fn select(&mut self, _path: &str, target: &Node, value: &str) -> Option<String> {
        Self::set_value(&mut self.document.root, target, value);
        None
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

/// Pre-order view of a document used during evaluation
struct Flat<'a> {
    nodes: Vec<&'a Node>,
    parent: Vec<Option<usize>>,
    /// Exclusive end of each subtree in pre-order
    end: Vec<usize>,
}

impl<'a> Flat<'a> {
    fn new(root: &'a Node) -> Self {
        let mut flat = Self {
            nodes: Vec::new(),
            parent: Vec::new(),
            end: Vec::new(),
        };
        flat.push(root, None);
        flat
    }

    fn push(&mut self, node: &'a Node, parent: Option<usize>) {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.parent.push(parent);
        self.end.push(index + 1);
        for child in &node.children {
            self.push(child, Some(index));
        }
        self.end[index] = self.nodes.len();
    }

    fn visible(&self, mut index: usize) -> bool {
        loop {
            if self.nodes[index].hidden {
                return false;
            }
            match self.parent[index] {
                Some(parent) => index = parent,
                None => return true,
            }
        }
    }

    fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent[index], move |&i| self.parent[i])
    }

    fn child_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        ((index + 1)..self.end[index]).filter(move |&i| self.parent[i] == Some(index))
    }
}

/// Where evaluation starts: the whole document, or a set of elements
#[derive(Clone, Copy)]
enum Scope<'s> {
    Document,
    Elements(&'s [usize]),
}

fn evaluate(flat: &Flat<'_>, query: &ElementQuery, scope: Scope<'_>) -> ProbeResult<Vec<usize>> {
    let mut current: Vec<usize> = match scope {
        Scope::Document => Vec::new(),
        Scope::Elements(set) => set.to_vec(),
    };
    let mut at_document = matches!(scope, Scope::Document);

    for step in &query.steps {
        current = match step {
            QueryStep::Select(selector) => {
                let candidates: BTreeSet<usize> = if at_document {
                    (0..flat.nodes.len()).collect()
                } else {
                    current
                        .iter()
                        .flat_map(|&i| (i + 1)..flat.end[i])
                        .collect()
                };
                at_document = false;
                let mut selected = Vec::new();
                for i in candidates {
                    if matches_selector(flat, i, selector)? {
                        selected.push(i);
                    }
                }
                selected
            }
            QueryStep::Filter(filter) => {
                let mut kept = Vec::new();
                for &i in &current {
                    if matches_filter(flat, i, filter)? {
                        kept.push(i);
                    }
                }
                kept
            }
            QueryStep::Nth(index) => pick(&current, *index).into_iter().collect(),
        };
    }
    Ok(current)
}

fn pick(set: &[usize], index: i32) -> Option<usize> {
    let position = if index < 0 {
        set.len().checked_sub(index.unsigned_abs() as usize)?
    } else {
        index as usize
    };
    set.get(position).copied()
}

fn matches_filter(flat: &Flat<'_>, index: usize, filter: &Filter) -> ProbeResult<bool> {
    match filter {
        Filter::HasText(text) => text.matches(&flat.nodes[index].text_content()),
        Filter::Has(inner) => {
            Ok(!evaluate(flat, inner, Scope::Elements(&[index]))?.is_empty())
        }
    }
}

fn matches_selector(flat: &Flat<'_>, index: usize, selector: &Selector) -> ProbeResult<bool> {
    let node = flat.nodes[index];
    match selector {
        Selector::Css(css) => matches_css(flat, index, css),
        Selector::TestId { attribute, value } => Ok(node.get(attribute) == Some(value.as_str())),
        Selector::Placeholder(text) => match node.get("placeholder") {
            Some(placeholder) => text.matches(placeholder),
            None => Ok(false),
        },
        Selector::Role { role, name } => {
            if implicit_role(node).as_deref() != Some(role.as_str()) {
                return Ok(false);
            }
            match name {
                Some(name) => name.matches(&accessible_name(node)),
                None => Ok(true),
            }
        }
        Selector::Text(text) => {
            if !text.matches(&node.text_content())? {
                return Ok(false);
            }
            for child in flat.child_indices(index) {
                if text.matches(&flat.nodes[child].text_content())? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

/// ARIA role, explicit attribute first
fn implicit_role(node: &Node) -> Option<String> {
    if let Some(role) = node.get("role") {
        return Some(role.to_string());
    }
    let input_type = node.get("type").unwrap_or("text").to_ascii_lowercase();
    let role = match node.tag.as_str() {
        "button" => "button",
        "a" if node.get("href").is_some() => "link",
        "select" => "combobox",
        "textarea" => "textbox",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "input" => match input_type.as_str() {
            "button" | "submit" | "reset" | "image" => "button",
            "checkbox" => "checkbox",
            "radio" => "radio",
            "text" | "email" | "tel" | "url" | "search" => "textbox",
            _ => return None,
        },
        _ => return None,
    };
    Some(role.to_string())
}

fn accessible_name(node: &Node) -> String {
    if let Some(label) = node.get("aria-label") {
        return normalize_whitespace(label);
    }
    if node.tag == "input" {
        let input_type = node.get("type").unwrap_or("text");
        if matches!(input_type, "button" | "submit" | "reset") {
            return normalize_whitespace(node.get("value").unwrap_or_default());
        }
        return normalize_whitespace(node.get("placeholder").unwrap_or_default());
    }
    if node.tag == "textarea" {
        return normalize_whitespace(node.get("placeholder").unwrap_or_default());
    }
    normalize_whitespace(&node.text_content())
}

// ============================================================================
// CSS subset
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrTest)>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if self.tag.as_deref().is_some_and(|tag| tag != node.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| node.get("id") != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|class| node.has_class(class)) {
            return false;
        }
        self.attrs.iter().all(|(name, test)| {
            let Some(value) = node.get(name) else {
                return false;
            };
            match test {
                AttrTest::Present => true,
                AttrTest::Equals(v) => value == v,
                AttrTest::Prefix(v) => value.starts_with(v.as_str()),
                AttrTest::Suffix(v) => value.ends_with(v.as_str()),
                AttrTest::Substring(v) => value.contains(v.as_str()),
            }
        })
    }
}

/// Descendant chain, outermost first
type Complex = Vec<Compound>;

fn matches_css(flat: &Flat<'_>, index: usize, css: &str) -> ProbeResult<bool> {
    let list = parse_css(css)?;
    Ok(list.iter().any(|complex| matches_complex(flat, index, complex)))
}

fn matches_complex(flat: &Flat<'_>, index: usize, complex: &[Compound]) -> bool {
    let Some((last, rest)) = complex.split_last() else {
        return false;
    };
    if !last.matches(flat.nodes[index]) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    flat.ancestors(index)
        .any(|ancestor| matches_complex(flat, ancestor, rest))
}

fn invalid(css: &str, message: impl Into<String>) -> ProbeError {
    ProbeError::InvalidSelector {
        selector: css.to_string(),
        message: message.into(),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_css(css: &str) -> ProbeResult<Vec<Complex>> {
    let mut list = Vec::new();
    for part in css.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid(css, "empty selector"));
        }
        let mut complex = Vec::new();
        for compound in split_descendants(part) {
            complex.push(parse_compound(css, compound)?);
        }
        list.push(complex);
    }
    Ok(list)
}

/// Split on whitespace outside attribute brackets
fn split_descendants(part: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = None;
    for (i, c) in part.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    pieces.push(&part[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        pieces.push(&part[s..]);
    }
    pieces
}

fn parse_compound(css: &str, text: &str) -> ProbeResult<Compound> {
    let mut compound = Compound::default();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '*') {
        if chars[i] == '*' {
            i += 1;
        } else {
            compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
        }
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = read_ident(&mut i);
                if id.is_empty() {
                    return Err(invalid(css, "empty id"));
                }
                compound.id = Some(id);
            }
            '.' => {
                i += 1;
                let class = read_ident(&mut i);
                if class.is_empty() {
                    return Err(invalid(css, "empty class"));
                }
                compound.classes.push(class);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| invalid(css, "unterminated attribute selector"))?;
                let body: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(css, &body)?);
                i = close + 1;
            }
            other => {
                return Err(invalid(css, format!("unsupported token `{other}`")));
            }
        }
    }
    Ok(compound)
}

fn parse_attr(css: &str, body: &str) -> ProbeResult<(String, AttrTest)> {
    let Some(eq) = body.find('=') else {
        let name = body.trim();
        if name.is_empty() || !name.chars().all(is_ident_char) {
            return Err(invalid(css, "bad attribute name"));
        }
        return Ok((name.to_string(), AttrTest::Present));
    };
    let (lhs, rhs) = body.split_at(eq);
    let rhs = rhs[1..].trim();
    let (name, op) = match lhs.trim_end().chars().last() {
        Some(c @ ('^' | '$' | '*')) => (&lhs.trim_end()[..lhs.trim_end().len() - 1], Some(c)),
        _ => (lhs, None),
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(invalid(css, "bad attribute name"));
    }
    let value = rhs
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| rhs.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(rhs)
        .to_string();
    let test = match op {
        None => AttrTest::Equals(value),
        Some('^') => AttrTest::Prefix(value),
        Some('$') => AttrTest::Suffix(value),
        _ => AttrTest::Substring(value),
    };
    Ok((name.to_string(), test))
}

// ============================================================================
// Driver
// ============================================================================

#[derive(Debug)]
struct MemoryState {
    app: Box<dyn VirtualApp>,
    origin: String,
    /// `None` until the first navigation
    history: Vec<String>,
    offline: bool,
    closed: bool,
    calls: Vec<String>,
}

impl MemoryState {
    fn path(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    fn document(&self) -> Document {
        self.path()
            .map_or_else(Document::blank, |path| self.app.render(path))
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            return Err(ProbeError::session("session is closed"));
        }
        Ok(())
    }

    fn ensure_online(&self, url: &str) -> ProbeResult<()> {
        if self.offline {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_INTERNET_DISCONNECTED".to_string(),
            });
        }
        Ok(())
    }
}

/// Driver that serves documents from a [`VirtualApp`]
#[derive(Debug, Clone)]
pub struct MemoryDriver {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDriver {
    /// Wrap an application
    #[must_use]
    pub fn new(app: impl VirtualApp + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                app: Box::new(app),
                origin: String::new(),
                history: Vec::new(),
                offline: false,
                closed: false,
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::session("memory driver state poisoned"))
    }

    /// Every call made so far, e.g. `goto /cart.html`, `click #checkout`
    pub fn calls(&self) -> Vec<String> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Whether network emulation is currently offline
    pub fn is_offline(&self) -> bool {
        self.lock().map(|s| s.offline).unwrap_or_default()
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.lock().map(|s| s.closed).unwrap_or_default()
    }

    /// Render the current document
    pub fn document(&self) -> ProbeResult<Document> {
        Ok(self.lock()?.document())
    }
}

fn split_origin(url: &str) -> (String, String) {
    if let Some(scheme_end) = url.find("://") {
        let after = scheme_end + 3;
        match url[after..].find('/') {
            Some(slash) => (url[..after + slash].to_string(), url[after + slash..].to_string()),
            None => (url.to_string(), "/".to_string()),
        }
    } else if url.starts_with('/') {
        (String::new(), url.to_string())
    } else {
        (String::new(), format!("/{url}"))
    }
}

#[async_trait]
impl SessionDriver for MemoryDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push(format!("goto {url}"));
        state.ensure_online(url)?;
        let (origin, path) = split_origin(url);
        if !origin.is_empty() {
            state.origin = origin;
        }
        let shown = state.app.navigate(&path);
        debug!(requested = %path, shown = %shown, "memory navigation");
        state.history.push(shown);
        Ok(())
    }

    async fn url(&self) -> ProbeResult<String> {
        let state = self.lock()?;
        state.ensure_open()?;
        Ok(state
            .path()
            .map_or_else(|| "about:blank".to_string(), |p| format!("{}{p}", state.origin)))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        self.lock()?.ensure_open()?;
        Ok("complete".to_string())
    }

    async fn go_back(&self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push("go_back".to_string());
        if state.history.len() > 1 {
            state.history.pop();
            if let Some(previous) = state.history.pop() {
                let shown = state.app.navigate(&previous);
                state.history.push(shown);
            }
        }
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push("reload".to_string());
        let Some(current) = state.path().map(str::to_string) else {
            return Ok(());
        };
        let url = format!("{}{current}", state.origin);
        state.ensure_online(&url)?;
        let shown = state.app.navigate(&current);
        if let Some(last) = state.history.last_mut() {
            *last = shown;
        }
        Ok(())
    }

    async fn title(&self) -> ProbeResult<String> {
        let state = self.lock()?;
        state.ensure_open()?;
        Ok(state.document().title)
    }

    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementSnapshot>> {
        let state = self.lock()?;
        state.ensure_open()?;
        let document = state.document();
        let flat = Flat::new(&document.root);
        let found = evaluate(&flat, query, Scope::Document)?;
        Ok(found
            .into_iter()
            .map(|i| ElementSnapshot {
                text: flat.nodes[i].text_content(),
                visible: flat.visible(i),
                inner_html: flat.nodes[i].inner_html(),
            })
            .collect())
    }

    async fn perform(&self, query: &ElementQuery, action: &ElementAction) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push(format!("{action} {query}"));
        let document = state.document();
        let flat = Flat::new(&document.root);
        let found = evaluate(&flat, query, Scope::Document)?;
        let Some(&index) = found.first() else {
            return Err(ProbeError::session(format!(
                "element `{query}` detached before {action}"
            )));
        };
        let target = flat.nodes[index].clone();
        let Some(path) = state.path().map(str::to_string) else {
            return Err(ProbeError::session("no document loaded"));
        };
        let navigated = match action {
            ElementAction::Click => state.app.click(&path, &target),
            ElementAction::Fill(value) => {
                state.app.fill(&path, &target, value);
                None
            }
            ElementAction::SelectOption(value) => state.app.select(&path, &target, value),
        };
        if let Some(next) = navigated {
            debug!(from = %path, to = %next, "client-side navigation");
            state.history.push(next);
        }
        Ok(())
    }

    async fn screenshot(&self, full_page: bool) -> ProbeResult<Vec<u8>> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push(format!("screenshot full_page={full_page}"));
        base64::engine::general_purpose::STANDARD
            .decode(BLANK_PNG_BASE64)
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn set_offline(&self, offline: bool) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.ensure_open()?;
        state.calls.push(format!("set_offline {offline}"));
        state.offline = offline;
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.calls.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
