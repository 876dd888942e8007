//! Chromium over the DevTools protocol.
//!
//! Every query is shipped to the page as JSON and evaluated by
//! [`RESOLVER_JS`], which walks the steps exactly like the in-memory
//! driver: document order, descendant selection, filters, then `nth`.

use super::{ElementAction, ElementSnapshot, SessionDriver};
use crate::config::ProbeConfig;
use crate::locator::ElementQuery;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::EmulateNetworkConditionsParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Evaluated as `(RESOLVER_JS)(query, action)`.
///
/// With `action === null` it returns `{ elements: [...] }`; otherwise it acts
/// on the first match and returns `{}`. Failures come back as `{ error }`,
/// with `invalidSelector` set when the page rejected a selector or regex.
pub const RESOLVER_JS: &str = r#"(query, action) => {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const textMatches = (m, raw) => {
    const text = norm(raw);
    switch (m.kind) {
      case 'exact': return text === norm(m.value);
      case 'contains': return text.toLowerCase().includes(norm(m.value).toLowerCase());
      case 'pattern': return new RegExp(m.value.source, m.value.ignore_case ? 'i' : '').test(text);
      default: return false;
    }
  };
  const typeOf = (el) => (el.getAttribute('type') || 'text').toLowerCase();
  const roleOf = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'select') return 'combobox';
    if (tag === 'textarea') return 'textbox';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'input') {
      const type = typeOf(el);
      if (['button', 'submit', 'reset', 'image'].includes(type)) return 'button';
      if (type === 'checkbox' || type === 'radio') return type;
      if (['text', 'email', 'tel', 'url', 'search'].includes(type)) return 'textbox';
    }
    return null;
  };
  const nameOf = (el) => {
    const label = el.getAttribute('aria-label');
    if (label !== null) return norm(label);
    const tag = el.tagName.toLowerCase();
    if (tag === 'input') {
      if (['button', 'submit', 'reset'].includes(typeOf(el))) return norm(el.value);
      return norm(el.getAttribute('placeholder'));
    }
    if (tag === 'textarea') return norm(el.getAttribute('placeholder'));
    return norm(el.textContent);
  };
  const matches = (el, sel) => {
    const v = sel.value;
    switch (sel.kind) {
      case 'css': return el.matches(v);
      case 'testId': return el.getAttribute(v.attribute) === v.value;
      case 'placeholder':
        return el.hasAttribute('placeholder') && textMatches(v, el.getAttribute('placeholder'));
      case 'role':
        return roleOf(el) === v.role && (!v.name || textMatches(v.name, nameOf(el)));
      case 'text':
        return textMatches(v, el.textContent)
          && !Array.from(el.children).some((c) => textMatches(v, c.textContent));
      default: return false;
    }
  };
  const all = () => Array.from(document.querySelectorAll('*'));
  const evaluate = (q, scope) => {
    let current = scope;
    for (const step of q.steps) {
      if (step.kind === 'select') {
        let pool;
        if (current === null) {
          pool = all();
        } else {
          const inside = new Set();
          for (const root of current) for (const d of root.querySelectorAll('*')) inside.add(d);
          pool = all().filter((el) => inside.has(el));
        }
        current = pool.filter((el) => matches(el, step.value));
      } else if (step.kind === 'filter') {
        const f = step.value;
        current = (current || []).filter((el) => f.kind === 'hasText'
          ? textMatches(f.value, el.textContent)
          : evaluate(f.value, [el]).length > 0);
      } else if (step.kind === 'nth') {
        const set = current || [];
        const i = step.value < 0 ? set.length + step.value : step.value;
        current = i >= 0 && i < set.length ? [set[i]] : [];
      }
    }
    return current || [];
  };
  const visible = (el) => {
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0 && getComputedStyle(el).visibility !== 'hidden';
  };
  const setValue = (el, proto, value) => {
    Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, value);
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };
  let found;
  try {
    found = evaluate(query, null);
  } catch (e) {
    return { error: String(e), invalidSelector: true };
  }
  if (action === null) {
    return {
      elements: found.map((el) => ({
        text: el.textContent || '',
        visible: visible(el),
        inner_html: el.innerHTML,
      })),
    };
  }
  const el = found[0];
  if (!el) return { error: 'element detached' };
  switch (action.kind) {
    case 'click':
      el.scrollIntoView({ block: 'center' });
      el.click();
      break;
    case 'fill':
      el.focus();
      setValue(el, el instanceof HTMLTextAreaElement
        ? HTMLTextAreaElement.prototype
        : HTMLInputElement.prototype, action.value);
      break;
    case 'selectOption':
      if (!Array.from(el.options || []).some((o) => o.value === action.value)) {
        return { error: `no option with value ${action.value}` };
      }
      setValue(el, HTMLSelectElement.prototype, action.value);
      break;
    default:
      return { error: `unknown action ${action.kind}` };
  }
  return {};
}"#;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resolution {
    #[serde(default)]
    elements: Vec<ElementSnapshot>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    invalid_selector: bool,
}

/// Driver for one headless (or headed) Chromium with a throwaway profile
pub struct ChromiumDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
    profile: TempDir,
    action_timeout: Duration,
    poll_interval: Duration,
    closed: AtomicBool,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("profile", &self.profile.path())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn launch_error(e: impl fmt::Display) -> ProbeError {
    ProbeError::BrowserLaunch {
        message: e.to_string(),
    }
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: &ProbeConfig) -> ProbeResult<Self> {
        let profile = tempfile::Builder::new()
            .prefix("swaglabs-probe-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            });
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = Browser::launch(cdp_config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(launch_error)?;
        info!(
            headless = config.headless,
            profile = %profile.path().display(),
            "chromium launched"
        );

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            profile,
            action_timeout: config.action_timeout(),
            poll_interval: config.poll_interval(),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ProbeError::session("browser session is closed"));
        }
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, expression: String) -> ProbeResult<T> {
        self.ensure_open()?;
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| ProbeError::session(format!("evaluate failed: {e}")))?;
        result
            .into_value()
            .map_err(|e| ProbeError::session(format!("unexpected evaluate result: {e}")))
    }

    async fn resolve(
        &self,
        query: &ElementQuery,
        action: Option<&ElementAction>,
    ) -> ProbeResult<Resolution> {
        let query_json = serde_json::to_string(query)?;
        let action_json = serde_json::to_string(&action)?;
        let mut resolution: Resolution = self
            .eval(format!("({RESOLVER_JS})({query_json}, {action_json})"))
            .await?;
        let Some(message) = resolution.error.take() else {
            return Ok(resolution);
        };
        if resolution.invalid_selector {
            return Err(ProbeError::InvalidSelector {
                selector: query.to_string(),
                message,
            });
        }
        Err(ProbeError::session(format!("`{query}`: {message}")))
    }
}

#[async_trait]
impl SessionDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn url(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ProbeError::session(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        self.eval("document.readyState".to_string()).await
    }

    async fn go_back(&self) -> ProbeResult<()> {
        let before = self.url().await?;
        let _: bool = self.eval("(history.back(), true)".to_string()).await?;
        let deadline = tokio::time::Instant::now() + self.action_timeout;
        while tokio::time::Instant::now() < deadline {
            if self.url().await? != before {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        debug!(url = %before, "history back left the URL unchanged");
        Ok(())
    }

    async fn reload(&self) -> ProbeResult<()> {
        self.ensure_open()?;
        let url = self.url().await?;
        self.page
            .reload()
            .await
            .map_err(|e| ProbeError::Navigation {
                url,
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| ProbeError::session(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementSnapshot>> {
        Ok(self.resolve(query, None).await?.elements)
    }

    async fn perform(&self, query: &ElementQuery, action: &ElementAction) -> ProbeResult<()> {
        self.resolve(query, Some(action)).await.map(|_| ())
    }

    async fn screenshot(&self, full_page: bool) -> ProbeResult<Vec<u8>> {
        self.ensure_open()?;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .capture_beyond_viewport(full_page)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn set_offline(&self, offline: bool) -> ProbeResult<()> {
        self.ensure_open()?;
        let params = EmulateNetworkConditionsParams::new(offline, 0.0, -1.0, -1.0);
        self.page
            .execute(params)
            .await
            .map_err(|e| ProbeError::session(format!("network emulation failed: {e}")))?;
        debug!(offline, "network conditions");
        Ok(())
    }

    async fn close(&self) -> ProbeResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        if let Err(e) = self.page.clone().close().await {
            warn!(error = %e, "page did not close cleanly");
        }
        browser.close().await.map_err(launch_error)?;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "chromium did not exit cleanly");
        }
        self.handler.abort();
        info!("chromium closed");
        Ok(())
    }
}
