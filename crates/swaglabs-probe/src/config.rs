//! Suite configuration.
//!
//! One [`ProbeConfig`] is shared (behind an `Arc`) by every session a test
//! creates. It can be built in code, read from `SWAG_*` environment
//! variables, or loaded from YAML; missing YAML keys fall back to defaults.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Storefront under test
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// Attribute the storefront uses for test ids
pub const DEFAULT_TEST_ID_ATTRIBUTE: &str = "data-test";

/// Default bound for element waits (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Default bound for navigation and load-state waits (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Configuration for sessions, locators and evidence output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Origin every relative path is resolved against
    pub base_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Attribute matched by `get_by_test_id`
    pub test_id_attribute: String,
    /// Bound for element waits, in milliseconds
    pub action_timeout_ms: u64,
    /// Bound for navigation and load-state waits, in milliseconds
    pub navigation_timeout_ms: u64,
    /// Polling interval for auto-waiting, in milliseconds
    pub poll_interval_ms: u64,
    /// Where screenshots and attachments are written
    pub evidence_dir: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            test_id_attribute: DEFAULT_TEST_ID_ATTRIBUTE.to_string(),
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            evidence_dir: PathBuf::from("target/evidence"),
        }
    }
}

impl ProbeConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the test-id attribute
    #[must_use]
    pub fn with_test_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.test_id_attribute = attribute.into();
        self
    }

    /// Set the element wait bound
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the navigation wait bound
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the evidence directory
    #[must_use]
    pub fn with_evidence_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.evidence_dir = dir.into();
        self
    }

    /// Element wait bound
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Navigation wait bound
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Resolve a route or absolute URL against the base URL.
    ///
    /// Absolute `http(s)` URLs pass through untouched.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path == "about:blank" {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            return format!("{base}/");
        }
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Read overrides from the process environment
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary key lookup.
    ///
    /// Recognised keys: `SWAG_BASE_URL`, `SWAG_HEADLESS`, `CHROMIUM_PATH`,
    /// `SWAG_NO_SANDBOX`, `SWAG_ACTION_TIMEOUT_MS`,
    /// `SWAG_NAVIGATION_TIMEOUT_MS`, `SWAG_EVIDENCE_DIR`.
    pub fn from_lookup<F>(lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("SWAG_BASE_URL") {
            config.base_url = url;
        }
        if let Some(value) = lookup("SWAG_HEADLESS") {
            config.headless = parse_flag("SWAG_HEADLESS", &value)?;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            config.chromium_path = Some(path);
        }
        if let Some(value) = lookup("SWAG_NO_SANDBOX") {
            config.sandbox = !parse_flag("SWAG_NO_SANDBOX", &value)?;
        }
        if let Some(value) = lookup("SWAG_ACTION_TIMEOUT_MS") {
            config.action_timeout_ms = parse_millis("SWAG_ACTION_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("SWAG_NAVIGATION_TIMEOUT_MS") {
            config.navigation_timeout_ms = parse_millis("SWAG_NAVIGATION_TIMEOUT_MS", &value)?;
        }
        if let Some(dir) = lookup("SWAG_EVIDENCE_DIR") {
            config.evidence_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Parse a YAML document; absent keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

fn parse_flag(key: &str, value: &str) -> ProbeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::Config {
            message: format!("{key} must be a boolean, got `{other}`"),
        }),
    }
}

fn parse_millis(key: &str, value: &str) -> ProbeResult<u64> {
    value.trim().parse::<u64>().map_err(|e| ProbeError::Config {
        message: format!("{key} must be milliseconds: {e}"),
    })
}
