//! Step and attachment recording for scenario reports.
//!
//! An [`Evidence`] handle is shared by a scenario's session and context.
//! Steps and attachments are appended as the scenario runs; when it ends,
//! [`Evidence::finish`] produces a [`ScenarioReport`] that serialises to
//! JSON, and [`render_junit`] turns a set of reports into JUnit XML for CI.

use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Outcome of a step or scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Completed without error
    Passed,
    /// Returned an error or panicked
    Failed,
}

impl Status {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// One annotated step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Human-readable step name
    pub name: String,
    /// Outcome
    pub status: Status,
    /// Wall time spent in the step
    pub duration_ms: u64,
    /// Error text on failure
    pub error: Option<String>,
}

/// A file written next to the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment name as given by the caller
    pub name: String,
    /// MIME type
    pub mime: String,
    /// Where the bytes were written
    pub path: PathBuf,
    /// Size in bytes
    pub size: usize,
}

/// Everything recorded for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Overall outcome
    pub status: Status,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Wall time for the whole scenario
    pub duration_ms: u64,
    /// Failure text, if any
    pub error: Option<String>,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
    /// Attachments in creation order
    pub attachments: Vec<Attachment>,
}

impl ScenarioReport {
    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug)]
struct EvidenceState {
    steps: Vec<StepRecord>,
    attachments: Vec<Attachment>,
}

/// Shared recorder for one scenario
#[derive(Debug, Clone)]
pub struct Evidence {
    name: Arc<str>,
    dir: PathBuf,
    started_at: DateTime<Utc>,
    state: Arc<Mutex<EvidenceState>>,
}

impl Evidence {
    /// Recorder writing attachments under `root/<scenario-slug>/`
    #[must_use]
    pub fn new(name: impl Into<String>, root: &Path) -> Self {
        let name: String = name.into();
        let dir = root.join(slug(&name));
        Self {
            name: name.into(),
            dir,
            started_at: Utc::now(),
            state: Arc::new(Mutex::new(EvidenceState {
                steps: Vec::new(),
                attachments: Vec::new(),
            })),
        }
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory attachments are written to
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> MutexGuard<'_, EvidenceState> {
        // A panic while holding the lock only interrupts an append.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append a step record
    pub fn record_step(&self, name: impl Into<String>, duration: Duration, error: Option<String>) {
        let status = if error.is_some() {
            Status::Failed
        } else {
            Status::Passed
        };
        self.lock().steps.push(StepRecord {
            name: name.into(),
            status,
            duration_ms: duration.as_millis() as u64,
            error,
        });
    }

    /// Write `bytes` to the evidence directory and record it
    pub fn attach(&self, name: &str, bytes: &[u8], mime: &str) -> ProbeResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let index = self.lock().attachments.len() + 1;
        let file = format!("{index:02}-{}.{}", slug(name), extension_for(mime));
        let path = self.dir.join(file);
        std::fs::write(&path, bytes)?;
        self.lock().attachments.push(Attachment {
            name: name.to_string(),
            mime: mime.to_string(),
            path: path.clone(),
            size: bytes.len(),
        });
        Ok(path)
    }

    /// Recorded steps so far
    #[must_use]
    pub fn steps(&self) -> Vec<StepRecord> {
        self.lock().steps.clone()
    }

    /// Recorded attachments so far
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.lock().attachments.clone()
    }

    /// Snapshot the recording as a finished report
    #[must_use]
    pub fn finish(&self, error: Option<String>) -> ScenarioReport {
        let state = self.lock();
        let elapsed = Utc::now() - self.started_at;
        ScenarioReport {
            name: self.name.to_string(),
            status: if error.is_some() {
                Status::Failed
            } else {
                Status::Passed
            },
            started_at: self.started_at,
            duration_ms: elapsed.num_milliseconds().max(0) as u64,
            error,
            steps: state.steps.clone(),
            attachments: state.attachments.clone(),
        }
    }
}

/// Render JUnit XML for a suite of scenario reports
#[must_use]
pub fn render_junit(suite: &str, reports: &[ScenarioReport]) -> String {
    let failures = reports.iter().filter(|r| !r.status.is_passed()).count();
    let total_ms: u64 = reports.iter().map(|r| r.duration_ms).sum();

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<testsuite name="{}" tests="{}" failures="{}" time="{:.3}">"#,
        escape_xml(suite),
        reports.len(),
        failures,
        total_ms as f64 / 1000.0
    ));
    xml.push('\n');

    for report in reports {
        xml.push_str(&format!(
            r#"  <testcase name="{}" time="{:.3}">"#,
            escape_xml(&report.name),
            report.duration_ms as f64 / 1000.0
        ));
        xml.push('\n');
        if let Some(error) = &report.error {
            xml.push_str(&format!(
                r#"    <failure message="{}">{}</failure>"#,
                escape_xml(error),
                escape_xml(error)
            ));
            xml.push('\n');
        }
        if !report.steps.is_empty() {
            let steps: Vec<String> = report
                .steps
                .iter()
                .map(|s| format!("{} [{:?}] {}ms", s.name, s.status, s.duration_ms))
                .collect();
            xml.push_str(&format!(
                "    <system-out>{}</system-out>\n",
                escape_xml(&steps.join("\n"))
            ));
        }
        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Lower-case, dash-separated file name fragment
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "application/json" => "json",
        "text/html" => "html",
        "text/plain" => "txt",
        _ => "bin",
    }
}
