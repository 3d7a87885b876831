use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The accessibility checks a suite can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Top-level tab order is short enough
    CycleLength,

    /// Two frames of a static screen are identical
    ScreenshotConsistency,

    /// Every focus change is visible on screen
    FocusIndicator,

    /// Every clickable element is reachable by keyboard and vice versa
    Reachability,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::CycleLength,
        CheckKind::ScreenshotConsistency,
        CheckKind::FocusIndicator,
        CheckKind::Reachability,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::CycleLength => "cycle_length",
            CheckKind::ScreenshotConsistency => "screenshot_consistency",
            CheckKind::FocusIndicator => "focus_indicator",
            CheckKind::Reachability => "reachability",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of running one check scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,

    pub passed: bool,

    /// Single assertion message when the check failed
    pub message: Option<String>,

    /// Error message if a collaborator failed (not an assertion failure)
    pub error: Option<String>,

    /// Per-element diagnostics and anomalies, for operator triage
    #[serde(default)]
    pub details: Vec<String>,

    /// Diagnostic image scheduled for writing, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

impl CheckResult {
    pub fn pass(check: CheckKind) -> Self {
        Self {
            check,
            passed: true,
            message: None,
            error: None,
            details: Vec::new(),
            artifact: None,
            duration_ms: None,
        }
    }

    pub fn fail(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
            ..Self::pass(check)
        }
    }

    pub fn errored(check: CheckKind, error: impl fmt::Display) -> Self {
        Self {
            passed: false,
            error: Some(error.to_string()),
            ..Self::pass(check)
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact = Some(path);
        self
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

// ============================================================================
// Timing configuration
// ============================================================================

/// Timing of the static-screen consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Idle wait before the first capture (default 1000)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Delay between the two captures (default 200)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// Settle times around launching and dismissing the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_launch_settle_ms")]
    pub launch_settle_ms: u64,

    #[serde(default = "default_dismiss_settle_ms")]
    pub dismiss_settle_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            launch_settle_ms: default_launch_settle_ms(),
            dismiss_settle_ms: default_dismiss_settle_ms(),
        }
    }
}

fn default_settle_ms() -> u64 { 1000 }
fn default_interval_ms() -> u64 { 200 }
fn default_launch_settle_ms() -> u64 { 5000 }
fn default_dismiss_settle_ms() -> u64 { 2000 }
