use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::whitelist::Whitelist;
use crate::explorer::explorer_model::ExplorerConfig;
use crate::frame::visual_diff::DiffPolicy;
use crate::suite::suite_model::{CheckKind, ConsistencyConfig, LifecycleConfig};

/// Config file looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "keynav-check.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "keynav-check",
    version,
    about = "Checks that every control on screen is reachable with the keyboard"
)]
pub struct Cli {
    /// Screen under test as `package/activity`; omit to use whatever is in
    /// the foreground
    pub target: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file (default: keynav-check.yaml in current dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run only these checks (repeatable; default: all)
    #[arg(long = "check", value_enum)]
    pub checks: Vec<CheckKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Junit,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `keynav-check.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub consistency: ConsistencyConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub policy: DiffPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Identifiers exempt from the unreachable category
    #[serde(default)]
    pub whitelist: Whitelist,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Device bridge executable
    #[serde(default = "default_bridge_command")]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: default_bridge_command(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for diagnostic screenshots
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Exploration trace (JSONL); disabled when absent
    pub trace: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            trace: None,
        }
    }
}

// Serde default helpers
fn default_bridge_command() -> String { "keynav-bridge".to_string() }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

// ============================================================================
// Config File Loading
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Load the YAML config.
///
/// Without an explicit path a missing `keynav-check.yaml` means defaults; an
/// explicit path must exist. A file that exists but does not parse is
/// always an error.
pub fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig, ConfigError> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            });
        }
    };

    parse_config(&content).map_err(|source| ConfigError::Parse {
        path: config_path,
        source,
    })
}

/// Parse YAML config text; an empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(content)
}
