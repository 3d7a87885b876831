use std::path::PathBuf;

use clap::Parser;
use keynav_check::cli::commands::{FOREGROUND_SUITE, build_context, resolve_target};
use keynav_check::cli::config::{
    AppConfig, Cli, ConfigError, ReportFormat, load_config, parse_config,
};
use keynav_check::frame::visual_diff::DiffPolicy;
use keynav_check::suite::suite_model::CheckKind;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_minimal() {
    let cli = Cli::parse_from(["keynav-check"]);
    assert_eq!(cli.target, None);
    assert_eq!(cli.verbose, 0);
    assert_eq!(cli.format, ReportFormat::Console);
    assert!(cli.checks.is_empty());
    assert!(cli.output.is_none());
    assert!(cli.config.is_none());
}

#[test]
fn cli_parse_all_args() {
    let cli = Cli::parse_from([
        "keynav-check",
        "com.example/.MainActivity",
        "-vv",
        "--config",
        "ci.yaml",
        "--format",
        "junit",
        "--output",
        "report.xml",
        "--check",
        "reachability",
        "--check",
        "cycle-length",
    ]);
    assert_eq!(cli.target.as_deref(), Some("com.example/.MainActivity"));
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    assert_eq!(cli.format, ReportFormat::Junit);
    assert_eq!(cli.output, Some(PathBuf::from("report.xml")));
    assert_eq!(cli.checks, vec![CheckKind::Reachability, CheckKind::CycleLength]);
}

#[test]
fn cli_rejects_unknown_check() {
    assert!(Cli::try_parse_from(["keynav-check", "--check", "colour_contrast"]).is_err());
}

#[test]
fn cli_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["keynav-check", "--format", "html"]).is_err());
}

// ============================================================================
// Target resolution
// ============================================================================

#[test]
fn resolve_target_accepts_package_activity() {
    let target = resolve_target(Some("com.example/.Main")).unwrap();
    assert_eq!(target.package, "com.example");
    assert_eq!(target.activity, ".Main");
}

#[test]
fn resolve_target_falls_back_to_foreground() {
    assert_eq!(resolve_target(None), None);
    assert_eq!(resolve_target(Some("not-a-target")), None);
    assert_eq!(FOREGROUND_SUITE, "foreground activity");
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults() {
    let config = parse_config("").unwrap();
    assert_eq!(config.explorer.max_cycle_length, 40);
    assert_eq!(config.explorer.max_top_level_elements, 15);
    assert_eq!(config.explorer.max_focus_retries, 100);
    assert_eq!(config.consistency.settle_ms, 1000);
    assert_eq!(config.consistency.interval_ms, 200);
    assert_eq!(config.lifecycle.launch_settle_ms, 5000);
    assert_eq!(config.lifecycle.dismiss_settle_ms, 2000);
    assert_eq!(config.diff.policy, DiffPolicy::Exhaustive);
    assert!(config.audit.whitelist.contains("id/back"));
    assert_eq!(config.bridge.command, "keynav-bridge");
    assert_eq!(config.output.dir, PathBuf::from("."));
    assert!(config.output.trace.is_none());
}

#[test]
fn config_partial_override() {
    let yaml = r#"
explorer:
  max_cycle_length: 60
diff:
  policy: strided
audit:
  whitelist:
    - id/toolbar_logo
bridge:
  command: adb-keynav
  args: ["--serial", "emulator-5554"]
output:
  dir: /tmp/shots
  trace: trace.jsonl
"#;
    let config = parse_config(yaml).unwrap();
    assert_eq!(config.explorer.max_cycle_length, 60);
    assert_eq!(config.explorer.max_top_level_elements, 15, "unset fields keep defaults");
    assert_eq!(config.diff.policy, DiffPolicy::Strided);
    assert!(config.audit.whitelist.contains("id/toolbar_logo"));
    assert!(!config.audit.whitelist.contains("id/back"), "a listed whitelist replaces the default");
    assert_eq!(config.bridge.command, "adb-keynav");
    assert_eq!(config.bridge.args, vec!["--serial", "emulator-5554"]);
    assert_eq!(config.output.dir, PathBuf::from("/tmp/shots"));
    assert_eq!(config.output.trace, Some(PathBuf::from("trace.jsonl")));
}

#[test]
fn config_rejects_malformed_yaml() {
    assert!(parse_config("explorer: [unclosed").is_err());
    assert!(parse_config("diff:\n  policy: sometimes\n").is_err());
}

#[test]
fn load_config_from_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keynav.yaml");
    std::fs::write(&path, "consistency:\n  interval_ms: 50\n").unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.consistency.interval_ms, 50);
}

#[test]
fn load_config_explicit_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");
    let err = load_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn load_config_malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "explorer: [").unwrap();
    let err = load_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.yaml"));
}

// ============================================================================
// Context assembly
// ============================================================================

#[test]
fn build_context_carries_config() {
    let mut config = AppConfig::default();
    config.explorer.max_cycle_length = 12;
    config.diff.policy = DiffPolicy::Strided;
    config.output.dir = PathBuf::from("shots");

    let ctx = build_context(resolve_target(Some("com.example/.Main")), &config);
    assert_eq!(ctx.explorer.max_cycle_length, 12);
    assert_eq!(ctx.diff_policy, DiffPolicy::Strided);
    assert_eq!(ctx.output_dir, PathBuf::from("shots"));
    assert_eq!(ctx.target.unwrap().to_string(), "com.example/.Main");
    assert!(!ctx.tracer.is_enabled());
    assert!(ctx.auditor.whitelist().contains("id/home"));
}

#[test]
fn build_context_enables_trace_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.output.trace = Some(dir.path().join("trace.jsonl"));

    let ctx = build_context(None, &config);
    assert!(ctx.tracer.is_enabled());
}
