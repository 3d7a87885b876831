use std::sync::Arc;

use tracing::info;

use crate::audit::auditor::Auditor;
use crate::cli::config::{AppConfig, Cli, ReportFormat};
use crate::device::bridge::BridgeSession;
use crate::node::node_model::Target;
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::SuiteReport;
use crate::suite::checks::CheckContext;
use crate::suite::runner::SuiteRunner;
use crate::trace::logger::TraceLogger;

/// Suite name used when no target was given.
pub const FOREGROUND_SUITE: &str = "foreground activity";

/// Interpret the optional positional target token.
///
/// Anything without a `package/activity` shape means "use the foreground
/// activity"; that fallback is announced in the log.
pub fn resolve_target(token: Option<&str>) -> Option<Target> {
    let target = token.and_then(Target::parse);
    if target.is_none() {
        info!(
            "No activity specified in argument (e.g. 'package/activity'), \
             using activity currently on top of the stack."
        );
    }
    target
}

/// Assemble the check context from the resolved target and config.
pub fn build_context(target: Option<Target>, config: &AppConfig) -> CheckContext {
    let tracer = match &config.output.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    CheckContext {
        target,
        explorer: config.explorer.clone(),
        consistency: config.consistency.clone(),
        diff_policy: config.diff.policy,
        auditor: Auditor::new(config.audit.whitelist.clone()),
        output_dir: config.output.dir.clone(),
        tracer: Arc::new(tracer),
    }
}

/// Run the check suite over the device bridge. Returns whether every check
/// passed.
pub fn cmd_check(cli: &Cli, config: &AppConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let target = resolve_target(cli.target.as_deref());
    let suite_name = target
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| FOREGROUND_SUITE.to_string());

    let mut runner = SuiteRunner::new(build_context(target, config), config.lifecycle.clone());
    if !cli.checks.is_empty() {
        runner = runner.with_checks(cli.checks.clone());
    }

    if cli.verbose > 0 {
        info!(
            "running {} checks against {} via '{}'",
            runner.checks.len(),
            suite_name,
            config.bridge.command
        );
    }

    let mut session = BridgeSession::launch(&config.bridge.command, &config.bridge.args)?;
    let start = std::time::Instant::now();
    let results = runner.run(&mut session);
    let duration = start.elapsed().as_millis();
    session.quit()?;

    let report = SuiteReport::from_results(&suite_name, results).with_duration(duration);
    let all_passed = report.all_passed();

    let output_content = match cli.format {
        ReportFormat::Junit => generate_junit_xml(&report),
        ReportFormat::Console => format_console_report(&report),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}
