use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::audit::auditor::{AuditResult, Auditor};
use crate::audit::whitelist::Whitelist;
use crate::device::Device;
use crate::device::error::DeviceError;
use crate::explorer::explorer::FocusExplorer;
use crate::explorer::explorer_model::{ExplorationReport, ExplorerConfig, Transition};
use crate::frame::frame_model::FrameCapture;
use crate::frame::visual_diff::{DiffPolicy, frames_equal};
use crate::node::node_model::{NodeFilter, Target};
use crate::render::annotate::{Annotation, argb_to_rgba, render_annotations};
use crate::render::persist::persist_async;
use crate::suite::suite_model::{CheckKind, CheckResult, ConsistencyConfig};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Outline colour for clickable elements that focus never reached.
pub const UNREACHABLE_COLOR: u32 = 0xff000000;
/// Outline colour for focusable elements that are not clickable.
pub const TRAP_COLOR: u32 = 0xff0000ff;
/// Filename suffix of the reachability diagnostic image.
pub const DIAGNOSTIC_SUFFIX: &str = "inaccessible_elements";

/// Everything the checks need besides the device.
pub struct CheckContext {
    pub target: Option<Target>,
    pub explorer: ExplorerConfig,
    pub consistency: ConsistencyConfig,
    pub diff_policy: DiffPolicy,
    pub auditor: Auditor,
    pub output_dir: PathBuf,
    pub tracer: Arc<TraceLogger>,
}

impl Default for CheckContext {
    fn default() -> Self {
        Self {
            target: None,
            explorer: ExplorerConfig::default(),
            consistency: ConsistencyConfig::default(),
            diff_policy: DiffPolicy::default(),
            auditor: Auditor::new(Whitelist::default()),
            output_dir: PathBuf::from("."),
            tracer: Arc::new(TraceLogger::disabled()),
        }
    }
}

impl CheckContext {
    fn explorer(&self, check: CheckKind) -> FocusExplorer {
        FocusExplorer::new(self.explorer.clone()).with_tracer(check.name(), self.tracer.clone())
    }

    fn bound_exceeded(&self, check: CheckKind, report: &ExplorationReport) -> CheckResult {
        CheckResult::fail(
            check,
            format!(
                "Focus did not return to a previously visited element within {} steps \
                 (observed {} distinct elements without closing the cycle)",
                self.explorer.max_cycle_length,
                report.cycle_length()
            ),
        )
    }
}

/// Dispatch to the check named by `kind`.
pub fn run_check<D: Device + ?Sized>(kind: CheckKind, device: &mut D, ctx: &CheckContext) -> CheckResult {
    match kind {
        CheckKind::CycleLength => check_cycle_length(device, ctx),
        CheckKind::ScreenshotConsistency => check_screenshot_consistency(device, ctx),
        CheckKind::FocusIndicator => check_focus_indicator(device, ctx),
        CheckKind::Reachability => check_reachability(device, ctx),
    }
}

// ============================================================================
// Cycle length
// ============================================================================

/// The top-level focus cycle must close and hold no more than
/// `max_top_level_elements` elements.
pub fn check_cycle_length<D: Device + ?Sized>(device: &mut D, ctx: &CheckContext) -> CheckResult {
    let check = CheckKind::CycleLength;
    let report = match ctx.explorer(check).run(device) {
        Ok(r) => r,
        Err(e) => return CheckResult::errored(check, e),
    };

    if !report.cycle_closed() {
        return ctx.bound_exceeded(check, &report);
    }

    let found = report.cycle_length();
    let max = ctx.explorer.max_top_level_elements;
    let result = if found <= max {
        CheckResult::pass(check)
    } else {
        CheckResult::fail(
            check,
            format!(
                "There should be at most {} elements to tab through at the top level \
                 of the activity, but found {}",
                max, found
            ),
        )
    };

    with_short_cycle_note(result, &report)
}

// ============================================================================
// Screenshot consistency
// ============================================================================

/// Two captures of an idle screen taken a short interval apart must match.
pub fn check_screenshot_consistency<D: Device + ?Sized>(
    device: &mut D,
    ctx: &CheckContext,
) -> CheckResult {
    let check = CheckKind::ScreenshotConsistency;
    let (a, b) = match capture_pair(device, &ctx.consistency) {
        Ok(pair) => pair,
        Err(e) => return CheckResult::errored(check, e),
    };

    if frames_equal(&a, &b, ctx.diff_policy) {
        CheckResult::pass(check)
    } else {
        CheckResult::fail(
            check,
            "Two screenshots taken within a short interval are not identical. \
             Are you using a live wallpaper?",
        )
    }
}

/// Idle wait, capture, pause, capture.
fn capture_pair<D: Device + ?Sized>(
    device: &mut D,
    timing: &ConsistencyConfig,
) -> Result<(FrameCapture, FrameCapture), DeviceError> {
    device.wait_for_idle(Duration::from_millis(timing.settle_ms))?;
    let first = device.capture_frame()?;
    thread::sleep(Duration::from_millis(timing.interval_ms));
    let second = device.capture_frame()?;
    Ok((first, second))
}

// ============================================================================
// Focus indicator
// ============================================================================

/// Each focus-advance that reaches a new element must change the screen.
///
/// Frames are captured only after advances that reach a new element,
/// including the one that uses up the step budget; the first capture has
/// nothing to compare against.
pub fn check_focus_indicator<D: Device + ?Sized>(device: &mut D, ctx: &CheckContext) -> CheckResult {
    let check = CheckKind::FocusIndicator;
    let mut explorer = ctx.explorer(check);
    let mut previous: Option<FrameCapture> = None;

    while !explorer.state().is_terminal() {
        let transition = match explorer.step(device) {
            Ok(t) => t,
            Err(e) => return CheckResult::errored(check, e),
        };

        let fingerprint = match transition {
            Transition::Visited { fingerprint } | Transition::BoundExceeded { fingerprint, .. } => {
                fingerprint
            }
            _ => continue,
        };

        let current = match device.capture_frame() {
            Ok(f) => f,
            Err(e) => return CheckResult::errored(check, e),
        };
        ctx.tracer.log(
            &TraceEvent::now(check.name(), explorer.steps(), explorer.state())
                .with_frame_digest(current.digest())
                .with_note("frame_captured"),
        );

        if let Some(prev) = &previous {
            if frames_equal(prev, &current, ctx.diff_policy) {
                return CheckResult::fail(
                    check,
                    format!(
                        "Moving focus to {} produced no visible change on screen",
                        fingerprint
                    ),
                );
            }
        }
        previous = Some(current);
    }

    match explorer.into_report() {
        Some(report) if !report.cycle_closed() => {
            warn!(
                "focus indicator check stopped after {} steps without closing the cycle",
                report.steps
            );
            CheckResult::pass(check).with_detail(format!(
                "Exploration stopped after {} steps without returning to a visited element",
                report.steps
            ))
        }
        Some(report) => with_short_cycle_note(CheckResult::pass(check), &report),
        None => CheckResult::pass(check),
    }
}

// ============================================================================
// Reachability
// ============================================================================

/// Every clickable element must be reachable by focus-advance, and every
/// reachable element must be clickable.
///
/// On failure, an annotated screenshot marking the offending elements is
/// written in the background.
pub fn check_reachability<D: Device + ?Sized>(device: &mut D, ctx: &CheckContext) -> CheckResult {
    let check = CheckKind::Reachability;
    let report = match ctx.explorer(check).run(device) {
        Ok(r) => r,
        Err(e) => return CheckResult::errored(check, e),
    };

    if !report.cycle_closed() {
        return ctx.bound_exceeded(check, &report);
    }

    let filter = NodeFilter::clickable().scoped_to(ctx.target.as_ref());
    let clickable = match device.query_nodes(&filter) {
        Ok(nodes) => nodes,
        Err(e) => return CheckResult::errored(check, e),
    };

    let audit = ctx.auditor.audit(report.visited.nodes(), &clickable);
    let Some(message) = audit.failure_message() else {
        return with_short_cycle_note(CheckResult::pass(check), &report);
    };

    let mut result = CheckResult::fail(check, message).with_details(audit.diagnostics());
    if let Some(path) = write_diagnostic_image(device, ctx, &audit) {
        result = result.with_artifact(path);
    }
    with_short_cycle_note(result, &report)
}

/// Capture the screen, outline the violations and hand the image to a
/// background writer. Capture failures are logged; the audit outcome never
/// depends on this.
fn write_diagnostic_image<D: Device + ?Sized>(
    device: &mut D,
    ctx: &CheckContext,
    audit: &AuditResult,
) -> Option<PathBuf> {
    let frame = match device.capture_frame() {
        Ok(f) => f,
        Err(e) => {
            warn!("could not capture frame for diagnostic image: {}", e);
            return None;
        }
    };

    let unreachable = audit
        .unreachable
        .iter()
        .map(|n| Annotation::visible(n.bounds, argb_to_rgba(UNREACHABLE_COLOR)));
    let traps = audit
        .focusable_traps
        .iter()
        .map(|n| Annotation::visible(n.bounds, argb_to_rgba(TRAP_COLOR)));
    let annotations: Vec<Annotation> = unreachable.chain(traps).collect();

    let img = render_annotations(&frame, &annotations);
    let pending = persist_async(img, &ctx.output_dir, DIAGNOSTIC_SUFFIX);
    info!("writing diagnostic image to {}", pending.path.display());
    Some(pending.path.clone())
}

fn with_short_cycle_note(result: CheckResult, report: &ExplorationReport) -> CheckResult {
    if report.short_cycle {
        let closing = report.closing_fingerprint.as_deref().unwrap_or("?");
        result.with_detail(format!(
            "Focus returned to previously visited element {} instead of the initial one; \
             is there a short cycle in keyboard-navigable elements?",
            closing
        ))
    } else {
        result
    }
}
