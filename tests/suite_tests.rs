use std::path::Path;
use std::time::{Duration, Instant};

use image::Rgba;

use keynav_check::audit::auditor::Auditor;
use keynav_check::audit::whitelist::Whitelist;
use keynav_check::device::scripted::{DeviceEvent, ScriptedDevice};
use keynav_check::explorer::explorer_model::ExplorerConfig;
use keynav_check::node::identity::fingerprint;
use keynav_check::node::node_model::{NodePredicate, Target};
use keynav_check::suite::checks::{
    CheckContext, DIAGNOSTIC_SUFFIX, check_cycle_length, check_focus_indicator,
    check_reachability, check_screenshot_consistency,
};
use keynav_check::suite::runner::SuiteRunner;
use keynav_check::suite::suite_model::{
    CheckKind, CheckResult, ConsistencyConfig, LifecycleConfig,
};

use crate::common::fixtures::{distinct_nodes, node, non_clickable, shaded_frames, solid_frame};

mod common;

/// Context with no settle delays and an empty whitelist.
fn context(output_dir: &Path) -> CheckContext {
    CheckContext {
        consistency: ConsistencyConfig {
            settle_ms: 0,
            interval_ms: 0,
        },
        auditor: Auditor::new(Whitelist::empty()),
        output_dir: output_dir.to_path_buf(),
        ..CheckContext::default()
    }
}

fn wait_for_file(path: &Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if image::open(path).is_ok() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

// =========================================================================
// Cycle length
// =========================================================================

#[test]
fn cycle_length_passes_for_short_cycle() {
    let (a, b, c) = (node("id/a", 0), node("id/b", 1), node("id/c", 2));
    let mut device = ScriptedDevice::with_focus_sequence(vec![a.clone(), b, c, a]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_cycle_length(&mut device, &context(dir.path()));
    assert!(result.passed, "{:?}", result);
    assert!(result.details.is_empty());
}

#[test]
fn cycle_length_fails_above_top_level_ceiling() {
    let mut nodes = distinct_nodes(20);
    nodes.push(nodes[0].clone());
    let mut device = ScriptedDevice::with_focus_sequence(nodes);
    let dir = tempfile::tempdir().unwrap();

    let result = check_cycle_length(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert_eq!(
        result.message.as_deref(),
        Some(
            "There should be at most 15 elements to tab through at the top level \
             of the activity, but found 20"
        )
    );
}

#[test]
fn cycle_length_fails_when_bound_exceeded() {
    let mut device = ScriptedDevice::with_focus_sequence(distinct_nodes(60));
    let dir = tempfile::tempdir().unwrap();

    let result = check_cycle_length(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert!(result.error.is_none());
    assert!(result.message.unwrap().contains("within 40 steps"));
}

#[test]
fn short_cycle_is_reported_as_detail() {
    let (a, b, c) = (node("id/a", 0), node("id/b", 1), node("id/c", 2));
    let mut device = ScriptedDevice::with_focus_sequence(vec![a, b.clone(), c, b.clone()]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_cycle_length(&mut device, &context(dir.path()));
    assert!(result.passed);
    assert_eq!(result.details.len(), 1);
    assert!(result.details[0].contains(&fingerprint(Some(&b))));
    assert!(result.details[0].contains("short cycle"));
}

#[test]
fn exploration_error_becomes_errored_result() {
    let mut device = ScriptedDevice::new(vec![]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        explorer: ExplorerConfig {
            max_focus_retries: 3,
            ..ExplorerConfig::default()
        },
        ..context(dir.path())
    };

    let result = check_cycle_length(&mut device, &ctx);
    assert!(!result.passed);
    assert!(result.message.is_none());
    assert!(result.error.unwrap().contains("no focusable element"));
}

// =========================================================================
// Screenshot consistency
// =========================================================================

#[test]
fn consistency_passes_for_static_screen() {
    let mut device =
        ScriptedDevice::default().with_frames(vec![solid_frame(8, 8, [1, 2, 3, 255])]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_screenshot_consistency(&mut device, &context(dir.path()));
    assert!(result.passed);
    assert_eq!(
        device.events,
        vec![
            DeviceEvent::WaitIdle(Duration::ZERO),
            DeviceEvent::Capture,
            DeviceEvent::Capture,
        ]
    );
}

#[test]
fn consistency_fails_for_live_wallpaper() {
    let mut device = ScriptedDevice::default().with_frames(shaded_frames(2));
    let dir = tempfile::tempdir().unwrap();

    let result = check_screenshot_consistency(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert_eq!(
        result.message.as_deref(),
        Some(
            "Two screenshots taken within a short interval are not identical. \
             Are you using a live wallpaper?"
        )
    );
}

#[test]
fn consistency_capture_failure_is_an_error() {
    let mut device = ScriptedDevice::default();
    let dir = tempfile::tempdir().unwrap();

    let result = check_screenshot_consistency(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert!(result.error.is_some());
}

// =========================================================================
// Focus indicator
// =========================================================================

#[test]
fn focus_indicator_passes_when_every_move_changes_screen() {
    let (a, b, c) = (node("id/a", 0), node("id/b", 1), node("id/c", 2));
    let mut device =
        ScriptedDevice::with_focus_sequence(vec![a.clone(), b, c, a]).with_frames(shaded_frames(3));
    let dir = tempfile::tempdir().unwrap();

    let result = check_focus_indicator(&mut device, &context(dir.path()));
    assert!(result.passed, "{:?}", result);

    let captures = device
        .events
        .iter()
        .filter(|e| **e == DeviceEvent::Capture)
        .count();
    assert_eq!(captures, 2, "one capture per newly visited element");
}

#[test]
fn focus_indicator_fails_on_invisible_focus_change() {
    let (a, b, c) = (node("id/a", 0), node("id/b", 1), node("id/c", 2));
    let mut device = ScriptedDevice::with_focus_sequence(vec![a.clone(), b, c.clone(), a])
        .with_frames(vec![solid_frame(4, 4, [9, 9, 9, 255])]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_focus_indicator(&mut device, &context(dir.path()));
    assert!(!result.passed);
    let message = result.message.unwrap();
    assert!(message.contains(&fingerprint(Some(&c))), "{}", message);
    assert!(message.contains("no visible change"));
}

#[test]
fn focus_indicator_bound_exceeded_passes_with_detail() {
    let mut device =
        ScriptedDevice::with_focus_sequence(distinct_nodes(60)).with_frames(shaded_frames(60));
    let dir = tempfile::tempdir().unwrap();

    let result = check_focus_indicator(&mut device, &context(dir.path()));
    assert!(result.passed);
    assert_eq!(result.details.len(), 1);
    assert!(result.details[0].contains("without returning"));

    let captures = device
        .events
        .iter()
        .filter(|e| **e == DeviceEvent::Capture)
        .count();
    assert_eq!(captures, 39, "the advance that reaches the bound is captured too");
}

#[test]
fn focus_indicator_compares_element_that_reaches_bound() {
    let (a, b, c) = (node("id/a", 0), node("id/b", 1), node("id/c", 2));
    let mut device = ScriptedDevice::with_focus_sequence(vec![a, b, c.clone()])
        .with_frames(vec![solid_frame(4, 4, [9, 9, 9, 255])]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        explorer: ExplorerConfig {
            max_cycle_length: 3,
            ..ExplorerConfig::default()
        },
        ..context(dir.path())
    };

    let result = check_focus_indicator(&mut device, &ctx);
    assert!(!result.passed, "{:?}", result);
    assert!(result.message.unwrap().contains(&fingerprint(Some(&c))));
}

// =========================================================================
// Reachability
// =========================================================================

#[test]
fn reachability_passes_when_every_clickable_is_reached() {
    let (x, w) = (node("id/x", 0), node("id/w", 1));
    let mut device = ScriptedDevice::with_focus_sequence(vec![x.clone(), w.clone(), x.clone()])
        .with_clickable(vec![x, w])
        .with_frames(vec![solid_frame(4, 4, [0, 0, 0, 255])]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_reachability(&mut device, &context(dir.path()));
    assert!(result.passed, "{:?}", result);
    assert!(result.artifact.is_none());
    assert!(!device.events.contains(&DeviceEvent::Capture));
}

#[test]
fn reachability_queries_clickable_after_exploring() {
    let x = node("id/x", 0);
    let mut device = ScriptedDevice::with_focus_sequence(vec![x.clone(), x.clone()])
        .with_clickable(vec![x]);
    let dir = tempfile::tempdir().unwrap();

    check_reachability(&mut device, &context(dir.path()));

    let last_focus = device
        .events
        .iter()
        .rposition(|e| *e == DeviceEvent::Query(NodePredicate::Focused))
        .unwrap();
    let clickable = device
        .events
        .iter()
        .position(|e| *e == DeviceEvent::Query(NodePredicate::Clickable))
        .unwrap();
    assert!(clickable > last_focus);
}

#[test]
fn reachability_failure_writes_annotated_screenshot() {
    let x = node("id/x", 0);
    let y = non_clickable("id/y", 1);
    let z = node("id/z", 2);
    let mut device = ScriptedDevice::with_focus_sequence(vec![x.clone(), y, x.clone()])
        .with_clickable(vec![x, z])
        .with_frames(vec![solid_frame(200, 200, [128, 128, 128, 255])]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_reachability(&mut device, &context(dir.path()));

    assert!(!result.passed);
    assert!(result.message.unwrap().starts_with("Some issues were found"));
    assert_eq!(result.details.len(), 2);
    assert!(result.details[0].contains("id: id/y"));
    assert!(result.details[1].contains("id: id/z"));

    let artifact = result.artifact.expect("artifact path");
    assert!(artifact.starts_with(dir.path()));
    let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with(&format!("_{}.png", DIAGNOSTIC_SUFFIX)), "{}", name);

    assert!(wait_for_file(&artifact), "diagnostic image was never written");
    let img = image::open(&artifact).unwrap().to_rgba8();
    // z spans y 100..140: black band above it, white contrast on its edge.
    assert_eq!(*img.get_pixel(50, 98), Rgba([0, 0, 0, 255]));
    assert_eq!(*img.get_pixel(50, 100), Rgba([255, 255, 255, 255]));
    // y spans y 50..90: blue band below it.
    assert_eq!(*img.get_pixel(50, 90), Rgba([0, 0, 255, 255]));
    assert_eq!(*img.get_pixel(150, 150), Rgba([128, 128, 128, 255]));
}

#[test]
fn reachability_failure_survives_capture_error() {
    let x = node("id/x", 0);
    let z = node("id/z", 2);
    let mut device =
        ScriptedDevice::with_focus_sequence(vec![x.clone(), x.clone()]).with_clickable(vec![x, z]);
    let dir = tempfile::tempdir().unwrap();

    let result = check_reachability(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert!(result.error.is_none());
    assert!(result.artifact.is_none());
}

#[test]
fn reachability_respects_whitelist() {
    let x = node("id/x", 0);
    let back = node("id/back", 3);
    let mut device = ScriptedDevice::with_focus_sequence(vec![x.clone(), x.clone()])
        .with_clickable(vec![x, back]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        auditor: Auditor::new(Whitelist::default()),
        ..context(dir.path())
    };

    assert!(check_reachability(&mut device, &ctx).passed);
}

#[test]
fn reachability_fails_when_bound_exceeded() {
    let mut device = ScriptedDevice::with_focus_sequence(distinct_nodes(60));
    let dir = tempfile::tempdir().unwrap();

    let result = check_reachability(&mut device, &context(dir.path()));
    assert!(!result.passed);
    assert!(!device.events.contains(&DeviceEvent::Query(NodePredicate::Clickable)));
}

// =========================================================================
// Runner lifecycle
// =========================================================================

fn lifecycle() -> LifecycleConfig {
    LifecycleConfig {
        launch_settle_ms: 5,
        dismiss_settle_ms: 2,
    }
}

#[test]
fn runner_without_target_skips_lifecycle() {
    let a = node("id/a", 0);
    let mut device = ScriptedDevice::with_focus_sequence(vec![a.clone(), a]);
    let dir = tempfile::tempdir().unwrap();

    let runner = SuiteRunner::new(context(dir.path()), lifecycle())
        .with_checks(vec![CheckKind::CycleLength]);
    let results = runner.run(&mut device);

    assert_eq!(results.len(), 1);
    assert!(results[0].passed);
    assert!(results[0].duration_ms.is_some());
    assert!(device.events.iter().all(|e| !matches!(
        e,
        DeviceEvent::Launch(_) | DeviceEvent::Home | DeviceEvent::WaitIdle(_)
    )));
}

#[test]
fn runner_launches_and_dismisses_target_around_each_check() {
    let a = node("id/a", 0);
    let mut device = ScriptedDevice::with_focus_sequence(vec![a.clone(), a]);
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        target: Target::parse("com.example/.Main"),
        ..context(dir.path())
    };

    let runner = SuiteRunner::new(ctx, lifecycle()).with_checks(vec![CheckKind::CycleLength]);
    runner.run(&mut device);

    let lifecycle_events: Vec<DeviceEvent> = device
        .events
        .iter()
        .filter(|e| !matches!(e, DeviceEvent::Query(_) | DeviceEvent::AdvanceFocus))
        .cloned()
        .collect();
    assert_eq!(
        lifecycle_events,
        vec![
            DeviceEvent::Home,
            DeviceEvent::WaitIdle(Duration::from_millis(2)),
            DeviceEvent::Launch("com.example/.Main".into()),
            DeviceEvent::WaitIdle(Duration::from_millis(5)),
            DeviceEvent::Home,
            DeviceEvent::WaitIdle(Duration::from_millis(2)),
        ]
    );
    assert_eq!(device.events[2], DeviceEvent::Launch("com.example/.Main".into()));
    assert_eq!(device.events[4], DeviceEvent::Query(NodePredicate::Focused));
}

#[test]
fn runner_lifecycle_failures_do_not_fail_checks() {
    let a = node("id/a", 0);
    let mut device = ScriptedDevice::with_focus_sequence(vec![a.clone(), a]);
    device.fail_lifecycle = true;
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        target: Target::parse("com.example/.Main"),
        ..context(dir.path())
    };

    let results = SuiteRunner::new(ctx, lifecycle())
        .with_checks(vec![CheckKind::CycleLength])
        .run(&mut device);
    assert!(results[0].passed);
}

#[test]
fn runner_runs_all_checks_in_order_by_default() {
    let runner = SuiteRunner::new(CheckContext::default(), LifecycleConfig::default());
    assert_eq!(runner.checks, CheckKind::ALL.to_vec());

    let mut device = ScriptedDevice::default();
    let dir = tempfile::tempdir().unwrap();
    let ctx = CheckContext {
        explorer: ExplorerConfig {
            max_focus_retries: 1,
            ..ExplorerConfig::default()
        },
        ..context(dir.path())
    };
    let results: Vec<CheckResult> = SuiteRunner::new(ctx, lifecycle()).run(&mut device);
    let kinds: Vec<CheckKind> = results.iter().map(|r| r.check).collect();
    assert_eq!(kinds, CheckKind::ALL.to_vec());
    assert!(results.iter().all(|r| !r.passed));
}
