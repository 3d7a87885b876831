use crate::report::report_model::SuiteReport;

/// Format a suite report for the terminal.
///
/// ```text
/// === Key navigation checks: com.example/.Main ===
///
/// ✓ PASS  cycle_length
/// ✗ FAIL  reachability
///     Some issues were found: ...
///     Element is clickable but not accessible via keyboard:
///       id: id/search
///       ...
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Key navigation checks: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        out.push_str(&format!("{}  {}\n", marker, result.check));

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }
        if let Some(ref message) = result.message {
            out.push_str(&format!("    {}\n", message));
        }
        for detail in &result.details {
            for line in detail.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
        if let Some(ref path) = result.artifact {
            out.push_str(&format!("    Annotated screenshot: {}\n", path.display()));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }

    out.push_str(" ===\n");
    out
}
