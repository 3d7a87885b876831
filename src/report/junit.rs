use crate::report::report_model::SuiteReport;

const CLASSNAME: &str = "keynav-check";

/// Generate a JUnit XML report for CI systems.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="com.example/.Main" tests="2" failures="1" time="3.120">
///   <testcase name="cycle_length" classname="keynav-check" />
///   <testcase name="reachability" classname="keynav-check">
///     <failure message="Some issues were found: ..." type="AssertionFailure">...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &SuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let name = escape_xml(result.check.name());
        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\" />\n",
                name, CLASSNAME
            ));
            continue;
        }

        let (kind, message) = match (&result.error, &result.message) {
            (Some(error), _) => ("Error", error.as_str()),
            (None, Some(message)) => ("AssertionFailure", message.as_str()),
            (None, None) => ("AssertionFailure", "check failed"),
        };

        let mut body = result.details.join("\n");
        if let Some(path) = &result.artifact {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(&format!("Annotated screenshot: {}", path.display()));
        }

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{class}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = name,
            class = CLASSNAME,
            message = escape_xml(message),
            kind = kind,
            body = escape_xml(&body),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
