//! Text and JSON output.

use std::fmt::Write as _;

use polypolarism_analyzer::{CheckResult, UnitReport};
use polypolarism_types::FrameType;
use serde::Serialize;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Name used for reports whose unit carries no path.
const UNNAMED: &str = "<unit>";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    pub color: bool,
    pub verbose: bool,
}

impl TextOptions {
    fn paint(&self, text: &str, color: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Human-readable results: one line per function, then a summary.
pub fn render_text(reports: &[UnitReport], options: TextOptions) -> String {
    let results: Vec<&CheckResult> = reports.iter().flat_map(|r| &r.results).collect();
    if results.is_empty() {
        return "No functions with schema annotations found.\n".to_string();
    }

    let mut out = String::new();
    for report in reports {
        if options.verbose && !report.results.is_empty() {
            let _ = writeln!(out, "{}", report.path.as_deref().unwrap_or(UNNAMED));
        }
        for result in &report.results {
            render_result(&mut out, result, options);
        }
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    out.push('\n');
    let summary = if failed == 0 {
        options.paint(&format!("All {} function(s) passed.", passed), GREEN)
    } else {
        options.paint(&format!("{} function(s) failed, {} passed.", failed, passed), RED)
    };
    let _ = writeln!(out, "{}", summary);
    out
}

fn render_result(out: &mut String, result: &CheckResult, options: TextOptions) {
    let status = if result.passed {
        options.paint("OK", GREEN)
    } else {
        options.paint("FAIL", RED)
    };
    let _ = writeln!(out, "  {}: {}", result.function_name, status);

    if options.verbose {
        schema_line(out, "declared", result.declared.as_ref());
        schema_line(out, "inferred", result.inferred.as_ref());
    }
    if !result.passed {
        for err in &result.errors {
            let _ = writeln!(out, "    - {}", err);
        }
    }
}

fn schema_line(out: &mut String, label: &str, frame: Option<&FrameType>) {
    match frame {
        Some(frame) => {
            let _ = writeln!(out, "    {}: {}", label, frame);
        }
        None => {
            let _ = writeln!(out, "    {}: -", label);
        }
    }
}

#[derive(Debug, Serialize)]
struct FileDiagnostics<'a> {
    file: &'a str,
    diagnostics: Vec<Diagnostic<'a>>,
}

#[derive(Debug, Serialize)]
struct Diagnostic<'a> {
    file: &'a str,
    line: u32,
    column: u32,
    function: &'a str,
    message: String,
    severity: Severity,
    source: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
}

/// Machine-readable results: one entry per unit, with a diagnostic for each
/// error of each failing function.
pub fn render_json(reports: &[UnitReport]) -> serde_json::Result<String> {
    let files: Vec<FileDiagnostics<'_>> = reports
        .iter()
        .map(|report| {
            let file = report.path.as_deref().unwrap_or(UNNAMED);
            let diagnostics = report
                .results
                .iter()
                .filter(|result| !result.passed)
                .flat_map(|result| {
                    result.errors.iter().map(move |err| Diagnostic {
                        file,
                        // Units without line information report line 1.
                        line: result.line.max(1),
                        column: 0,
                        function: &result.function_name,
                        message: err.to_string(),
                        severity: Severity::Error,
                        source: "polypolarism",
                    })
                })
                .collect();
            FileDiagnostics { file, diagnostics }
        })
        .collect();

    serde_json::to_string_pretty(&files)
}
