//! Structured-text report: title, generation timestamp, totals, one
//! fixed-width table per folder.

use crate::errors::{ReportError, Result};
use crate::model::{ExecutionRow, FolderGroup, ManualReport};
use chrono::Local;

pub fn generate(report: &ManualReport) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();

    let title = format!("Test report for {}", report.version);
    let now = Local::now().format("%Y-%m-%d %H:%M:%S");

    push_title(&mut lines, &title, '=');
    lines.push(format!("Report generated at {}", now));
    lines.push(String::new());
    push_title(&mut lines, "Totals", '-');
    push_totals(&mut lines, &report.tests)?;
    lines.push(String::new());
    push_title(&mut lines, "Tests", '-');

    for group in &report.tests {
        push_title(&mut lines, &group.folder, '_');
        push_table(&mut lines, &group.executions);
        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

fn push_title(lines: &mut Vec<String>, text: &str, underline: char) {
    lines.push(escape_markup(text));
    lines.push(underline.to_string().repeat(text.chars().count()));
    lines.push(String::new());
}

/// One pass over every execution across all folders, into the three fixed
/// buckets. The bucket set is closed: an unrecognized status means upstream
/// grew a new single-letter code, and silently dropping it would skew the
/// report, so it fails instead.
fn push_totals(lines: &mut Vec<String>, tests: &[FolderGroup]) -> Result<()> {
    let mut blocked = 0u64;
    let mut failed = 0u64;
    let mut passed = 0u64;

    for group in tests {
        for execution in &group.executions {
            match execution.status.as_str() {
                "blocked" => blocked += 1,
                "failed" => failed += 1,
                "passed" => passed += 1,
                other => return Err(ReportError::UnknownStatus(other.to_string())),
            }
        }
    }

    // alphabetical by status name
    lines.push(format!(":Blocked: {}", blocked));
    lines.push(format!(":Failed: {}", failed));
    lines.push(format!(":Passed: {}", passed));
    Ok(())
}

fn push_table(lines: &mut Vec<String>, executions: &[ExecutionRow]) {
    let names: Vec<String> = executions
        .iter()
        .map(|e| escape_markup(&format!("X-{}: {} (v{})", e.number, e.name, e.version)))
        .collect();
    let statuses: Vec<String> = executions
        .iter()
        .map(|e| escape_markup(&capitalize(&e.status)))
        .collect();

    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let status_width = statuses.iter().map(|s| s.chars().count()).max().unwrap_or(0);

    let bar = format!("{} {}", "=".repeat(name_width), "=".repeat(status_width));

    lines.push(bar.clone());
    lines.push(format!(
        "{:<name_width$} {:<status_width$}",
        "Test", "Status"
    ));
    lines.push(bar.clone());

    for (name, status) in names.iter().zip(&statuses) {
        lines.push(format!("{:<name_width$} {:<status_width$}", name, status));
    }

    lines.push(bar);
}

/// Backslash-escapes the characters RST would interpret as markup.
fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '`' | '|' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
