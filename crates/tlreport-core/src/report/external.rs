//! Hands the structured text to an external converter for markup targets
//! this crate does not render itself.

use crate::errors::{ReportError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

const DEFAULT_CONVERTER: &str = "pandoc";
const CONVERTER_ENV: &str = "TLREPORT_CONVERTER";

/// Pipes `markup` (UTF-8 RST, already decoded) through the converter,
/// returning its stdout. The converter command comes from
/// `TLREPORT_CONVERTER`, defaulting to pandoc.
pub fn convert(markup: &str, target: &str) -> Result<String> {
    let converter = std::env::var(CONVERTER_ENV).unwrap_or_else(|_| DEFAULT_CONVERTER.to_string());
    tracing::debug!(event = "convert", converter = %converter, target = %target);

    let mut child = Command::new(&converter)
        .args(["-f", "rst", "-t", target])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ReportError::Render(format!("failed to spawn {}: {}", converter, e)))?;

    child
        .stdin
        .take()
        .ok_or_else(|| ReportError::Render("converter stdin unavailable".to_string()))?
        .write_all(markup.as_bytes())
        .map_err(|e| ReportError::Render(format!("failed to write to {}: {}", converter, e)))?;

    let output = child
        .wait_with_output()
        .map_err(|e| ReportError::Render(format!("{} did not finish: {}", converter, e)))?;

    if !output.status.success() {
        return Err(ReportError::Render(format!(
            "{} exited with {}: {}",
            converter,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| ReportError::Render(format!("converter produced invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_converter_is_render_error() {
        std::env::set_var(CONVERTER_ENV, "/nonexistent/converter");
        let err = convert("title\n=====\n", "html").unwrap_err();
        std::env::remove_var(CONVERTER_ENV);
        assert!(matches!(err, ReportError::Render(_)));
    }
}
