//! Turns a [`ManualReport`] into a document: JSON, RST, or any markup
//! target the external converter understands.

pub mod external;
pub mod rst;

use crate::errors::{ReportError, Result};
use crate::model::ManualReport;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Rst,
    /// Any other markup name, handed to the external converter (html, ...).
    External(String),
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "rst" => Ok(OutputFormat::Rst),
            other => Ok(OutputFormat::External(other.to_string())),
        }
    }
}

pub fn render(report: &ManualReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(report).map_err(|e| ReportError::Render(e.to_string()))
        }
        OutputFormat::Rst => rst::generate(report),
        OutputFormat::External(target) => {
            let markup = rst::generate(report)?;
            external::convert(&markup, target)
        }
    }
}
