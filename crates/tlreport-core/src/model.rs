use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most recent build of the configured project, resolved once per reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    pub id: i64,
    pub version: String,
}

/// One latest-per-test execution as shown in the manual test report.
///
/// `status` is the decoded status name (`passed`/`failed`/`blocked`);
/// codes outside the known set pass through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRow {
    pub number: i64,
    pub name: String,
    pub version: i64,
    pub status: String,
}

/// Executions of one folder, in curator-defined display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderGroup {
    pub folder: String,
    pub executions: Vec<ExecutionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualReport {
    pub version: String,
    pub tests: Vec<FolderGroup>,
}

/// Display name + trimmed notes for one failed/blocked test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestNote {
    pub name: String,
    pub notes: String,
}

/// Per-tester status counts over that tester's latest-per-test executions.
///
/// `last_path` is the folder of the tester's most recent execution
/// (ties broken by highest execution id). None when the test lives
/// directly under the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesterSummary {
    pub name: String,
    pub executed: BTreeMap<String, i64>,
    pub last_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub version: String,
    /// Seeded passed/failed/blocked counts plus `total`; unknown status
    /// codes show up as extra keys.
    pub stats: BTreeMap<String, i64>,
    pub failed: Vec<TestNote>,
    pub blocked: Vec<TestNote>,
    pub testers: Vec<TesterSummary>,
}

/// One flat execution-log record, latest-only or full journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub folder: Option<String>,
    pub number: i64,
    pub version: i64,
    pub name: String,
    pub status: String,
    pub timestamp: String,
    pub notes: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub user: String,
}
