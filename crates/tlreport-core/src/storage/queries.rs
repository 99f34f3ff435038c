//! SQL text for the reporting queries plus the typed journal query builder.
//!
//! Every query against executions goes through the `log_journal` CTE built by
//! [`log_cte`]: it decodes single-letter status codes, joins the tester and
//! materializes each test case's folder path from the recursive node tree.

use crate::errors::{ReportError, Result};
use std::fmt;
use std::str::FromStr;

pub const ACTIVE_BUILD: &str = "
SELECT
    builds.id,
    builds.name
FROM
    builds
    INNER JOIN testplans
        ON testplans.id = builds.testplan_id
    INNER JOIN testprojects
        ON testprojects.id = testplans.testproject_id
WHERE
    testprojects.notes = :project
ORDER BY
    builds.creation_ts DESC
LIMIT 1
";

pub const TOTAL_MANUAL_TESTS: &str = "
SELECT
    count(tcversions.id)
FROM
    tcversions
    INNER JOIN testplan_tcversions
        ON tcversions.id = testplan_tcversions.tcversion_id
    INNER JOIN builds
        ON builds.testplan_id = testplan_tcversions.testplan_id
WHERE
    tcversions.execution_type = 1
    AND builds.id = :build_id
GROUP BY
    builds.id
";

/// Common table expressions shared by every log query.
///
/// `path_tree` walks the suite nodes under the build's project and
/// accumulates slash-joined folder paths. `latest_executions` keeps, per
/// test-case version, only the run with the maximum timestamp; joining it is
/// optional so the full journal stays selectable. `execution_id` and
/// `node_order` are carried along for tie-breaking and folder display order.
pub fn log_cte(latest: bool) -> String {
    let mut query = String::from(
        "
WITH RECURSIVE path_tree(id, name) AS
(
    SELECT
        parent.id,
        CAST(parent.name AS TEXT) AS name
    FROM
        nodes_hierarchy parent
    WHERE
        parent.parent_id = (
            SELECT testplans.testproject_id
            FROM builds
            INNER JOIN testplans ON builds.testplan_id = testplans.id
            WHERE builds.id = :build_id
        )
        AND parent.node_type_id = 2
    UNION ALL
    SELECT
        child.id,
        path_tree.name || '/' || child.name
    FROM
        path_tree
        INNER JOIN nodes_hierarchy child
            ON path_tree.id = child.parent_id
            AND child.node_type_id = 2
),

latest_executions AS
(
    SELECT
        executions.tcversion_id AS tcversion_id,
        MAX(executions.execution_ts) AS execution_ts
    FROM
        executions
    GROUP BY
        executions.tcversion_id
),

log_journal AS (
SELECT
    path_tree.name                      AS folder,
    tcversions.tc_external_id           AS number,
    tcversions.version                  AS version,
    parent.name                         AS name,
    (CASE executions.status
    WHEN 'p' THEN 'passed'
    WHEN 'f' THEN 'failed'
    WHEN 'b' THEN 'blocked'
    ELSE executions.status
    END)                                AS status,
    executions.execution_ts             AS timestamp,
    executions.notes                    AS notes,
    users.first                         AS firstname,
    users.last                          AS lastname,
    users.first || ' ' || users.last    AS user,
    executions.id                       AS execution_id,
    parent.node_order                   AS node_order
FROM
    executions
    INNER JOIN users
        ON executions.tester_id = users.id
    INNER JOIN builds
        ON builds.id = executions.build_id
        AND builds.id = :build_id
    INNER JOIN tcversions
        ON executions.tcversion_id = tcversions.id
        INNER JOIN nodes_hierarchy node
            ON tcversions.id = node.id
            INNER JOIN nodes_hierarchy parent
                ON node.parent_id = parent.id
                LEFT OUTER JOIN path_tree
                    ON parent.parent_id = path_tree.id
",
    );

    if latest {
        query.push_str(
            "
    INNER JOIN latest_executions
        ON executions.tcversion_id = latest_executions.tcversion_id
        AND executions.execution_ts = latest_executions.execution_ts
",
        );
    }

    query.push(')');
    query
}

pub const STATUS_TOTALS_SELECT: &str = "
SELECT status, COUNT(status)
FROM log_journal
GROUP BY status
";

pub const TESTS_WITH_STATUS_SELECT: &str = "
SELECT number, name, notes
FROM log_journal
WHERE status = :status
ORDER BY number
";

/// Folders alphabetical, test cases in curator order within each folder.
/// The ORDER BY lives on the outer select so the contiguity that
/// `group_by_folder` relies on is guaranteed, not an artifact of CTE
/// evaluation order.
pub const MANUAL_REPORT_SELECT: &str = "
SELECT folder, number, name, version, status
FROM log_journal
ORDER BY folder ASC, node_order DESC
";

/// Ranks each tester's executions newest-first (ties broken by highest
/// execution id) to find the folder they touched last, then counts
/// executions per status.
pub const TESTER_SUMMARY_SELECT: &str = ",
latest_folder AS (
    SELECT
        ranks.user,
        ranks.folder
    FROM
        (
            SELECT
                log_journal.user AS user,
                log_journal.folder AS folder,
                rank() OVER
                    (PARTITION BY log_journal.user
                     ORDER BY timestamp DESC, execution_id DESC)
                    AS pos
            FROM
                log_journal
        ) AS ranks
    WHERE
        ranks.pos = 1
)

SELECT
    log_journal.user            AS user,
    log_journal.status          AS status,
    latest_folder.folder        AS last_path,
    COUNT(log_journal.number)   AS executed
FROM
    log_journal
    LEFT OUTER JOIN latest_folder
        ON latest_folder.user = log_journal.user
GROUP BY
    log_journal.user,
    log_journal.status,
    latest_folder.folder
";

/// The ten journal columns, in output order.
pub const LOG_COLUMNS: [&str; 10] = [
    "folder",
    "number",
    "version",
    "name",
    "status",
    "timestamp",
    "notes",
    "firstname",
    "lastname",
    "user",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Folder,
    Number,
    Version,
    Name,
    Status,
    Timestamp,
    Notes,
    Firstname,
    Lastname,
    User,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Folder => "folder",
            SortColumn::Number => "number",
            SortColumn::Version => "version",
            SortColumn::Name => "name",
            SortColumn::Status => "status",
            SortColumn::Timestamp => "timestamp",
            SortColumn::Notes => "notes",
            SortColumn::Firstname => "firstname",
            SortColumn::Lastname => "lastname",
            SortColumn::User => "user",
        }
    }
}

impl FromStr for SortColumn {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "folder" => Ok(SortColumn::Folder),
            "number" => Ok(SortColumn::Number),
            "version" => Ok(SortColumn::Version),
            "name" => Ok(SortColumn::Name),
            "status" => Ok(SortColumn::Status),
            "timestamp" => Ok(SortColumn::Timestamp),
            "notes" => Ok(SortColumn::Notes),
            "firstname" => Ok(SortColumn::Firstname),
            "lastname" => Ok(SortColumn::Lastname),
            "user" => Ok(SortColumn::User),
            other => Err(ReportError::InvalidSortColumn(other.to_string())),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ReportError::InvalidSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Validated journal request. Construction fails on an unknown sort column
/// or order, so no SQL is ever built (let alone executed) for a bad request.
#[derive(Debug, Clone)]
pub struct JournalQuery {
    pub latest: bool,
    pub since: Option<String>,
    pub status: Option<String>,
    pub sort: SortColumn,
    pub order: SortOrder,
}

impl Default for JournalQuery {
    fn default() -> Self {
        Self {
            latest: false,
            since: None,
            status: None,
            sort: SortColumn::Timestamp,
            order: SortOrder::Asc,
        }
    }
}

impl JournalQuery {
    pub fn parse(
        latest: bool,
        since: Option<String>,
        status: Option<String>,
        sort: &str,
        order: &str,
    ) -> Result<Self> {
        Ok(Self {
            latest,
            since,
            status,
            sort: sort.parse()?,
            order: order.parse()?,
        })
    }

    pub fn sql(&self) -> String {
        let mut query = log_cte(self.latest);
        query.push_str("\nSELECT ");
        query.push_str(&LOG_COLUMNS.join(", "));
        query.push_str("\nFROM log_journal");

        let mut conditions = Vec::new();
        if self.since.is_some() {
            conditions.push("timestamp >= :since");
        }
        if self.status.is_some() {
            conditions.push("status = :status");
        }
        if !conditions.is_empty() {
            query.push_str("\nWHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(&format!(
            "\nORDER BY {} {}",
            self.sort.as_sql(),
            self.order.as_sql()
        ));
        query
    }
}
