//! Aggregation over the TestLink schema: latest execution per test case,
//! per-folder and per-tester groupings, pass/fail/blocked totals.

use crate::config::Config;
use crate::errors::{ReportError, Result};
use crate::model::{
    Build, Dashboard, ExecutionRow, FolderGroup, JournalRecord, ManualReport, TestNote,
    TesterSummary,
};
use crate::storage::queries::{self, JournalQuery};
use crate::storage::store::Store;
use rusqlite::{named_params, Connection, OptionalExtension, ToSql};
use std::collections::BTreeMap;

/// Context object owning the store, the project name and the resolved build.
///
/// The build is resolved eagerly on connect and cached for the reporter's
/// lifetime; `refresh_build` is the explicit invalidation.
#[derive(Debug)]
pub struct Reporter {
    store: Store,
    project: String,
    build: Build,
}

impl Reporter {
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = Store::open(&config.database)?;
        let build = store.with_conn(|conn| fetch_active_build(conn, &config.project))?;
        tracing::info!(
            event = "build_resolved",
            project = %config.project,
            build_id = build.id,
            version = %build.version
        );
        Ok(Self {
            store,
            project: config.project.clone(),
            build,
        })
    }

    pub fn build(&self) -> &Build {
        &self.build
    }

    /// Re-resolve the active build, replacing the cached one.
    pub fn refresh_build(&mut self) -> Result<()> {
        let project = self.project.clone();
        self.build = self
            .store
            .with_conn(|conn| fetch_active_build(conn, &project))?;
        Ok(())
    }

    pub fn total_manual_test_count(&self) -> Result<i64> {
        let build_id = self.build.id;
        self.store
            .with_conn(|conn| fetch_total_manual_tests(conn, build_id))
    }

    /// Latest-per-test-case counts, seeded so absent statuses report zero.
    pub fn status_totals(&self) -> Result<BTreeMap<String, i64>> {
        let build_id = self.build.id;
        self.store
            .with_conn(|conn| fetch_status_totals(conn, build_id))
    }

    pub fn tests_with_status(&self, status: &str) -> Result<Vec<TestNote>> {
        let build_id = self.build.id;
        self.store
            .with_conn(|conn| fetch_tests_with_status(conn, build_id, status))
    }

    pub fn tester_summary(&self) -> Result<Vec<TesterSummary>> {
        let build_id = self.build.id;
        self.store
            .with_conn(|conn| fetch_tester_summary(conn, build_id))
    }

    /// Execution log, full or latest-only, with the caller's filters and
    /// sort. The `JournalQuery` was validated at construction, so nothing
    /// here can reach the database with a bad column or order.
    pub fn journal(&self, query: &JournalQuery) -> Result<Vec<JournalRecord>> {
        let build_id = self.build.id;
        tracing::debug!(
            event = "journal",
            latest = query.latest,
            sort = %query.sort,
            order = %query.order
        );
        self.store
            .with_transaction(|tx| fetch_journal(tx, build_id, query))
    }

    pub fn manual_report_rows(&self) -> Result<Vec<(Option<String>, ExecutionRow)>> {
        let build_id = self.build.id;
        self.store
            .with_conn(|conn| fetch_manual_report_rows(conn, build_id))
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        let build = self.build.clone();
        tracing::debug!(event = "dashboard", build_id = build.id);
        self.store.with_transaction(|tx| {
            let failed = fetch_tests_with_status(tx, build.id, "failed")?;
            let blocked = fetch_tests_with_status(tx, build.id, "blocked")?;
            let testers = fetch_tester_summary(tx, build.id)?;

            let mut stats = fetch_status_totals(tx, build.id)?;
            stats.insert("total".to_string(), fetch_total_manual_tests(tx, build.id)?);

            Ok(Dashboard {
                version: build.version.clone(),
                stats,
                failed,
                blocked,
                testers,
            })
        })
    }

    pub fn manual_test_report(&self) -> Result<ManualReport> {
        let build = self.build.clone();
        tracing::debug!(event = "manual_test_report", build_id = build.id);
        self.store.with_transaction(|tx| {
            let rows = fetch_manual_report_rows(tx, build.id)?;
            Ok(ManualReport {
                version: build.version.clone(),
                tests: group_by_folder(rows),
            })
        })
    }
}

/// Groups rows into strictly contiguous runs, preserving input order.
/// Non-adjacent runs that happen to share a folder stay separate groups;
/// the manual report query's ORDER BY is what makes runs contiguous.
pub fn group_by_folder(rows: Vec<(Option<String>, ExecutionRow)>) -> Vec<FolderGroup> {
    let mut groups: Vec<(Option<String>, Vec<ExecutionRow>)> = Vec::new();

    for (folder, execution) in rows {
        match groups.last_mut() {
            Some((key, executions)) if *key == folder => executions.push(execution),
            _ => groups.push((folder, vec![execution])),
        }
    }

    groups
        .into_iter()
        .map(|(folder, executions)| FolderGroup {
            folder: folder.unwrap_or_default(),
            executions,
        })
        .collect()
}

fn fetch_active_build(conn: &Connection, project: &str) -> Result<Build> {
    let mut stmt = conn.prepare(queries::ACTIVE_BUILD)?;
    stmt.query_row(named_params! {":project": project}, |row| {
        Ok(Build {
            id: row.get(0)?,
            version: row.get(1)?,
        })
    })
    .optional()?
    .ok_or_else(|| ReportError::BuildNotFound(project.to_string()))
}

fn fetch_total_manual_tests(conn: &Connection, build_id: i64) -> Result<i64> {
    let mut stmt = conn.prepare(queries::TOTAL_MANUAL_TESTS)?;
    let count = stmt
        .query_row(named_params! {":build_id": build_id}, |row| row.get(0))
        .optional()?;
    // the GROUP BY yields no row at all for a plan with no test cases
    Ok(count.unwrap_or(0))
}

fn fetch_status_totals(conn: &Connection, build_id: i64) -> Result<BTreeMap<String, i64>> {
    let sql = queries::log_cte(true) + queries::STATUS_TOTALS_SELECT;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(named_params! {":build_id": build_id}, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    totals.insert("passed".to_string(), 0);
    totals.insert("failed".to_string(), 0);
    totals.insert("blocked".to_string(), 0);
    for row in rows {
        let (status, count) = row?;
        totals.insert(status, count);
    }
    Ok(totals)
}

fn fetch_tests_with_status(
    conn: &Connection,
    build_id: i64,
    status: &str,
) -> Result<Vec<TestNote>> {
    let sql = queries::log_cte(true) + queries::TESTS_WITH_STATUS_SELECT;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        named_params! {":build_id": build_id, ":status": status},
        |row| {
            let number: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let notes: Option<String> = row.get(2)?;
            Ok(TestNote {
                name: format!("X-{}: {}", number, name),
                notes: notes.unwrap_or_default().trim().to_string(),
            })
        },
    )?;
    collect_rows(rows)
}

fn fetch_tester_summary(conn: &Connection, build_id: i64) -> Result<Vec<TesterSummary>> {
    let sql = queries::log_cte(true) + queries::TESTER_SUMMARY_SELECT;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(named_params! {":build_id": build_id}, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut scores: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    let mut paths: BTreeMap<String, Option<String>> = BTreeMap::new();
    for row in rows {
        let (user, status, last_path, executed) = row?;
        scores.entry(user.clone()).or_default().insert(status, executed);
        paths.insert(user, last_path);
    }

    let mut summary: Vec<TesterSummary> = scores
        .into_iter()
        .map(|(name, executed)| TesterSummary {
            last_path: paths.get(&name).cloned().flatten(),
            name,
            executed,
        })
        .collect();

    summary.sort_by(|a, b| {
        let ta: i64 = a.executed.values().sum();
        let tb: i64 = b.executed.values().sum();
        tb.cmp(&ta).then_with(|| a.name.cmp(&b.name))
    });
    Ok(summary)
}

fn fetch_journal(
    conn: &Connection,
    build_id: i64,
    query: &JournalQuery,
) -> Result<Vec<JournalRecord>> {
    let sql = query.sql();
    let mut stmt = conn.prepare(&sql)?;

    let mut params: Vec<(&str, &dyn ToSql)> = vec![(":build_id", &build_id)];
    if let Some(since) = &query.since {
        params.push((":since", since));
    }
    if let Some(status) = &query.status {
        params.push((":status", status));
    }

    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok(JournalRecord {
            folder: row.get(0)?,
            number: row.get(1)?,
            version: row.get(2)?,
            name: row.get(3)?,
            status: row.get(4)?,
            timestamp: row.get(5)?,
            notes: row.get(6)?,
            firstname: row.get(7)?,
            lastname: row.get(8)?,
            user: row.get(9)?,
        })
    })?;
    collect_rows(rows)
}

fn fetch_manual_report_rows(
    conn: &Connection,
    build_id: i64,
) -> Result<Vec<(Option<String>, ExecutionRow)>> {
    let sql = queries::log_cte(true) + queries::MANUAL_REPORT_SELECT;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(named_params! {":build_id": build_id}, |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            ExecutionRow {
                number: row.get(1)?,
                name: row.get(2)?,
                version: row.get(3)?,
                status: row.get(4)?,
            },
        ))
    })?;
    collect_rows(rows)
}

fn collect_rows<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
