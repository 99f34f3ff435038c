use tlreport_core::config::Config;
use tlreport_core::errors::ReportError;
use tlreport_core::report::{render, OutputFormat};
use tlreport_core::reporter::Reporter;
use tlreport_core::storage::queries::JournalQuery;
use tlreport_core::storage::schema;

use std::path::PathBuf;
use tempfile::TempDir;

/// Builds a small TestLink database with three projects:
/// - `acme`: two builds, nested suites, re-runs and a tester timestamp tie
/// - `empty`: one build, no test cases, no executions
/// - `weird`: one execution with the unrecognized status code `x`
fn fixture() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("testlink.db");

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(schema::DDL).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO testprojects (id, notes) VALUES
            (100, 'acme'), (101, 'empty'), (102, 'weird');
        INSERT INTO testplans (id, testproject_id) VALUES
            (10, 100), (11, 101), (12, 102);
        INSERT INTO builds (id, testplan_id, name, creation_ts) VALUES
            (1, 10, '25.10', '2026-01-01 00:00:00'),
            (2, 10, '26.01', '2026-02-01 00:00:00'),
            (5, 11, '0.1',   '2026-01-01 00:00:00'),
            (6, 12, '0.9',   '2026-01-01 00:00:00');

        -- suites (type 2), test cases (type 3), versions (type 4)
        INSERT INTO nodes_hierarchy (id, name, parent_id, node_type_id, node_order) VALUES
            (200, 'Smoke', 100, 2, 1),
            (201, 'Web',   100, 2, 2),
            (202, 'Auth',  201, 2, 1),
            (210, 'Misc',  102, 2, 1),

            (300, 'Login',          200, 3, 1),
            (301, 'Logout',         200, 3, 2),
            (302, 'Password reset', 202, 3, 1),
            (303, 'Search',         201, 3, 1),
            (304, 'Profile',        200, 3, 3),
            (310, 'Strange',        210, 3, 1),

            (400, '1', 300, 4, 1),
            (401, '1', 301, 4, 1),
            (402, '1', 302, 4, 1),
            (403, '1', 303, 4, 1),
            (404, '1', 304, 4, 1),
            (410, '1', 310, 4, 1);

        INSERT INTO tcversions (id, tc_external_id, version, execution_type) VALUES
            (400, 1, 2, 1),
            (401, 2, 1, 1),
            (402, 3, 1, 2),
            (403, 4, 1, 1),
            (404, 5, 1, 1),
            (410, 9, 1, 1);

        INSERT INTO testplan_tcversions (id, testplan_id, tcversion_id) VALUES
            (1, 10, 400), (2, 10, 401), (3, 10, 402),
            (4, 10, 403), (5, 10, 404), (6, 12, 410);

        INSERT INTO users (id, first, last) VALUES
            (1, 'Alice', 'Smith'), (2, 'Bob', 'Jones'), (3, 'Carol', 'Lee');

        INSERT INTO executions
            (id, build_id, tcversion_id, tester_id, status, execution_ts, notes)
        VALUES
            (1, 2, 400, 1, 'f', '2026-02-01 10:00:00', 'first run'),
            (2, 2, 400, 1, 'p', '2026-02-01 11:00:00', '  ok  '),
            (3, 2, 401, 2, 'f', '2026-02-01 12:00:00', 'broken'),
            (4, 2, 402, 2, 'b', '2026-02-01 13:00:00', NULL),
            (5, 1, 400, 1, 'p', '2026-01-15 09:00:00', 'old build'),
            (7, 2, 403, 3, 'p', '2026-02-01 14:00:00', NULL),
            (8, 2, 404, 3, 'f', '2026-02-01 14:00:00', NULL),
            (6, 6, 410, 1, 'x', '2026-03-01 10:00:00', 'odd');
        "#,
    )
    .unwrap();

    (dir, path)
}

fn reporter_for(path: &PathBuf, project: &str) -> Reporter {
    Reporter::connect(&Config::new(path.clone(), project)).unwrap()
}

#[test]
fn test_resolves_most_recent_build() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "acme");
    assert_eq!(reporter.build().id, 2);
    assert_eq!(reporter.build().version, "26.01");
}

#[test]
fn test_unknown_project_is_build_not_found() {
    let (_dir, path) = fixture();
    let err = Reporter::connect(&Config::new(path, "missing")).unwrap_err();
    assert!(matches!(err, ReportError::BuildNotFound(p) if p == "missing"));
}

#[test]
fn test_status_totals_use_latest_execution_only() {
    let (_dir, path) = fixture();
    let totals = reporter_for(&path, "acme").status_totals().unwrap();
    // tc 400 was failed then re-run passed: only the re-run counts
    assert_eq!(totals["passed"], 2);
    assert_eq!(totals["failed"], 2);
    assert_eq!(totals["blocked"], 1);
}

#[test]
fn test_empty_build_reports_seeded_zeroes() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "empty");
    let totals = reporter.status_totals().unwrap();
    assert_eq!(totals["passed"], 0);
    assert_eq!(totals["failed"], 0);
    assert_eq!(totals["blocked"], 0);
    assert_eq!(reporter.total_manual_test_count().unwrap(), 0);
}

#[test]
fn test_total_manual_tests_independent_of_executions() {
    let (_dir, path) = fixture();
    // four manual-type versions in the plan, regardless of what ran
    assert_eq!(
        reporter_for(&path, "acme").total_manual_test_count().unwrap(),
        4
    );
}

#[test]
fn test_tests_with_status_formats_and_orders() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "acme");

    let failed = reporter.tests_with_status("failed").unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].name, "X-2: Logout");
    assert_eq!(failed[0].notes, "broken");
    assert_eq!(failed[1].name, "X-5: Profile");
    assert_eq!(failed[1].notes, "");

    let passed = reporter.tests_with_status("passed").unwrap();
    assert_eq!(passed[0].name, "X-1: Login");
    assert_eq!(passed[0].notes, "ok");

    let blocked = reporter.tests_with_status("blocked").unwrap();
    assert_eq!(blocked[0].name, "X-3: Password reset");
}

#[test]
fn test_latest_selection_agrees_across_aggregations() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "acme");

    // tc 400: executions at 10:00 (failed) and 11:00 (passed)
    let totals = reporter.status_totals().unwrap();
    let passed = reporter.tests_with_status("passed").unwrap();
    let rows = reporter.manual_report_rows().unwrap();

    assert!(passed.iter().any(|t| t.name == "X-1: Login"));
    let login = rows
        .iter()
        .map(|(_, e)| e)
        .find(|e| e.number == 1)
        .unwrap();
    assert_eq!(login.status, "passed");
    assert_eq!(login.version, 2);
    assert_eq!(totals["passed"], 2);
    // one row per test case, not per execution
    assert_eq!(rows.len(), 5);
}

#[test]
fn test_tester_summary_counts_order_and_tie_break() {
    let (_dir, path) = fixture();
    let testers = reporter_for(&path, "acme").tester_summary().unwrap();

    assert_eq!(testers.len(), 3);
    // descending by total executions, name breaking the tie
    assert_eq!(testers[0].name, "Bob Jones");
    assert_eq!(testers[1].name, "Carol Lee");
    assert_eq!(testers[2].name, "Alice Smith");

    assert_eq!(testers[0].executed["failed"], 1);
    assert_eq!(testers[0].executed["blocked"], 1);
    assert_eq!(testers[0].last_path.as_deref(), Some("Web/Auth"));

    // Carol ran Web and Smoke at the same timestamp; the higher
    // execution id (Smoke) wins
    assert_eq!(testers[1].last_path.as_deref(), Some("Smoke"));

    // Alice's superseded re-run does not count
    assert_eq!(testers[2].executed["passed"], 1);
    assert_eq!(testers[2].executed.values().sum::<i64>(), 1);
    assert_eq!(testers[2].last_path.as_deref(), Some("Smoke"));
}

#[test]
fn test_manual_report_grouping_and_order() {
    let (_dir, path) = fixture();
    let report = reporter_for(&path, "acme").manual_test_report().unwrap();

    assert_eq!(report.version, "26.01");
    let folders: Vec<&str> = report.tests.iter().map(|g| g.folder.as_str()).collect();
    assert_eq!(folders, vec!["Smoke", "Web", "Web/Auth"]);

    // curator order is node_order descending within the folder
    let smoke: Vec<i64> = report.tests[0].executions.iter().map(|e| e.number).collect();
    assert_eq!(smoke, vec![5, 2, 1]);
    assert_eq!(report.tests[2].executions[0].name, "Password reset");
}

#[test]
fn test_journal_full_and_latest() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "acme");

    let full = reporter.journal(&JournalQuery::default()).unwrap();
    assert_eq!(full.len(), 6);
    assert_eq!(full[0].timestamp, "2026-02-01 10:00:00");

    let latest = reporter
        .journal(&JournalQuery {
            latest: true,
            ..JournalQuery::default()
        })
        .unwrap();
    assert_eq!(latest.len(), 5);
    assert!(latest.iter().all(|r| r.timestamp != "2026-02-01 10:00:00"));
}

#[test]
fn test_journal_filters_and_sort() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "acme");

    let since = reporter
        .journal(
            &JournalQuery::parse(false, Some("2026-02-01 12:00:00".into()), None, "timestamp", "asc")
                .unwrap(),
        )
        .unwrap();
    assert_eq!(since.len(), 4);

    let passed = reporter
        .journal(&JournalQuery::parse(false, None, Some("passed".into()), "timestamp", "asc").unwrap())
        .unwrap();
    assert_eq!(passed.len(), 2);

    let by_number = reporter
        .journal(&JournalQuery::parse(false, None, None, "number", "desc").unwrap())
        .unwrap();
    assert_eq!(by_number[0].number, 5);
}

#[test]
fn test_journal_record_fields() {
    let (_dir, path) = fixture();
    let rows = reporter_for(&path, "acme")
        .journal(&JournalQuery::parse(false, None, Some("failed".into()), "number", "asc").unwrap())
        .unwrap();

    let logout = rows.iter().find(|r| r.number == 2).unwrap();
    assert_eq!(logout.folder.as_deref(), Some("Smoke"));
    assert_eq!(logout.version, 1);
    assert_eq!(logout.name, "Logout");
    assert_eq!(logout.status, "failed");
    assert_eq!(logout.timestamp, "2026-02-01 12:00:00");
    assert_eq!(logout.notes.as_deref(), Some("broken"));
    assert_eq!(logout.firstname, "Bob");
    assert_eq!(logout.lastname, "Jones");
    assert_eq!(logout.user, "Bob Jones");
}

#[test]
fn test_unknown_status_passes_data_layer_but_fails_render() {
    let (_dir, path) = fixture();
    let reporter = reporter_for(&path, "weird");

    // data layer: verbatim passthrough, extra totals key
    let totals = reporter.status_totals().unwrap();
    assert_eq!(totals["x"], 1);
    assert_eq!(totals["passed"], 0);
    let journal = reporter.journal(&JournalQuery::default()).unwrap();
    assert_eq!(journal[0].status, "x");

    // renderer: closed bucket set, fails loudly
    let report = reporter.manual_test_report().unwrap();
    let err = render(&report, &OutputFormat::Rst).unwrap_err();
    assert!(matches!(err, ReportError::UnknownStatus(s) if s == "x"));
}

#[test]
fn test_dashboard_shape() {
    let (_dir, path) = fixture();
    let dashboard = reporter_for(&path, "acme").dashboard().unwrap();

    assert_eq!(dashboard.version, "26.01");
    assert_eq!(dashboard.stats["passed"], 2);
    assert_eq!(dashboard.stats["failed"], 2);
    assert_eq!(dashboard.stats["blocked"], 1);
    assert_eq!(dashboard.stats["total"], 4);
    assert_eq!(dashboard.failed.len(), 2);
    assert_eq!(dashboard.blocked.len(), 1);
    assert_eq!(dashboard.testers.len(), 3);
}

#[test]
fn test_refresh_build_picks_up_new_build() {
    let (_dir, path) = fixture();
    let mut reporter = reporter_for(&path, "acme");
    assert_eq!(reporter.build().id, 2);

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO builds (id, testplan_id, name, creation_ts)
         VALUES (9, 10, '26.02', '2026-03-01 00:00:00')",
        [],
    )
    .unwrap();
    drop(conn);

    // cached until explicitly refreshed
    assert_eq!(reporter.build().version, "26.01");
    reporter.refresh_build().unwrap();
    assert_eq!(reporter.build().version, "26.02");
}

#[test]
fn test_json_render_of_live_report_round_trips() {
    let (_dir, path) = fixture();
    let report = reporter_for(&path, "acme").manual_test_report().unwrap();
    let json = render(&report, &OutputFormat::Json).unwrap();
    let decoded: tlreport_core::model::ManualReport = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, report);
}
