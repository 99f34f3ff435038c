/// Subset of the TestLink schema this crate reads.
///
/// Production databases already carry these tables; the DDL exists so tests
/// can build fixture databases that match what the queries expect.
///
/// Node types in `nodes_hierarchy`: 2 = test suite (folder), 3 = test case,
/// 4 = test-case version. A version node's id doubles as the `tcversions`
/// primary key; its parent is the test-case node, whose parent is a suite.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS testprojects (
  id INTEGER PRIMARY KEY,
  notes TEXT
);

CREATE TABLE IF NOT EXISTS testplans (
  id INTEGER PRIMARY KEY,
  testproject_id INTEGER NOT NULL REFERENCES testprojects(id)
);

CREATE TABLE IF NOT EXISTS builds (
  id INTEGER PRIMARY KEY,
  testplan_id INTEGER NOT NULL REFERENCES testplans(id),
  name TEXT NOT NULL,
  creation_ts TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS nodes_hierarchy (
  id INTEGER PRIMARY KEY,
  name TEXT,
  parent_id INTEGER,
  node_type_id INTEGER NOT NULL,
  node_order INTEGER
);

CREATE TABLE IF NOT EXISTS tcversions (
  id INTEGER PRIMARY KEY,
  tc_external_id INTEGER NOT NULL,
  version INTEGER NOT NULL,
  execution_type INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS testplan_tcversions (
  id INTEGER PRIMARY KEY,
  testplan_id INTEGER NOT NULL REFERENCES testplans(id),
  tcversion_id INTEGER NOT NULL REFERENCES tcversions(id)
);

CREATE TABLE IF NOT EXISTS executions (
  id INTEGER PRIMARY KEY,
  build_id INTEGER NOT NULL REFERENCES builds(id),
  tcversion_id INTEGER NOT NULL REFERENCES tcversions(id),
  tester_id INTEGER NOT NULL REFERENCES users(id),
  status TEXT NOT NULL,
  execution_ts TEXT NOT NULL,
  notes TEXT
);

CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY,
  first TEXT NOT NULL,
  last TEXT NOT NULL
);
"#;
