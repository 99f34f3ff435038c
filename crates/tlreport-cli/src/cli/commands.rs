use super::args::*;
use anyhow::Context;
use tlreport_core::config::{load_config, Config};
use tlreport_core::report::{render, OutputFormat};
use tlreport_core::reporter::Reporter;
use tlreport_core::storage::queries::JournalQuery;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const REPORT_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Dashboard => cmd_dashboard(&cli.conn),
        Command::Report(args) => cmd_report(&cli.conn, args),
        Command::Journal(args) => cmd_journal(&cli.conn, args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Flags win over the config file; the file is only read when a flag is
/// missing.
fn resolve_config(conn: &ConnArgs) -> anyhow::Result<Config> {
    if let (Some(db), Some(project)) = (&conn.db, &conn.project) {
        return Ok(Config::new(db.clone(), project.clone()));
    }

    let mut cfg = load_config(&conn.config)
        .with_context(|| format!("cannot load {}", conn.config.display()))?;
    if let Some(db) = &conn.db {
        cfg.database = db.clone();
    }
    if let Some(project) = &conn.project {
        cfg.project = project.clone();
    }
    Ok(cfg)
}

fn cmd_dashboard(conn: &ConnArgs) -> anyhow::Result<i32> {
    let reporter = Reporter::connect(&resolve_config(conn)?)?;
    let dashboard = reporter.dashboard()?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(exit_codes::OK)
}

fn cmd_report(conn: &ConnArgs, args: ReportArgs) -> anyhow::Result<i32> {
    let format: OutputFormat = args.format.parse()?;
    let reporter = Reporter::connect(&resolve_config(conn)?)?;
    let report = reporter.manual_test_report()?;
    let document = render(&report, &format)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, document)
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(event = "report_written", path = %path.display());
        }
        None => println!("{}", document),
    }
    Ok(exit_codes::OK)
}

fn cmd_journal(conn: &ConnArgs, args: JournalArgs) -> anyhow::Result<i32> {
    // validate sort/order before touching the database
    let query = JournalQuery::parse(args.latest, args.since, args.status, &args.sort, &args.order)?;
    let reporter = Reporter::connect(&resolve_config(conn)?)?;
    let records = reporter.journal(&query)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(exit_codes::OK)
}
