use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tlreport",
    version,
    about = "Status reports from a TestLink test-management database"
)]
pub struct Cli {
    #[command(flatten)]
    pub conn: ConnArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Clone)]
pub struct ConnArgs {
    /// YAML config file holding database path and project
    #[arg(long, default_value = "tlreport.yaml")]
    pub config: PathBuf,

    /// TestLink SQLite database (overrides the config file)
    #[arg(long, env = "TLREPORT_DB")]
    pub db: Option<PathBuf>,

    /// project identifier, matched against testprojects.notes
    #[arg(long, env = "TLREPORT_PROJECT")]
    pub project: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Dashboard summary (totals, failures, testers) as JSON
    Dashboard,
    /// Manual test report grouped by folder
    Report(ReportArgs),
    /// Execution log, full or latest-per-test
    Journal(JournalArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct ReportArgs {
    /// json, rst, or any target the markup converter supports
    #[arg(long, default_value = "rst")]
    pub format: String,

    /// write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone)]
pub struct JournalArgs {
    /// only the latest execution per test case
    #[arg(long)]
    pub latest: bool,

    /// minimum timestamp, e.g. "2026-02-01 00:00:00"
    #[arg(long)]
    pub since: Option<String>,

    /// filter on status name (passed/failed/blocked)
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long, default_value = "timestamp")]
    pub sort: String,

    #[arg(long, default_value = "asc")]
    pub order: String,
}
