mod cli;

use clap::Parser;
use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};
use tlreport_core::errors::ReportError;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            match e.downcast_ref::<ReportError>() {
                Some(ReportError::Config(_)) | None => exit_codes::CONFIG_ERROR,
                Some(_) => exit_codes::REPORT_ERROR,
            }
        }
    };
    std::process::exit(code);
}
