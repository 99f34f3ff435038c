use thiserror::Error;

/// Everything that can go wrong while building or rendering a report.
///
/// Store errors propagate after the enclosing transaction has rolled back;
/// there is no retry and never a partial report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no build found for project '{0}'")]
    BuildNotFound(String),

    #[error("unknown column '{0}'")]
    InvalidSortColumn(String),

    #[error("unknown order '{0}'")]
    InvalidSortOrder(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
