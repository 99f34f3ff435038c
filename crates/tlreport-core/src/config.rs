use crate::errors::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection settings: the TestLink SQLite database and the project
/// identifier (matched against `testprojects.notes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: PathBuf,
    pub project: String,
}

impl Config {
    pub fn new(database: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            project: project.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(ReportError::Config("project must not be empty".into()));
        }
        if self.database.as_os_str().is_empty() {
            return Err(ReportError::Config("database path must not be empty".into()));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ReportError::Config(format!("failed to read config {}: {}", path.display(), e))
    })?;
    let cfg: Config = serde_yaml::from_str(&raw)
        .map_err(|e| ReportError::Config(format!("failed to parse YAML: {}", e)))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tlreport.yaml");
        std::fs::write(&path, "database: /var/lib/testlink.db\nproject: acme\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.database, PathBuf::from("/var/lib/testlink.db"));
        assert_eq!(cfg.project, "acme");
    }

    #[test]
    fn test_empty_project_rejected() {
        let cfg = Config::new("/tmp/db.sqlite", "  ");
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config(Path::new("/nonexistent/tlreport.yaml")).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}
