//! Utility functions for CLI operations.
//!
//! Common plumbing shared across commands: database opening, engine
//! configuration loading, and argument parsing helpers.

use std::path::PathBuf;

use chrono::NaiveDate;

use staygrid::calendar::DateRange;
use staygrid::database::{resolve_database_path, Database, DatabaseConfig};
use staygrid::{config, EngineConfig};

use crate::error::CliError;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Verbosity fields are consumed by the logger in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,
}

/// Opens the inventory database, creating it (and its schema) on first
/// use.
pub fn open_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let path = resolve_database_path(global.data_dir.as_deref())?;
    Ok(Database::open(DatabaseConfig::new(path))?)
}

/// Loads the engine configuration from the data directory, falling back
/// to defaults when no config file exists.
pub fn load_engine_config(global: &GlobalOptions) -> Result<EngineConfig, CliError> {
    let data_dir = match &global.data_dir {
        Some(dir) => dir.clone(),
        None => staygrid::database::default_data_dir()?,
    };
    config::load_or_default(&data_dir).map_err(|e| CliError::Config(e.to_string()))
}

/// Parses a `YYYY-MM-DD` argument.
pub fn parse_date(value: &str, name: &str) -> Result<NaiveDate, CliError> {
    value.parse::<NaiveDate>().map_err(|_| {
        CliError::InvalidArguments(format!("{name} must be a YYYY-MM-DD date, got '{value}'"))
    })
}

/// Builds a stay range from check-in/check-out arguments.
pub fn parse_range(check_in: &str, check_out: &str) -> Result<DateRange, CliError> {
    let check_in = parse_date(check_in, "check-in")?;
    let check_out = parse_date(check_out, "check-out")?;
    DateRange::new(check_in, check_out)
        .map_err(|e| CliError::InvalidArguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-06-01", "check-in").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(parse_date("06/01/2024", "check-in").is_err());
    }

    #[test]
    fn test_parse_range_validates_order() {
        assert!(parse_range("2024-06-01", "2024-06-03").is_ok());
        let err = parse_range("2024-06-03", "2024-06-01").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
