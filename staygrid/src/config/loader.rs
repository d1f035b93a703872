//! Configuration file loading.

use std::fs;
use std::path::Path;

use crate::error::Result;

use super::schema::EngineConfig;

/// Loads an engine configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Examples
///
/// ```no_run
/// use staygrid::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("/etc/staygrid/config.yaml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path)?;
    let config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// Loads `config.yaml` from the given data directory, or returns defaults
/// when no file exists.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed;
/// a missing file is not an error.
pub fn load_or_default(data_dir: &Path) -> Result<EngineConfig> {
    let path = data_dir.join("config.yaml");
    if path.exists() {
        load_config(&path)
    } else {
        Ok(EngineConfig::default())
    }
}
