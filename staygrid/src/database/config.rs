//! Database configuration and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for database connections.
///
/// # Examples
///
/// ```
/// use staygrid::database::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("/tmp/staygrid.db")
///     .with_busy_timeout(Duration::from_millis(10000));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// Busy timeout for database lock contention.
    pub busy_timeout: Duration,
    /// Whether to automatically create the database if it doesn't exist.
    pub auto_create: bool,
    /// Whether to open the database in read-only mode.
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Creates a new database configuration with default settings.
    ///
    /// Default settings:
    /// - `busy_timeout`: 5000ms
    /// - `auto_create`: true
    /// - `read_only`: false
    ///
    /// # Examples
    ///
    /// ```
    /// use staygrid::database::DatabaseConfig;
    ///
    /// let config = DatabaseConfig::new("/tmp/staygrid.db");
    /// assert!(config.auto_create);
    /// ```
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            read_only: false,
        }
    }

    /// Sets the busy timeout duration.
    ///
    /// The busy timeout determines how long the connection waits on a
    /// locked database before returning an error. Concurrent allocation
    /// paths rely on this rather than blocking forever.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Configures the database to be opened in read-only mode.
    ///
    /// When read-only is enabled, `auto_create` is automatically disabled.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.auto_create = false;
        self
    }
}

/// Returns the default data directory for staygrid.
///
/// Respects the `STAYGRID_DATA_DIR` environment variable; otherwise
/// `~/.staygrid`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
///
/// # Examples
///
/// ```no_run
/// use staygrid::database::default_data_dir;
///
/// let dir = default_data_dir().unwrap();
/// ```
pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STAYGRID_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    home::home_dir()
        .map(|h| h.join(".staygrid"))
        .ok_or_else(|| Error::Validation {
            field: "data_dir".into(),
            message: "cannot determine home directory".into(),
        })
}

/// Resolves the database file path within a data directory.
///
/// Uses the given directory when provided, otherwise the default data
/// directory.
///
/// # Errors
///
/// Returns an error if no directory is given and the default cannot be
/// determined.
pub fn resolve_database_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_data_dir()?,
    };
    Ok(dir.join("staygrid.db"))
}
