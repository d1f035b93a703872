//! Database layer: the persistent occupancy ledger.
//!
//! This module provides the SQLite-backed store behind the engine:
//! connection management with WAL mode and busy timeouts, schema
//! versioning, and row-level access to every table. Mutating engine
//! operations open one `Immediate` transaction per logical operation and
//! thread the handle through the free functions in [`grid`], [`bookings`],
//! and [`registry`] - there is no ambient/global connection.
//!
//! # Examples
//!
//! ```no_run
//! use staygrid::database::{Database, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/tmp/staygrid.db");
//! let mut db = Database::open(config).unwrap();
//! let conn = db.connection();
//! ```

mod config;
mod connection;
pub mod migrations;
mod schema;

pub mod bookings;
pub mod grid;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{default_data_dir, resolve_database_path, DatabaseConfig};
pub use connection::Database;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};

use rust_decimal::Decimal;

/// Converts a decimal amount to its TEXT storage form.
pub(crate) fn decimal_to_sql(value: Decimal) -> String {
    value.to_string()
}

/// Parses a decimal amount from its TEXT storage form.
///
/// Malformed amounts map to a rusqlite conversion error so row mappers
/// can propagate them without panicking.
pub(crate) fn decimal_from_sql(text: &str) -> rusqlite::Result<Decimal> {
    text.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
