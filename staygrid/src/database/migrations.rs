//! Database schema management and migrations.
//!
//! This module handles schema initialization and version checking.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_ADDON_LINES_CELL_INDEX, CREATE_ADDON_LINES_TABLE, CREATE_CELLS_RESERVATION_INDEX,
    CREATE_CELLS_ROOM_DATE_INDEX, CREATE_CELL_CLIENTS_TABLE, CREATE_HOTELS_TABLE,
    CREATE_METADATA_TABLE, CREATE_OCCUPANCY_CELLS_TABLE, CREATE_PARKING_OCCUPANCY_TABLE,
    CREATE_PARKING_SPOTS_TABLE, CREATE_PAYMENTS_RESERVATION_INDEX, CREATE_PAYMENTS_TABLE,
    CREATE_RATE_LINES_CELL_INDEX, CREATE_RATE_LINES_TABLE, CREATE_RESERVATIONS_TABLE,
    CREATE_ROOMS_TABLE, CREATE_VEHICLE_CATEGORIES_TABLE, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Initializes the database schema.
///
/// Creates all tables, indices, and the version metadata for a fresh
/// database.
///
/// # Errors
///
/// Returns an error if any SQL statement fails to execute.
///
/// # Examples
///
/// ```no_run
/// use rusqlite::Connection;
/// use staygrid::database::migrations::initialize_schema;
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// ```
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    conn.execute(CREATE_HOTELS_TABLE, [])?;
    conn.execute(CREATE_ROOMS_TABLE, [])?;
    conn.execute(CREATE_PARKING_SPOTS_TABLE, [])?;
    conn.execute(CREATE_VEHICLE_CATEGORIES_TABLE, [])?;
    conn.execute(CREATE_RESERVATIONS_TABLE, [])?;
    conn.execute(CREATE_OCCUPANCY_CELLS_TABLE, [])?;
    conn.execute(CREATE_PARKING_OCCUPANCY_TABLE, [])?;
    conn.execute(CREATE_RATE_LINES_TABLE, [])?;
    conn.execute(CREATE_ADDON_LINES_TABLE, [])?;
    conn.execute(CREATE_CELL_CLIENTS_TABLE, [])?;
    conn.execute(CREATE_PAYMENTS_TABLE, [])?;

    conn.execute(CREATE_CELLS_ROOM_DATE_INDEX, [])?;
    conn.execute(CREATE_CELLS_RESERVATION_INDEX, [])?;
    conn.execute(CREATE_PAYMENTS_RESERVATION_INDEX, [])?;
    conn.execute(CREATE_RATE_LINES_CELL_INDEX, [])?;
    conn.execute(CREATE_ADDON_LINES_CELL_INDEX, [])?;

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;

    Ok(())
}

/// Gets the current schema version from the database.
///
/// # Errors
///
/// Returns an error if the query fails for reasons other than a missing
/// metadata table (which indicates version 0).
///
/// # Returns
///
/// - `Ok(0)` if the metadata table doesn't exist or has no version
/// - `Ok(version)` if a version is found
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => {
            // "no such table" means an uninitialized database
            if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = e {
                if sqlite_err.code == rusqlite::ErrorCode::Unknown {
                    return Ok(0);
                }
            }
            Err(e.into())
        }
    }
}

/// Checks schema compatibility and initializes if needed.
///
/// - Version 0 (fresh database): initializes the schema
/// - Version matching [`CURRENT_SCHEMA_VERSION`]: success
/// - Anything else: incompatible
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] for incompatible databases,
/// or a store error if initialization fails.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    match version {
        0 => initialize_schema(conn),
        CURRENT_SCHEMA_VERSION => Ok(()),
        found => Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found,
        }),
    }
}
