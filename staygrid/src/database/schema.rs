//! Database schema definitions and SQL constants.
//!
//! All table definitions, indices, and schema-versioning SQL for the
//! occupancy ledger live here.

/// Current schema version for the database.
///
/// Stored in the metadata table and checked on every open.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the hotels table.
///
/// The hotel id is the tenant/partition key; every other table carries it.
pub const CREATE_HOTELS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS hotels (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )";

/// SQL statement to create the rooms table.
pub const CREATE_ROOMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rooms (
        id INTEGER PRIMARY KEY,
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        number TEXT NOT NULL,
        room_type TEXT NOT NULL,
        capacity INTEGER NOT NULL,
        smoking INTEGER NOT NULL DEFAULT 0,
        for_sale INTEGER NOT NULL DEFAULT 1,
        assignment_priority INTEGER NOT NULL DEFAULT 0,
        UNIQUE (hotel_id, number)
    )";

/// SQL statement to create the parking spots table.
pub const CREATE_PARKING_SPOTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS parking_spots (
        id INTEGER PRIMARY KEY,
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        label TEXT NOT NULL,
        capacity_units INTEGER NOT NULL,
        for_sale INTEGER NOT NULL DEFAULT 1,
        assignment_priority INTEGER NOT NULL DEFAULT 0,
        UNIQUE (hotel_id, label)
    )";

/// SQL statement to create the vehicle categories table.
pub const CREATE_VEHICLE_CATEGORIES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS vehicle_categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        required_units INTEGER NOT NULL
    )";

/// SQL statement to create the reservations table.
///
/// `check_in`, `check_out`, and `people` are derived from the
/// reservation's cells and recomputed after every structural mutation.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY,
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        client TEXT,
        status TEXT NOT NULL,
        kind TEXT NOT NULL,
        payment_timing TEXT NOT NULL,
        check_in TEXT,
        check_out TEXT,
        people INTEGER NOT NULL DEFAULT 0,
        created_by INTEGER NOT NULL,
        updated_by INTEGER NOT NULL
    )";

/// SQL statement to create the occupancy cells table.
///
/// A cell is one (reservation, room, night). There is deliberately no
/// uniqueness constraint over (hotel_id, room_id, stay_date): write-time
/// enforcement is the configurable, status-aware policy check inside the
/// insert transaction, and the audit scan surfaces anything that slipped
/// through.
pub const CREATE_OCCUPANCY_CELLS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS occupancy_cells (
        id INTEGER PRIMARY KEY,
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        stay_date TEXT NOT NULL,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        rate_plan_id INTEGER,
        people INTEGER NOT NULL,
        price TEXT NOT NULL,
        billable INTEGER NOT NULL DEFAULT 1,
        cancelled_on TEXT,
        created_by INTEGER NOT NULL,
        updated_by INTEGER NOT NULL
    )";

/// SQL statement to create the parking occupancy table.
///
/// The composite primary key is the uniqueness constraint the lock-skip
/// claim path relies on: a conflicting insert means a competitor already
/// holds the spot for that night.
pub const CREATE_PARKING_OCCUPANCY_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS parking_occupancy (
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        spot_id INTEGER NOT NULL REFERENCES parking_spots(id),
        stay_date TEXT NOT NULL,
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        created_by INTEGER NOT NULL,
        PRIMARY KEY (hotel_id, spot_id, stay_date)
    )";

/// SQL statement to create the rate lines table.
pub const CREATE_RATE_LINES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rate_lines (
        id INTEGER PRIMARY KEY,
        cell_id INTEGER NOT NULL REFERENCES occupancy_cells(id),
        adjustment TEXT NOT NULL,
        value TEXT NOT NULL,
        tax_rate TEXT NOT NULL,
        tax_kind TEXT NOT NULL,
        price TEXT NOT NULL,
        include_in_cancel_fee INTEGER NOT NULL DEFAULT 0,
        sales_category TEXT NOT NULL
    )";

/// SQL statement to create the addon lines table.
pub const CREATE_ADDON_LINES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS addon_lines (
        id INTEGER PRIMARY KEY,
        cell_id INTEGER NOT NULL REFERENCES occupancy_cells(id),
        addon_id INTEGER NOT NULL,
        kind TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        unit_price TEXT NOT NULL,
        tax_rate TEXT NOT NULL
    )";

/// SQL statement to create the cell clients table.
///
/// Client links are duplicated onto template-inserted cells during
/// duration-changing moves.
pub const CREATE_CELL_CLIENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS cell_clients (
        cell_id INTEGER NOT NULL REFERENCES occupancy_cells(id),
        client_name TEXT NOT NULL
    )";

/// SQL statement to create the payments table.
pub const CREATE_PAYMENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY,
        hotel_id INTEGER NOT NULL REFERENCES hotels(id),
        reservation_id INTEGER NOT NULL REFERENCES reservations(id),
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        pay_date TEXT NOT NULL,
        payer TEXT NOT NULL,
        value TEXT NOT NULL,
        invoice_id INTEGER
    )";

/// Index speeding up the availability exclusion scan and the audit scan.
pub const CREATE_CELLS_ROOM_DATE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_cells_room_date
    ON occupancy_cells(hotel_id, room_id, stay_date)";

/// Index speeding up per-reservation cell reads.
pub const CREATE_CELLS_RESERVATION_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_cells_reservation
    ON occupancy_cells(reservation_id)";

/// Index speeding up balance and payment-migration queries.
pub const CREATE_PAYMENTS_RESERVATION_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_payments_reservation
    ON payments(reservation_id, room_id)";

/// Index speeding up rate/addon line reads per cell.
pub const CREATE_RATE_LINES_CELL_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_rate_lines_cell
    ON rate_lines(cell_id)";

/// Index speeding up addon line reads per cell.
pub const CREATE_ADDON_LINES_CELL_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_addon_lines_cell
    ON addon_lines(cell_id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";
