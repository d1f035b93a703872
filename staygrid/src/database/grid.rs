//! The Inventory Grid: row access for occupancy cells and the charge
//! lines attached to them.
//!
//! A cell write never mutates derived reservation fields; callers run the
//! derived-field refresh in [`crate::operations`] afterwards. Cancel is a
//! soft delete so cancellation-fee rate lines stay attributable. Every
//! write takes the acting user id for the audit columns.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::cell::{
    AddonKind, AddonLine, AdjustmentType, CellId, OccupancyCell, RateLine, TaxKind,
};
use crate::config::DoubleBookingPolicy;
use crate::error::{Error, Result};
use crate::hotel::{HotelId, RoomId, UserId};
use crate::reservation::ReservationId;

use super::{bookings, decimal_from_sql, decimal_to_sql};

const INSERT_CELL: &str = r"
    INSERT INTO occupancy_cells
        (hotel_id, room_id, stay_date, reservation_id, rate_plan_id, people, price,
         billable, cancelled_on, created_by, updated_by)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
";

const CELL_COLUMNS: &str = r"
    id, hotel_id, room_id, stay_date, reservation_id, rate_plan_id, people, price,
    billable, cancelled_on
";

const COUNT_ACTIVE_CONFLICTS: &str = r"
    SELECT COUNT(*)
    FROM occupancy_cells c
    JOIN reservations r ON r.id = c.reservation_id
    WHERE c.hotel_id = ? AND c.room_id = ? AND c.stay_date = ?
      AND c.cancelled_on IS NULL
";

const CANCEL_CELL: &str = r"
    UPDATE occupancy_cells
    SET cancelled_on = ?, updated_by = ?
    WHERE id = ? AND cancelled_on IS NULL
";

const REPOINT_CELL: &str = r"
    UPDATE occupancy_cells
    SET reservation_id = ?, updated_by = ?
    WHERE id = ?
";

const SHIFT_RESERVATION_DATES: &str = r"
    UPDATE occupancy_cells
    SET stay_date = date(stay_date, ? || ' days'), updated_by = ?
    WHERE reservation_id = ? AND cancelled_on IS NULL
";

const DELETE_CELL: &str = "DELETE FROM occupancy_cells WHERE id = ?";
const DELETE_CELL_RATE_LINES: &str = "DELETE FROM rate_lines WHERE cell_id = ?";
const DELETE_CELL_ADDON_LINES: &str = "DELETE FROM addon_lines WHERE cell_id = ?";
const DELETE_CELL_CLIENTS: &str = "DELETE FROM cell_clients WHERE cell_id = ?";

const INSERT_RATE_LINE: &str = r"
    INSERT INTO rate_lines
        (cell_id, adjustment, value, tax_rate, tax_kind, price, include_in_cancel_fee,
         sales_category)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_RATE_LINES: &str = r"
    SELECT id, cell_id, adjustment, value, tax_rate, tax_kind, price, include_in_cancel_fee,
           sales_category
    FROM rate_lines
    WHERE cell_id = ?
    ORDER BY id
";

const INSERT_ADDON_LINE: &str = r"
    INSERT INTO addon_lines (cell_id, addon_id, kind, quantity, unit_price, tax_rate)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_ADDON_LINES: &str = r"
    SELECT id, cell_id, addon_id, kind, quantity, unit_price, tax_rate
    FROM addon_lines
    WHERE cell_id = ?
    ORDER BY id
";

const COPY_ADDON_LINES: &str = r"
    INSERT INTO addon_lines (cell_id, addon_id, kind, quantity, unit_price, tax_rate)
    SELECT ?, addon_id, kind, quantity, unit_price, tax_rate
    FROM addon_lines
    WHERE cell_id = ?
";

const INSERT_CELL_CLIENT: &str = "INSERT INTO cell_clients (cell_id, client_name) VALUES (?, ?)";

const SELECT_CELL_CLIENTS: &str =
    "SELECT client_name FROM cell_clients WHERE cell_id = ? ORDER BY client_name";

const COPY_CELL_CLIENTS: &str = r"
    INSERT INTO cell_clients (cell_id, client_name)
    SELECT ?, client_name
    FROM cell_clients
    WHERE cell_id = ?
";

const COUNT_ROOM_CELLS: &str = r"
    SELECT COUNT(*)
    FROM occupancy_cells
    WHERE reservation_id = ? AND room_id = ?
";

/// Maps an occupancy cells row in [`CELL_COLUMNS`] order.
fn row_to_cell(row: &Row<'_>) -> rusqlite::Result<OccupancyCell> {
    let price: String = row.get(7)?;
    Ok(OccupancyCell::new(
        CellId::new(row.get(0)?),
        HotelId::new(row.get(1)?),
        RoomId::new(row.get(2)?),
        row.get(3)?,
        ReservationId::new(row.get(4)?),
        row.get(5)?,
        row.get(6)?,
        decimal_from_sql(&price)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

/// An occupancy cell to be created.
#[derive(Debug, Clone)]
pub struct NewCell {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Room the cell occupies.
    pub room: RoomId,
    /// The occupied night.
    pub stay_date: NaiveDate,
    /// Reservation the cell belongs to.
    pub reservation: ReservationId,
    /// Rate plan reference, if any.
    pub rate_plan: Option<i64>,
    /// Per-night guest count.
    pub people: u32,
    /// Aggregated rate total for the night.
    pub price: Decimal,
    /// Whether the charge counts toward the balance.
    pub billable: bool,
}

/// Creates an occupancy cell, enforcing the configured double-booking
/// policy inside the caller's transaction.
///
/// Under [`DoubleBookingPolicy::RejectConfirmed`] an overlap is tolerated
/// only while both the existing occupant and the inserting reservation
/// are provisional holds.
///
/// # Errors
///
/// - [`Error::ResourceUnavailable`] when the policy rejects the night
/// - [`Error::NotFound`] when the owning reservation is absent
pub fn insert_cell(
    conn: &Connection,
    cell: &NewCell,
    policy: DoubleBookingPolicy,
    user: UserId,
) -> Result<CellId> {
    check_double_booking(conn, cell, policy)?;

    conn.execute(
        INSERT_CELL,
        params![
            cell.hotel.value(),
            cell.room.value(),
            cell.stay_date,
            cell.reservation.value(),
            cell.rate_plan,
            cell.people,
            decimal_to_sql(cell.price),
            cell.billable,
            user.value(),
            user.value(),
        ],
    )?;
    Ok(CellId::new(conn.last_insert_rowid()))
}

/// Applies the write-time double-booking policy for one prospective cell.
fn check_double_booking(
    conn: &Connection,
    cell: &NewCell,
    policy: DoubleBookingPolicy,
) -> Result<()> {
    let condition = match policy {
        DoubleBookingPolicy::Allow => return Ok(()),
        DoubleBookingPolicy::RejectAll => String::new(),
        DoubleBookingPolicy::RejectConfirmed => {
            let inserting = bookings::get_reservation(conn, cell.reservation)?;
            if inserting.status().is_hold() {
                // Both sides provisional: tolerated
                " AND r.status != 'hold'".to_string()
            } else {
                String::new()
            }
        }
    };

    let sql = format!("{COUNT_ACTIVE_CONFLICTS}{condition}");
    let conflicts: i64 = conn.query_row(
        &sql,
        params![cell.hotel.value(), cell.room.value(), cell.stay_date],
        |row| row.get(0),
    )?;

    if conflicts > 0 {
        return Err(Error::ResourceUnavailable {
            reason: format!(
                "room {} is already occupied on {} in hotel {}",
                cell.room, cell.stay_date, cell.hotel
            ),
        });
    }
    Ok(())
}

/// Fetches a cell by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the cell does not exist.
pub fn get_cell(conn: &Connection, id: CellId) -> Result<OccupancyCell> {
    conn.query_row(
        &format!("SELECT {CELL_COLUMNS} FROM occupancy_cells WHERE id = ?"),
        params![id.value()],
        row_to_cell,
    )
    .optional()?
    .ok_or_else(|| Error::not_found(format!("occupancy cell {id}")))
}

/// Lists all cells of a reservation, cancelled rows included.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn cells_for_reservation(
    conn: &Connection,
    reservation: ReservationId,
) -> Result<Vec<OccupancyCell>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CELL_COLUMNS} FROM occupancy_cells
         WHERE reservation_id = ?
         ORDER BY room_id, stay_date"
    ))?;
    let cells = stmt
        .query_map(params![reservation.value()], row_to_cell)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cells)
}

/// Lists the active cells of a reservation.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_cells_for_reservation(
    conn: &Connection,
    reservation: ReservationId,
) -> Result<Vec<OccupancyCell>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CELL_COLUMNS} FROM occupancy_cells
         WHERE reservation_id = ? AND cancelled_on IS NULL
         ORDER BY room_id, stay_date"
    ))?;
    let cells = stmt
        .query_map(params![reservation.value()], row_to_cell)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cells)
}

/// Lists all cells of a room, cancelled rows included.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn cells_for_room(conn: &Connection, hotel: HotelId, room: RoomId) -> Result<Vec<OccupancyCell>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CELL_COLUMNS} FROM occupancy_cells
         WHERE hotel_id = ? AND room_id = ?
         ORDER BY stay_date"
    ))?;
    let cells = stmt
        .query_map(params![hotel.value(), room.value()], row_to_cell)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cells)
}

/// Fetches the active cell at one (room, date), if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_cell_at(
    conn: &Connection,
    hotel: HotelId,
    room: RoomId,
    date: NaiveDate,
) -> Result<Option<OccupancyCell>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {CELL_COLUMNS} FROM occupancy_cells
                 WHERE hotel_id = ? AND room_id = ? AND stay_date = ?
                   AND cancelled_on IS NULL"
            ),
            params![hotel.value(), room.value(), date],
            row_to_cell,
        )
        .optional()?)
}

/// Soft-cancels a cell: marks it, never removes the row.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the cell is absent or already
/// cancelled.
pub fn cancel_cell(conn: &Connection, id: CellId, on: NaiveDate, user: UserId) -> Result<()> {
    let affected = conn.execute(CANCEL_CELL, params![on, user.value(), id.value()])?;
    if affected != 1 {
        return Err(Error::not_found(format!("active occupancy cell {id}")));
    }
    Ok(())
}

/// Re-points cells at a different reservation.
///
/// # Errors
///
/// Returns [`Error::Consistency`] if any cell row is missing - the whole
/// enclosing transaction must be rolled back by the caller.
pub fn repoint_cells(
    conn: &Connection,
    cells: &[CellId],
    to: ReservationId,
    user: UserId,
) -> Result<()> {
    let mut stmt = conn.prepare(REPOINT_CELL)?;
    for id in cells {
        let affected = stmt.execute(params![to.value(), user.value(), id.value()])?;
        if affected != 1 {
            return Err(Error::consistency(format!(
                "re-pointing cell {id} to reservation {to} affected {affected} rows, expected 1"
            )));
        }
    }
    Ok(())
}

/// Translates every active cell of a reservation by `delta_days`.
///
/// Returns the number of cells shifted; the caller verifies it against
/// the expected active-cell count.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn shift_reservation_dates(
    conn: &Connection,
    reservation: ReservationId,
    delta_days: i64,
    user: UserId,
) -> Result<usize> {
    // SQLite's date() applies a signed day offset; pass "+4" / "-4"
    let offset = format!("{delta_days:+}");
    Ok(conn.execute(
        SHIFT_RESERVATION_DATES,
        params![offset, user.value(), reservation.value()],
    )?)
}

/// Hard-deletes cells together with their rate lines, addon lines, and
/// client links. Used by duration-changing moves for dropped nights.
///
/// # Errors
///
/// Returns [`Error::Consistency`] if any cell row is missing.
pub fn delete_cells(conn: &Connection, cells: &[CellId]) -> Result<()> {
    let mut rate_stmt = conn.prepare(DELETE_CELL_RATE_LINES)?;
    let mut addon_stmt = conn.prepare(DELETE_CELL_ADDON_LINES)?;
    let mut client_stmt = conn.prepare(DELETE_CELL_CLIENTS)?;
    let mut cell_stmt = conn.prepare(DELETE_CELL)?;

    for id in cells {
        rate_stmt.execute(params![id.value()])?;
        addon_stmt.execute(params![id.value()])?;
        client_stmt.execute(params![id.value()])?;
        let affected = cell_stmt.execute(params![id.value()])?;
        if affected != 1 {
            return Err(Error::consistency(format!(
                "delete of cell {id} affected {affected} rows, expected 1"
            )));
        }
    }
    Ok(())
}

/// A rate line to be created, already priced by the aggregator.
#[derive(Debug, Clone)]
pub struct NewRateLine {
    /// Owning cell.
    pub cell: CellId,
    /// How this line adjusts the charge.
    pub adjustment: AdjustmentType,
    /// Raw value (amount or percentage).
    pub value: Decimal,
    /// Tax rate applied to this line.
    pub tax_rate: Decimal,
    /// Tax treatment bucket.
    pub tax_kind: TaxKind,
    /// Computed price of the line.
    pub price: Decimal,
    /// Whether the line still charges when the cell is cancelled.
    pub include_in_cancel_fee: bool,
    /// Revenue-reporting category.
    pub sales_category: String,
}

/// Creates a rate line and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_rate_line(conn: &Connection, line: &NewRateLine) -> Result<i64> {
    conn.execute(
        INSERT_RATE_LINE,
        params![
            line.cell.value(),
            line.adjustment.as_str(),
            decimal_to_sql(line.value),
            decimal_to_sql(line.tax_rate),
            line.tax_kind.as_str(),
            decimal_to_sql(line.price),
            line.include_in_cancel_fee,
            line.sales_category,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists a cell's rate lines.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn rate_lines_for_cell(conn: &Connection, cell: CellId) -> Result<Vec<RateLine>> {
    let mut stmt = conn.prepare(SELECT_RATE_LINES)?;
    let lines = stmt
        .query_map(params![cell.value()], |row| {
            let adjustment: String = row.get(2)?;
            let value: String = row.get(3)?;
            let tax_rate: String = row.get(4)?;
            let tax_kind: String = row.get(5)?;
            let price: String = row.get(6)?;
            Ok(RateLine {
                id: row.get(0)?,
                cell: CellId::new(row.get(1)?),
                adjustment: AdjustmentType::parse(&adjustment)
                    .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?,
                value: decimal_from_sql(&value)?,
                tax_rate: decimal_from_sql(&tax_rate)?,
                tax_kind: TaxKind::parse(&tax_kind)
                    .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?,
                price: decimal_from_sql(&price)?,
                include_in_cancel_fee: row.get(7)?,
                sales_category: row.get(8)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(lines)
}

/// An addon line to be created.
#[derive(Debug, Clone)]
pub struct NewAddonLine {
    /// Owning cell.
    pub cell: CellId,
    /// Addon catalogue reference.
    pub addon: i64,
    /// What the addon charges for.
    pub kind: AddonKind,
    /// Quantity.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax rate applied to this line.
    pub tax_rate: Decimal,
}

/// Creates an addon line and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_addon_line(conn: &Connection, line: &NewAddonLine) -> Result<i64> {
    conn.execute(
        INSERT_ADDON_LINE,
        params![
            line.cell.value(),
            line.addon,
            line.kind.as_str(),
            line.quantity,
            decimal_to_sql(line.unit_price),
            decimal_to_sql(line.tax_rate),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists a cell's addon lines.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn addon_lines_for_cell(conn: &Connection, cell: CellId) -> Result<Vec<AddonLine>> {
    let mut stmt = conn.prepare(SELECT_ADDON_LINES)?;
    let lines = stmt
        .query_map(params![cell.value()], |row| {
            let kind: String = row.get(3)?;
            let unit_price: String = row.get(5)?;
            let tax_rate: String = row.get(6)?;
            Ok(AddonLine {
                id: row.get(0)?,
                cell: CellId::new(row.get(1)?),
                addon: row.get(2)?,
                kind: AddonKind::parse(&kind)
                    .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?,
                quantity: row.get(4)?,
                unit_price: decimal_from_sql(&unit_price)?,
                tax_rate: decimal_from_sql(&tax_rate)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(lines)
}

/// Duplicates one cell's addon lines onto another cell.
///
/// Returns the number of lines copied.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn copy_addon_lines(conn: &Connection, from: CellId, to: CellId) -> Result<usize> {
    Ok(conn.execute(COPY_ADDON_LINES, params![to.value(), from.value()])?)
}

/// Links a client to a cell.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_cell_client(conn: &Connection, cell: CellId, client_name: &str) -> Result<()> {
    conn.execute(INSERT_CELL_CLIENT, params![cell.value(), client_name])?;
    Ok(())
}

/// Lists the clients linked to a cell.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn cell_clients(conn: &Connection, cell: CellId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(SELECT_CELL_CLIENTS)?;
    let clients = stmt
        .query_map(params![cell.value()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(clients)
}

/// Duplicates one cell's client links onto another cell.
///
/// Returns the number of links copied.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn copy_cell_clients(conn: &Connection, from: CellId, to: CellId) -> Result<usize> {
    Ok(conn.execute(COPY_CELL_CLIENTS, params![to.value(), from.value()])?)
}

/// Counts the cell rows (active or cancelled) a reservation holds for one
/// room. Drives the payment-migration rule.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_room_cells(
    conn: &Connection,
    reservation: ReservationId,
    room: RoomId,
) -> Result<i64> {
    Ok(conn.query_row(
        COUNT_ROOM_CELLS,
        params![reservation.value(), room.value()],
        |row| row.get(0),
    )?)
}
