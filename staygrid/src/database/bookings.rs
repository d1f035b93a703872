//! Row access for reservation headers and payments.
//!
//! Header writes never derive their own window or head count: the
//! structural-mutation operations recompute those via
//! [`crate::operations`] after touching cells. Unknown status/kind/timing
//! strings read back from the store are conversion errors, never silently
//! defaulted.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::calendar::DateRange;
use crate::cell::Payment;
use crate::error::{Error, Result};
use crate::hotel::{HotelId, RoomId, UserId};
use crate::reservation::{
    PaymentTiming, Reservation, ReservationId, ReservationKind, ReservationStatus,
};

use super::{decimal_from_sql, decimal_to_sql};

const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
        (hotel_id, client, status, kind, payment_timing, check_in, check_out, people,
         created_by, updated_by)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_RESERVATION: &str = r"
    SELECT id, hotel_id, client, status, kind, payment_timing, check_in, check_out, people
    FROM reservations
    WHERE id = ?
";

const UPDATE_RESERVATION_WINDOW: &str = r"
    UPDATE reservations
    SET check_in = ?, check_out = ?, people = ?, updated_by = ?
    WHERE id = ?
";

const UPDATE_RESERVATION_STATUS: &str = r"
    UPDATE reservations
    SET status = ?, updated_by = ?
    WHERE id = ?
";

const DELETE_RESERVATION: &str = "DELETE FROM reservations WHERE id = ?";

const INSERT_PAYMENT: &str = r"
    INSERT INTO payments (hotel_id, reservation_id, room_id, pay_date, payer, value, invoice_id)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const SELECT_PAYMENTS: &str = r"
    SELECT id, hotel_id, reservation_id, room_id, pay_date, payer, value, invoice_id
    FROM payments
    WHERE reservation_id = ?
    ORDER BY pay_date, id
";

const SELECT_PAYMENTS_FOR_ROOM: &str = r"
    SELECT id, hotel_id, reservation_id, room_id, pay_date, payer, value, invoice_id
    FROM payments
    WHERE reservation_id = ? AND room_id = ?
    ORDER BY pay_date, id
";

const MOVE_ROOM_PAYMENTS_ALL: &str = r"
    UPDATE payments
    SET reservation_id = ?
    WHERE reservation_id = ? AND room_id = ?
";

const MOVE_ROOM_PAYMENTS_IN_RANGE: &str = r"
    UPDATE payments
    SET reservation_id = ?
    WHERE reservation_id = ? AND room_id = ? AND pay_date >= ? AND pay_date < ?
";

/// Maps a reservations row in SELECT column order.
fn row_to_reservation(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    let status: String = row.get(3)?;
    let kind: String = row.get(4)?;
    let timing: String = row.get(5)?;

    let status = ReservationStatus::parse(&status)
        .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?;
    let kind = ReservationKind::parse(&kind)
        .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?;
    let timing = PaymentTiming::parse(&timing)
        .map_err(|msg| rusqlite::Error::ToSqlConversionFailure(msg.into()))?;

    Reservation::new(
        ReservationId::new(row.get(0)?),
        HotelId::new(row.get(1)?),
        row.get(2)?,
        status,
        kind,
        timing,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    )
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Maps a payments row in SELECT column order.
fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    let value: String = row.get(6)?;
    Ok(Payment {
        id: row.get(0)?,
        hotel: HotelId::new(row.get(1)?),
        reservation: ReservationId::new(row.get(2)?),
        room: RoomId::new(row.get(3)?),
        pay_date: row.get(4)?,
        payer: row.get(5)?,
        value: decimal_from_sql(&value)?,
        invoice: row.get(7)?,
    })
}

/// A reservation header to be created.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Booking client name, if known.
    pub client: Option<String>,
    /// Initial lifecycle status.
    pub status: ReservationStatus,
    /// Sales channel.
    pub kind: ReservationKind,
    /// Payment timing.
    pub payment_timing: PaymentTiming,
}

/// Creates a reservation header with an empty derived window.
///
/// The window and head count are filled in by the derived-field refresh
/// once cells exist.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_reservation(
    conn: &Connection,
    reservation: &NewReservation,
    user: UserId,
) -> Result<ReservationId> {
    conn.execute(
        INSERT_RESERVATION,
        params![
            reservation.hotel.value(),
            reservation.client,
            reservation.status.as_str(),
            reservation.kind.as_str(),
            reservation.payment_timing.as_str(),
            Option::<NaiveDate>::None,
            Option::<NaiveDate>::None,
            0u32,
            user.value(),
            user.value(),
        ],
    )?;
    Ok(ReservationId::new(conn.last_insert_rowid()))
}

/// Fetches a reservation by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the reservation does not exist.
pub fn get_reservation(conn: &Connection, id: ReservationId) -> Result<Reservation> {
    try_get_reservation(conn, id)?.ok_or_else(|| Error::not_found(format!("reservation {id}")))
}

/// Fetches a reservation by id, returning `None` when absent.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn try_get_reservation(conn: &Connection, id: ReservationId) -> Result<Option<Reservation>> {
    Ok(conn
        .query_row(SELECT_RESERVATION, params![id.value()], row_to_reservation)
        .optional()?)
}

/// Rewrites a reservation's derived window and head count.
///
/// # Errors
///
/// Returns [`Error::Consistency`] if the reservation row is missing (the
/// update must affect exactly one row).
pub fn update_reservation_window(
    conn: &Connection,
    id: ReservationId,
    window: Option<DateRange>,
    people: u32,
    user: UserId,
) -> Result<()> {
    let affected = conn.execute(
        UPDATE_RESERVATION_WINDOW,
        params![
            window.map(|w| w.check_in()),
            window.map(|w| w.check_out()),
            people,
            user.value(),
            id.value(),
        ],
    )?;
    if affected != 1 {
        return Err(Error::consistency(format!(
            "window update for reservation {id} affected {affected} rows, expected 1"
        )));
    }
    Ok(())
}

/// Rewrites a reservation's status.
///
/// # Errors
///
/// Returns [`Error::Consistency`] if the reservation row is missing.
pub fn update_reservation_status(
    conn: &Connection,
    id: ReservationId,
    status: ReservationStatus,
    user: UserId,
) -> Result<()> {
    let affected = conn.execute(
        UPDATE_RESERVATION_STATUS,
        params![status.as_str(), user.value(), id.value()],
    )?;
    if affected != 1 {
        return Err(Error::consistency(format!(
            "status update for reservation {id} affected {affected} rows, expected 1"
        )));
    }
    Ok(())
}

/// Deletes a reservation header.
///
/// Callers must only do this once no cell rows reference the header; the
/// derived-field refresh handles that bookkeeping.
///
/// # Errors
///
/// Returns [`Error::Consistency`] if the reservation row is missing.
pub fn delete_reservation(conn: &Connection, id: ReservationId) -> Result<()> {
    let affected = conn.execute(DELETE_RESERVATION, params![id.value()])?;
    if affected != 1 {
        return Err(Error::consistency(format!(
            "delete of reservation {id} affected {affected} rows, expected 1"
        )));
    }
    Ok(())
}

/// A payment to be recorded.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Reservation the payment settles.
    pub reservation: ReservationId,
    /// Room the payment is attributed to.
    pub room: RoomId,
    /// Date the payment applies to.
    pub pay_date: NaiveDate,
    /// Who paid.
    pub payer: String,
    /// Paid amount.
    pub value: Decimal,
    /// Invoice grouping, if invoiced.
    pub invoice: Option<i64>,
}

/// Records a payment and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_payment(conn: &Connection, payment: &NewPayment) -> Result<i64> {
    conn.execute(
        INSERT_PAYMENT,
        params![
            payment.hotel.value(),
            payment.reservation.value(),
            payment.room.value(),
            payment.pay_date,
            payment.payer,
            decimal_to_sql(payment.value),
            payment.invoice,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists payments for a reservation, optionally restricted to one room.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn payments_for(
    conn: &Connection,
    reservation: ReservationId,
    room: Option<RoomId>,
) -> Result<Vec<Payment>> {
    let payments = match room {
        Some(room) => {
            let mut stmt = conn.prepare(SELECT_PAYMENTS_FOR_ROOM)?;
            let rows = stmt
                .query_map(params![reservation.value(), room.value()], row_to_payment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(SELECT_PAYMENTS)?;
            let rows = stmt
                .query_map(params![reservation.value()], row_to_payment)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(payments)
}

/// Moves all of a room's payments from one reservation to another.
///
/// Returns the number of payments moved.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn move_room_payments_all(
    conn: &Connection,
    from: ReservationId,
    room: RoomId,
    to: ReservationId,
) -> Result<usize> {
    Ok(conn.execute(
        MOVE_ROOM_PAYMENTS_ALL,
        params![to.value(), from.value(), room.value()],
    )?)
}

/// Moves a room's payments dated inside `range` from one reservation to
/// another.
///
/// Returns the number of payments moved.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn move_room_payments_in_range(
    conn: &Connection,
    from: ReservationId,
    room: RoomId,
    to: ReservationId,
    range: DateRange,
) -> Result<usize> {
    Ok(conn.execute(
        MOVE_ROOM_PAYMENTS_IN_RANGE,
        params![
            to.value(),
            from.value(),
            room.value(),
            range.check_in(),
            range.check_out(),
        ],
    )?)
}
