//! Double-booking audit: an independent integrity scan over the grid.
//!
//! The scan is read-only and on-demand, not a pre-insert gate: whatever
//! slipped past the write-time policy (or predates it) is surfaced here
//! with full context.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hotel::{HotelId, RoomId};
use crate::reservation::{ReservationId, ReservationStatus};

const SELECT_CONFLICT_GROUPS: &str = r"
    SELECT hotel_id, room_id, stay_date
    FROM occupancy_cells
    WHERE cancelled_on IS NULL
      AND (?1 IS NULL OR hotel_id = ?1)
    GROUP BY hotel_id, room_id, stay_date
    HAVING COUNT(*) > 1
    ORDER BY hotel_id, room_id, stay_date
";

const SELECT_CONFLICTING_STAYS: &str = r"
    SELECT c.reservation_id, r.status, r.client, r.check_in, r.check_out
    FROM occupancy_cells c
    JOIN reservations r ON r.id = c.reservation_id
    WHERE c.hotel_id = ? AND c.room_id = ? AND c.stay_date = ?
      AND c.cancelled_on IS NULL
    ORDER BY c.reservation_id
";

/// One reservation participating in a double booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingStay {
    /// The reservation holding a cell on the conflicted night.
    pub reservation: ReservationId,
    /// Its lifecycle status.
    pub status: ReservationStatus,
    /// Its booking client, if known.
    pub client: Option<String>,
    /// Its derived stay length in nights (0 when the window is unset).
    pub nights: i64,
}

/// A (hotel, room, date) holding more than one active cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleBooking {
    /// The hotel.
    pub hotel: HotelId,
    /// The conflicted room.
    pub room: RoomId,
    /// The conflicted night.
    pub stay_date: NaiveDate,
    /// Every reservation holding an active cell on that night.
    pub conflicts: Vec<ConflictingStay>,
}

/// Scans for (hotel, room, date) groups with more than one active cell.
///
/// Pass a hotel to restrict the scan, or `None` for every hotel. An empty
/// result means the uniqueness invariant holds.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn scan(conn: &Connection, hotel: Option<HotelId>) -> Result<Vec<DoubleBooking>> {
    let mut groups_stmt = conn.prepare(SELECT_CONFLICT_GROUPS)?;
    let groups = groups_stmt
        .query_map(params![hotel.map(HotelId::value)], |row| {
            Ok((
                HotelId::new(row.get(0)?),
                RoomId::new(row.get(1)?),
                row.get::<_, NaiveDate>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stays_stmt = conn.prepare(SELECT_CONFLICTING_STAYS)?;
    let mut report = Vec::with_capacity(groups.len());

    for (hotel, room, stay_date) in groups {
        let conflicts = stays_stmt
            .query_map(
                params![hotel.value(), room.value(), stay_date],
                |row| {
                    let status: String = row.get(1)?;
                    let check_in: Option<NaiveDate> = row.get(3)?;
                    let check_out: Option<NaiveDate> = row.get(4)?;
                    Ok(ConflictingStay {
                        reservation: ReservationId::new(row.get(0)?),
                        status: ReservationStatus::parse(&status).map_err(|msg| {
                            rusqlite::Error::ToSqlConversionFailure(msg.into())
                        })?,
                        client: row.get(2)?,
                        nights: match (check_in, check_out) {
                            (Some(ci), Some(co)) => (co - ci).num_days(),
                            _ => 0,
                        },
                    })
                },
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        report.push(DoubleBooking {
            hotel,
            room,
            stay_date,
            conflicts,
        });
    }

    Ok(report)
}
