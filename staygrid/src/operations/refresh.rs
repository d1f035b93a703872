//! Derived-field refresh: the shared final step of every structural
//! mutation.
//!
//! A reservation's `check_in`, `check_out`, and `people` are aggregates
//! over its active cells and must be recomputed after any cell write,
//! never trusted stale.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::calendar::DateRange;
use crate::database::bookings;
use crate::error::{Error, Result};
use crate::hotel::UserId;
use crate::reservation::{ReservationId, ReservationStatus};

const SELECT_NIGHT_AGGREGATES: &str = r"
    SELECT stay_date, SUM(people)
    FROM occupancy_cells
    WHERE reservation_id = ? AND cancelled_on IS NULL
    GROUP BY stay_date
    ORDER BY stay_date
";

const COUNT_ALL_CELLS: &str = "SELECT COUNT(*) FROM occupancy_cells WHERE reservation_id = ?";

/// What the refresh did with the reservation header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Active cells remain; the window and head count were recomputed.
    Updated,
    /// Only soft-cancelled cells remain; the header was retained in
    /// `Cancelled` status so cancellation fees stay attributable.
    AllCancelled,
    /// No cell rows reference the header anymore; it was deleted.
    Deleted,
}

/// Recomputes a reservation's derived fields from its cells.
///
/// - `check_in` = min active night, `check_out` = max active night + 1
/// - `people` = maximum per-night sum of cell head counts
/// - zero active but some cancelled cells: header kept, status
///   `Cancelled`, window cleared
/// - zero cell rows of any state: header deleted
///
/// # Errors
///
/// Returns [`Error::Consistency`] if the header row is missing while
/// cells still reference it, or a store error if a query fails.
pub fn refresh_reservation(
    conn: &Connection,
    id: ReservationId,
    user: UserId,
) -> Result<RefreshOutcome> {
    let mut stmt = conn.prepare(SELECT_NIGHT_AGGREGATES)?;
    let nights = stmt
        .query_map(params![id.value()], |row| {
            Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if let (Some(first), Some(last)) = (nights.first(), nights.last()) {
        let window = DateRange::new(first.0, last.0 + chrono::Duration::days(1))
            .map_err(|e| Error::consistency(format!("derived window for reservation {id}: {e}")))?;
        let people = nights.iter().map(|(_, p)| *p).max().unwrap_or(0);
        let people = u32::try_from(people)
            .map_err(|_| Error::consistency(format!("derived head count for reservation {id}")))?;

        bookings::update_reservation_window(conn, id, Some(window), people, user)?;
        return Ok(RefreshOutcome::Updated);
    }

    let remaining: i64 = conn.query_row(COUNT_ALL_CELLS, params![id.value()], |row| row.get(0))?;
    if remaining > 0 {
        // Soft-cancelled rows keep the header alive for fee accounting
        bookings::update_reservation_window(conn, id, None, 0, user)?;
        bookings::update_reservation_status(conn, id, ReservationStatus::Cancelled, user)?;
        return Ok(RefreshOutcome::AllCancelled);
    }

    log::debug!("reservation {id} has no remaining cells, deleting header");
    bookings::delete_reservation(conn, id)?;
    Ok(RefreshOutcome::Deleted)
}
