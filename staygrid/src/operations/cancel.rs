//! Cancellation: soft-deleting cells while keeping their fee trail.
//!
//! Cancelled cells stay in the grid with a marker so cancellation-fee
//! rate lines remain attributable; a reservation whose cells are all
//! cancelled transitions to `Cancelled` but is retained.

use chrono::NaiveDate;
use rusqlite::TransactionBehavior;

use crate::calendar::DateRange;
use crate::database::{grid, Database};
use crate::error::{Error, Result};
use crate::hotel::{RoomId, UserId};
use crate::reservation::ReservationId;

use super::refresh::{refresh_reservation, RefreshOutcome};

/// Options for a cancel operation.
#[derive(Debug, Clone)]
pub struct CancelOptions {
    /// The reservation to cancel cells of.
    pub reservation: ReservationId,
    /// Restrict to one room; `None` cancels across all rooms.
    pub room: Option<RoomId>,
    /// Restrict to nights inside this range; `None` cancels all nights.
    pub range: Option<DateRange>,
    /// The cancellation date recorded on each cell.
    pub cancelled_on: NaiveDate,
    /// Acting user for audit columns.
    pub acting_user: UserId,
}

/// Result of a cancel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOutcome {
    /// How many cells were soft-cancelled.
    pub cancelled_cells: usize,
    /// Whether the whole reservation ended up cancelled.
    pub reservation_cancelled: bool,
}

/// Soft-cancels the active cells matching the options, then refreshes the
/// reservation's derived fields - one atomic transaction.
///
/// # Errors
///
/// - [`Error::NotFound`] when the reservation is absent or no active cell
///   matches the selection
/// - [`Error::Consistency`] / [`Error::Store`] on write failures; the
///   whole transaction rolls back
pub fn cancel(db: &mut Database, options: &CancelOptions) -> Result<CancelOutcome> {
    let user = options.acting_user;
    let tx = db
        .connection_mut()
        .transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Existence check before selection so "no such reservation" and
    // "nothing matched" stay distinguishable
    crate::database::bookings::get_reservation(&tx, options.reservation)?;

    let cells = grid::active_cells_for_reservation(&tx, options.reservation)?;
    let selected: Vec<_> = cells
        .iter()
        .filter(|c| options.room.is_none_or(|r| c.room() == r))
        .filter(|c| options.range.is_none_or(|range| range.contains(c.stay_date())))
        .collect();

    if selected.is_empty() {
        return Err(Error::not_found(format!(
            "active cells of reservation {} matching the selection",
            options.reservation
        )));
    }

    for cell in &selected {
        grid::cancel_cell(&tx, cell.id(), options.cancelled_on, user)?;
    }

    let outcome = refresh_reservation(&tx, options.reservation, user)?;
    tx.commit()?;

    Ok(CancelOutcome {
        cancelled_cells: selected.len(),
        reservation_cancelled: outcome == RefreshOutcome::AllCancelled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::config::DoubleBookingPolicy;
    use crate::database::bookings;
    use crate::database::test_util::{open_test_database, seed_hotel_with_rooms, seed_reservation};
    use crate::reservation::ReservationStatus;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn occupy(db: &Database, seed: &crate::database::test_util::SeededHotel, res: ReservationId, room_idx: usize, day: u32) {
        grid::insert_cell(
            db.connection(),
            &grid::NewCell {
                hotel: seed.hotel,
                room: seed.rooms[room_idx],
                stay_date: d(day),
                reservation: res,
                rate_plan: None,
                people: 2,
                price: Decimal::from(5000),
                billable: true,
            },
            DoubleBookingPolicy::RejectConfirmed,
            UserId::new(1),
        )
        .unwrap();
    }

    #[test]
    fn test_cancel_one_room_recomputes_window() {
        let mut db = open_test_database();
        let seed = seed_hotel_with_rooms(db.connection(), 2);
        let res = seed_reservation(db.connection(), &seed, ReservationStatus::Confirmed);

        // Room 101 nights 1-3, room 102 night 1
        for day in [1, 2, 3] {
            occupy(&db, &seed, res, 0, day);
        }
        occupy(&db, &seed, res, 1, 1);
        crate::operations::refresh_reservation(db.connection(), res, UserId::new(1)).unwrap();

        let outcome = cancel(
            &mut db,
            &CancelOptions {
                reservation: res,
                room: Some(seed.rooms[0]),
                range: Some(DateRange::new(d(2), d(4)).unwrap()),
                cancelled_on: d(1),
                acting_user: UserId::new(1),
            },
        )
        .unwrap();
        assert_eq!(outcome.cancelled_cells, 2);
        assert!(!outcome.reservation_cancelled);

        let header = bookings::get_reservation(db.connection(), res).unwrap();
        assert_eq!(header.check_in(), Some(d(1)));
        assert_eq!(header.check_out(), Some(d(2)));
    }

    #[test]
    fn test_cancel_everything_marks_reservation_cancelled() {
        let mut db = open_test_database();
        let seed = seed_hotel_with_rooms(db.connection(), 1);
        let res = seed_reservation(db.connection(), &seed, ReservationStatus::Confirmed);
        occupy(&db, &seed, res, 0, 1);
        occupy(&db, &seed, res, 0, 2);

        let outcome = cancel(
            &mut db,
            &CancelOptions {
                reservation: res,
                room: None,
                range: None,
                cancelled_on: d(1),
                acting_user: UserId::new(1),
            },
        )
        .unwrap();
        assert_eq!(outcome.cancelled_cells, 2);
        assert!(outcome.reservation_cancelled);

        // Header retained with its cancelled cells
        let header = bookings::get_reservation(db.connection(), res).unwrap();
        assert_eq!(header.status(), ReservationStatus::Cancelled);
        assert_eq!(
            grid::cells_for_reservation(db.connection(), res).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_cancel_nothing_matched() {
        let mut db = open_test_database();
        let seed = seed_hotel_with_rooms(db.connection(), 1);
        let res = seed_reservation(db.connection(), &seed, ReservationStatus::Confirmed);
        occupy(&db, &seed, res, 0, 1);

        let err = cancel(
            &mut db,
            &CancelOptions {
                reservation: res,
                room: None,
                range: Some(DateRange::new(d(10), d(12)).unwrap()),
                cancelled_on: d(1),
                acting_user: UserId::new(1),
            },
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_cancel_unknown_reservation() {
        let mut db = open_test_database();

        let err = cancel(
            &mut db,
            &CancelOptions {
                reservation: ReservationId::new(404),
                room: None,
                range: None,
                cancelled_on: d(1),
                acting_user: UserId::new(1),
            },
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }
}
