//! Balance calculation: reconciling charges against payments per
//! reservation and room.
//!
//! The charge side has three non-overlapping terms: active billable cell
//! prices, cancellation fees retained on cancelled billable cells, and
//! addon totals. The payment side is the sum of recorded payments.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::cell::OccupancyCell;
use crate::database::{bookings, grid};
use crate::error::Result;
use crate::hotel::RoomId;
use crate::pricing::{addon_total, cancel_fee_total, RoundingPolicy};
use crate::reservation::ReservationId;

/// The answer to "what is owed" for one reservation (optionally one
/// room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceStatement {
    /// Total charges: active billable cells + retained cancellation fees
    /// + addon totals.
    pub total: Decimal,
    /// Total recorded payments.
    pub paid: Decimal,
    /// `total − paid`.
    pub balance: Decimal,
    /// Charges of the requested period clamped into `[0, balance]`;
    /// supports partial bulk payments spanning multiple reservations.
    pub period_payable: Decimal,
}

/// Computes the balance statement for a reservation.
///
/// With `room` set, only that room's cells and payments participate. With
/// `period` set, `period_payable` reflects only the charges whose night
/// falls inside the period; otherwise the whole charge total is used.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] if the reservation does not exist,
/// or a store error if a query fails.
pub fn statement(
    conn: &Connection,
    reservation: ReservationId,
    room: Option<RoomId>,
    period: Option<DateRange>,
    policy: RoundingPolicy,
) -> Result<BalanceStatement> {
    // Existence check up front so an empty statement is distinguishable
    // from a missing reservation
    bookings::get_reservation(conn, reservation)?;

    let cells = grid::cells_for_reservation(conn, reservation)?;
    let cells: Vec<&OccupancyCell> = cells
        .iter()
        .filter(|c| room.is_none_or(|r| c.room() == r))
        .collect();

    let mut total = Decimal::ZERO;
    let mut period_charges = Decimal::ZERO;

    for cell in &cells {
        if !cell.billable() {
            continue;
        }

        let charge = if cell.is_active() {
            let addons = grid::addon_lines_for_cell(conn, cell.id())?;
            cell.price() + addon_total(&addons)
        } else {
            let lines = grid::rate_lines_for_cell(conn, cell.id())?;
            cancel_fee_total(&lines, policy)
        };

        total += charge;
        if period.is_none_or(|p| p.contains(cell.stay_date())) {
            period_charges += charge;
        }
    }

    let paid: Decimal = bookings::payments_for(conn, reservation, room)?
        .iter()
        .map(|p| p.value)
        .sum();

    let balance = total - paid;
    let period_payable = period_charges.min(balance).max(Decimal::ZERO);

    Ok(BalanceStatement {
        total,
        paid,
        balance,
        period_payable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::cell::{AddonKind, AdjustmentType, TaxKind};
    use crate::config::DoubleBookingPolicy;
    use crate::database::test_util::{open_test_database, seed_hotel_with_rooms, seed_reservation};
    use crate::hotel::UserId;
    use crate::reservation::ReservationStatus;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    struct Fixture {
        db: crate::Database,
        seed: crate::database::test_util::SeededHotel,
        reservation: ReservationId,
    }

    fn fixture() -> Fixture {
        let db = open_test_database();
        let seed = seed_hotel_with_rooms(db.connection(), 2);
        let reservation = seed_reservation(db.connection(), &seed, ReservationStatus::Confirmed);
        Fixture {
            db,
            seed,
            reservation,
        }
    }

    fn add_cell(f: &Fixture, room: RoomId, day: u32, price: i64, billable: bool) -> crate::CellId {
        grid::insert_cell(
            f.db.connection(),
            &grid::NewCell {
                hotel: f.seed.hotel,
                room,
                stay_date: d(day),
                reservation: f.reservation,
                rate_plan: None,
                people: 2,
                price: Decimal::from(price),
                billable,
            },
            DoubleBookingPolicy::RejectConfirmed,
            UserId::new(1),
        )
        .unwrap()
    }

    fn add_payment(f: &Fixture, room: RoomId, day: u32, value: i64) {
        bookings::insert_payment(
            f.db.connection(),
            &bookings::NewPayment {
                hotel: f.seed.hotel,
                reservation: f.reservation,
                room,
                pay_date: d(day),
                payer: "Test Client".to_string(),
                value: Decimal::from(value),
                invoice: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_statement_not_found() {
        let db = open_test_database();
        let err = statement(
            db.connection(),
            ReservationId::new(404),
            None,
            None,
            RoundingPolicy::Round,
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_active_cells_and_payments() {
        let f = fixture();
        add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        add_cell(&f, f.seed.rooms[0], 2, 5000, true);
        add_payment(&f, f.seed.rooms[0], 1, 4000);

        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            None,
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.total, Decimal::from(10000));
        assert_eq!(s.paid, Decimal::from(4000));
        assert_eq!(s.balance, Decimal::from(6000));
        assert_eq!(s.period_payable, Decimal::from(6000));
    }

    #[test]
    fn test_non_billable_cells_do_not_charge() {
        let f = fixture();
        add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        add_cell(&f, f.seed.rooms[0], 2, 5000, false);

        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            None,
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.total, Decimal::from(5000));
    }

    #[test]
    fn test_cancelled_billable_cell_charges_cancel_fee_only() {
        let f = fixture();
        let cell = add_cell(&f, f.seed.rooms[0], 1, 5000, true);

        // 5000 retained as cancellation fee, 3000 waived
        for (value, retained) in [(5000i64, true), (3000, false)] {
            grid::insert_rate_line(
                f.db.connection(),
                &grid::NewRateLine {
                    cell,
                    adjustment: AdjustmentType::BaseRate,
                    value: Decimal::from(value),
                    tax_rate: Decimal::from(5),
                    tax_kind: TaxKind::Standard,
                    price: Decimal::from(value),
                    include_in_cancel_fee: retained,
                    sales_category: "lodging".to_string(),
                },
            )
            .unwrap();
        }

        grid::cancel_cell(f.db.connection(), cell, d(1), UserId::new(1)).unwrap();

        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            None,
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.total, Decimal::from(5000));
    }

    #[test]
    fn test_addon_totals_added_to_active_cells() {
        let f = fixture();
        let cell = add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        grid::insert_addon_line(
            f.db.connection(),
            &grid::NewAddonLine {
                cell,
                addon: 7,
                kind: AddonKind::PerNight,
                quantity: 2,
                unit_price: Decimal::from(450),
                tax_rate: Decimal::from(27),
            },
        )
        .unwrap();

        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            None,
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.total, Decimal::from(5900));
    }

    #[test]
    fn test_room_filter() {
        let f = fixture();
        add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        add_cell(&f, f.seed.rooms[1], 1, 7000, true);
        add_payment(&f, f.seed.rooms[0], 1, 1000);
        add_payment(&f, f.seed.rooms[1], 1, 2000);

        let s = statement(
            f.db.connection(),
            f.reservation,
            Some(f.seed.rooms[1]),
            None,
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.total, Decimal::from(7000));
        assert_eq!(s.paid, Decimal::from(2000));
        assert_eq!(s.balance, Decimal::from(5000));
    }

    #[test]
    fn test_period_payable_clamped_to_balance() {
        let f = fixture();
        add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        add_cell(&f, f.seed.rooms[0], 2, 5000, true);
        add_payment(&f, f.seed.rooms[0], 1, 9000);

        // Period covers both nights (10000) but only 1000 is still owed
        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            Some(DateRange::new(d(1), d(3)).unwrap()),
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.balance, Decimal::from(1000));
        assert_eq!(s.period_payable, Decimal::from(1000));
    }

    #[test]
    fn test_period_payable_never_negative() {
        let f = fixture();
        add_cell(&f, f.seed.rooms[0], 1, 5000, true);
        add_payment(&f, f.seed.rooms[0], 1, 8000);

        let s = statement(
            f.db.connection(),
            f.reservation,
            None,
            Some(DateRange::new(d(1), d(2)).unwrap()),
            RoundingPolicy::Round,
        )
        .unwrap();
        assert_eq!(s.balance, Decimal::from(-3000));
        assert_eq!(s.period_payable, Decimal::ZERO);
    }
}
