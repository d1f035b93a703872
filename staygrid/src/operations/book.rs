//! Initial booking: creating a reservation in `hold` with its cell set.
//!
//! Callers typically propose rooms with [`crate::availability::find_rooms`]
//! first; there is no lock between proposal and booking (the documented
//! room-path race), but the write-time double-booking policy still
//! applies inside the booking transaction.

use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;

use crate::calendar::DateRange;
use crate::cell::{AddonKind, AdjustmentType, CellId, RateLine, TaxKind};
use crate::config::EngineConfig;
use crate::database::{bookings, grid, Database};
use crate::error::{Error, Result};
use crate::hotel::{HotelId, RoomId, UserId};
use crate::pricing::{rate_total, round_or_not, RoundingPolicy};
use crate::reservation::{
    PaymentTiming, ReservationId, ReservationKind, ReservationStatus,
};

use super::refresh::refresh_reservation;

/// A rate line to be attached to every night of a room booking.
#[derive(Debug, Clone)]
pub struct RateLineSpec {
    /// How the line adjusts the charge.
    pub adjustment: AdjustmentType,
    /// Raw value (amount or percentage).
    pub value: Decimal,
    /// Tax rate.
    pub tax_rate: Decimal,
    /// Tax treatment bucket.
    pub tax_kind: TaxKind,
    /// Whether the line still charges when the cell is cancelled.
    pub include_in_cancel_fee: bool,
    /// Revenue-reporting category.
    pub sales_category: String,
}

/// An addon line to be attached to every night of a room booking.
#[derive(Debug, Clone)]
pub struct AddonSpec {
    /// Addon catalogue reference.
    pub addon: i64,
    /// What the addon charges for.
    pub kind: AddonKind,
    /// Quantity.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax rate.
    pub tax_rate: Decimal,
}

/// One room's part of a booking request.
#[derive(Debug, Clone)]
pub struct RoomBooking {
    /// The room to book.
    pub room: RoomId,
    /// The nights to book.
    pub range: DateRange,
    /// Per-night guest count.
    pub people: u32,
    /// Rate plan reference, if any.
    pub rate_plan: Option<i64>,
    /// Rate lines attached to each night.
    pub rate_lines: Vec<RateLineSpec>,
    /// Addon lines attached to each night.
    pub addons: Vec<AddonSpec>,
}

/// A booking request: one reservation header plus its initial cell set.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Booking client name, if known.
    pub client: Option<String>,
    /// Sales channel.
    pub kind: ReservationKind,
    /// Payment timing.
    pub payment_timing: PaymentTiming,
    /// The rooms and nights to book.
    pub rooms: Vec<RoomBooking>,
    /// Acting user for audit columns.
    pub acting_user: UserId,
}

/// Creates a reservation in `hold` with its initial cells, priced rate
/// lines, and addon lines - one atomic transaction.
///
/// # Errors
///
/// - [`Error::Validation`] for an empty room list
/// - [`Error::ResourceUnavailable`] when the double-booking policy
///   rejects a night
/// - [`Error::Consistency`] / [`Error::Store`] on write failures; the
///   whole transaction rolls back
pub fn book(
    db: &mut Database,
    config: &EngineConfig,
    request: &BookingRequest,
) -> Result<ReservationId> {
    if request.rooms.is_empty() {
        return Err(Error::validation("rooms", "a booking needs at least one room"));
    }

    let policy = config.double_booking_policy();
    let rounding = config.rounding_policy();
    let user = request.acting_user;

    let tx = db
        .connection_mut()
        .transaction_with_behavior(TransactionBehavior::Immediate)?;

    let reservation = bookings::insert_reservation(
        &tx,
        &bookings::NewReservation {
            hotel: request.hotel,
            client: request.client.clone(),
            status: ReservationStatus::Hold,
            kind: request.kind,
            payment_timing: request.payment_timing,
        },
        user,
    )?;

    for room in &request.rooms {
        let priced = price_lines(&room.rate_lines, rounding);
        let night_price = rate_total(&priced, rounding);

        for night in room.range.iter_nights() {
            let cell = grid::insert_cell(
                &tx,
                &grid::NewCell {
                    hotel: request.hotel,
                    room: room.room,
                    stay_date: night,
                    reservation,
                    rate_plan: room.rate_plan,
                    people: room.people,
                    price: night_price,
                    billable: true,
                },
                policy,
                user,
            )?;
            write_lines(&tx, cell, &priced, &room.addons)?;
        }
    }

    refresh_reservation(&tx, reservation, user)?;
    tx.commit()?;

    log::debug!("booked reservation {reservation} with {} room(s)", request.rooms.len());
    Ok(reservation)
}

/// Prices rate line specs individually (percentage lines against the
/// specs' base-rate sum).
fn price_lines(specs: &[RateLineSpec], rounding: RoundingPolicy) -> Vec<RateLine> {
    let base_sum: Decimal = specs
        .iter()
        .filter(|s| s.adjustment == AdjustmentType::BaseRate)
        .map(|s| s.value)
        .sum();

    specs
        .iter()
        .map(|spec| {
            let price = match spec.adjustment {
                AdjustmentType::BaseRate | AdjustmentType::FlatFee => spec.value,
                AdjustmentType::Percentage => {
                    round_or_not(base_sum * spec.value / Decimal::from(100), rounding)
                }
            };
            RateLine {
                id: 0,
                cell: CellId::new(0),
                adjustment: spec.adjustment,
                value: spec.value,
                tax_rate: spec.tax_rate,
                tax_kind: spec.tax_kind,
                price,
                include_in_cancel_fee: spec.include_in_cancel_fee,
                sales_category: spec.sales_category.clone(),
            }
        })
        .collect()
}

/// Persists priced rate lines and addon specs for one cell.
fn write_lines(
    conn: &Connection,
    cell: CellId,
    priced: &[RateLine],
    addons: &[AddonSpec],
) -> Result<()> {
    for line in priced {
        grid::insert_rate_line(
            conn,
            &grid::NewRateLine {
                cell,
                adjustment: line.adjustment,
                value: line.value,
                tax_rate: line.tax_rate,
                tax_kind: line.tax_kind,
                price: line.price,
                include_in_cancel_fee: line.include_in_cancel_fee,
                sales_category: line.sales_category.clone(),
            },
        )?;
    }
    for addon in addons {
        grid::insert_addon_line(
            conn,
            &grid::NewAddonLine {
                cell,
                addon: addon.addon,
                kind: addon.kind,
                quantity: addon.quantity,
                unit_price: addon.unit_price,
                tax_rate: addon.tax_rate,
            },
        )?;
    }
    Ok(())
}

/// Moves a reservation through its status machine.
///
/// # Errors
///
/// - [`Error::NotFound`] for an unknown reservation
/// - [`Error::Validation`] for a transition the status machine forbids
pub fn set_status(
    db: &mut Database,
    reservation: ReservationId,
    status: ReservationStatus,
    user: UserId,
) -> Result<()> {
    let tx = db
        .connection_mut()
        .transaction_with_behavior(TransactionBehavior::Immediate)?;

    let current = bookings::get_reservation(&tx, reservation)?;
    if !current.status().can_transition_to(status) {
        return Err(Error::validation(
            "status",
            format!("cannot move reservation {reservation} from {} to {status}", current.status()),
        ));
    }

    bookings::update_reservation_status(&tx, reservation, status, user)?;
    tx.commit()?;
    Ok(())
}
