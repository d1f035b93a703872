//! The split/move/merge engine: relocating occupancy cells between
//! reservations atomically.
//!
//! The two caller-supplied booleans (*full period selected*, *full rooms
//! selected*) are resolved once at the entry point into a [`MoveKind`];
//! each kind has its own deterministic handler. Everything runs inside
//! one `Immediate` transaction; a mutation affecting fewer rows than the
//! input set size is a hard consistency error that rolls the whole
//! operation back.
//!
//! Cell identity is bound to a specific calendar date and cannot be
//! "stretched": a duration-changing move diffs old vs. new date ranges
//! per room - dropped nights are deleted, overlapping nights re-pointed,
//! added nights inserted from a template cell whose client links and
//! addon lines are duplicated onto each new cell. Only a whole move with
//! unchanged duration gets the in-place pure period shift.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use crate::calendar::DateRange;
use crate::cell::{CellId, OccupancyCell};
use crate::config::{DoubleBookingPolicy, EngineConfig};
use crate::continuity::{continuation_nights, effective_window, RoomDayIndex};
use crate::database::{bookings, grid, Database};
use crate::error::{Error, Result};
use crate::hotel::{RoomId, UserId};
use crate::reservation::{Reservation, ReservationId};

use super::refresh::refresh_reservation;

/// The four structural-mutation shapes, resolved once from the request
/// flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Full period and full rooms selected: not a split, no new
    /// reservation. Date changes apply in place.
    WholeMove,
    /// Full period, subset of rooms: the selected rooms split off into
    /// one new reservation.
    RoomSubsetMove,
    /// Full rooms, subset of the period: the selected nights split off
    /// into one new reservation.
    PeriodSubsetMove,
    /// Subset of both: the selection splits off, and its contiguous
    /// continuations form a second new reservation so a still-continuous
    /// stay is never fragmented.
    BothSubsetMove,
}

impl MoveKind {
    /// Resolves the request flags into a move kind.
    #[must_use]
    pub const fn classify(full_period: bool, full_rooms: bool) -> Self {
        match (full_period, full_rooms) {
            (true, true) => Self::WholeMove,
            (true, false) => Self::RoomSubsetMove,
            (false, true) => Self::PeriodSubsetMove,
            (false, false) => Self::BothSubsetMove,
        }
    }
}

/// A structural-mutation request.
#[derive(Debug, Clone)]
pub struct RelocateRequest {
    /// The source reservation.
    pub reservation: ReservationId,
    /// The explicit cell selection to relocate.
    pub cells: Vec<CellId>,
    /// Optional new date range for the relocated cells.
    pub new_range: Option<DateRange>,
    /// Whether the selection covers the reservation's full period.
    pub full_period: bool,
    /// Whether the selection covers all of the reservation's rooms.
    pub full_rooms: bool,
    /// Acting user for audit columns.
    pub acting_user: UserId,
}

/// What a relocate operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateOutcome {
    /// No new reservation was created; the source kept its identity
    /// (covers both the no-op case and in-place date changes).
    Unchanged,
    /// The selection moved to one new reservation.
    Moved {
        /// The new reservation holding the relocated cells.
        reservation: ReservationId,
    },
    /// The selection moved to a new reservation and its contiguous
    /// continuation to a second one.
    SplitContinuation {
        /// The new reservation holding the explicitly selected cells.
        reservation: ReservationId,
        /// The second reservation holding the continuation cells.
        continuation: ReservationId,
    },
}

/// Relocates occupancy cells between reservations - one atomic
/// transaction.
///
/// Concurrent relocates targeting the *same* reservation are an
/// unsupported scenario; callers must serialize them (see the module
/// docs of [`crate::operations`]).
///
/// # Errors
///
/// - [`Error::Validation`] for an empty or duplicated cell selection
/// - [`Error::NotFound`] for an unknown source reservation
/// - [`Error::Consistency`] when the selection spans cells outside the
///   source, or any mutation touches an unexpected row count - the whole
///   transaction rolls back
/// - [`Error::ResourceUnavailable`] when a duration change lands on an
///   occupied night
pub fn relocate(
    db: &mut Database,
    config: &EngineConfig,
    request: &RelocateRequest,
) -> Result<RelocateOutcome> {
    if request.cells.is_empty() {
        return Err(Error::validation("cells", "selection must be non-empty"));
    }

    let policy = config.double_booking_policy();
    let user = request.acting_user;

    let tx = db
        .connection_mut()
        .transaction_with_behavior(TransactionBehavior::Immediate)?;

    let source = bookings::get_reservation(&tx, request.reservation)?;
    let active = grid::active_cells_for_reservation(&tx, request.reservation)?;

    let by_id: BTreeMap<CellId, &OccupancyCell> = active.iter().map(|c| (c.id(), c)).collect();
    let mut selection: Vec<OccupancyCell> = Vec::with_capacity(request.cells.len());
    let mut seen: BTreeSet<CellId> = BTreeSet::new();
    for id in &request.cells {
        if !seen.insert(*id) {
            return Err(Error::validation("cells", format!("cell {id} selected twice")));
        }
        match by_id.get(id) {
            Some(cell) => selection.push((*cell).clone()),
            None => {
                return Err(Error::consistency(format!(
                    "selection spans cell {id} not belonging to reservation {}",
                    request.reservation
                )))
            }
        }
    }

    let kind = MoveKind::classify(request.full_period, request.full_rooms);
    log::debug!(
        "relocate {kind:?} on reservation {}: {} cell(s), new range {:?}",
        request.reservation,
        selection.len(),
        request.new_range
    );

    let outcome = match kind {
        MoveKind::WholeMove => whole_move(&tx, policy, &source, &active, request.new_range, user)?,
        MoveKind::RoomSubsetMove | MoveKind::PeriodSubsetMove => {
            let target = subset_move(&tx, policy, &source, &selection, request.new_range, user)?;
            RelocateOutcome::Moved {
                reservation: target,
            }
        }
        MoveKind::BothSubsetMove => both_subset_move(
            &tx,
            policy,
            &source,
            &active,
            &selection,
            request.new_range,
            user,
        )?,
    };

    tx.commit()?;
    Ok(outcome)
}

/// Whole move: no new reservation. Dates unchanged is a no-op; same
/// duration is a pure period shift; otherwise the per-room date diff
/// applies against the source itself.
fn whole_move(
    conn: &Connection,
    policy: DoubleBookingPolicy,
    source: &Reservation,
    active: &[OccupancyCell],
    new_range: Option<DateRange>,
    user: UserId,
) -> Result<RelocateOutcome> {
    let Some(new_range) = new_range else {
        return Ok(RelocateOutcome::Unchanged);
    };

    let dates: Vec<NaiveDate> = active.iter().map(OccupancyCell::stay_date).collect();
    let current = effective_window(&dates).ok_or_else(|| {
        Error::consistency(format!("reservation {} has no active cells", source.id()))
    })?;

    if new_range == current {
        return Ok(RelocateOutcome::Unchanged);
    }

    if new_range.nights() == current.nights() {
        // Pure period shift: cell identity and reservation id unchanged
        let delta = current.delta_to(&new_range);
        let shifted = grid::shift_reservation_dates(conn, source.id(), delta, user)?;
        if shifted != active.len() {
            return Err(Error::consistency(format!(
                "period shift for reservation {} moved {shifted} cells, expected {}",
                source.id(),
                active.len()
            )));
        }
    } else {
        for cells in group_by_room(active).values() {
            date_diff_move(conn, policy, cells, new_range, source.id(), user)?;
        }
    }

    refresh_reservation(conn, source.id(), user)?;
    Ok(RelocateOutcome::Unchanged)
}

/// Subset move: one new reservation receives the selection.
fn subset_move(
    conn: &Connection,
    policy: DoubleBookingPolicy,
    source: &Reservation,
    selection: &[OccupancyCell],
    new_range: Option<DateRange>,
    user: UserId,
) -> Result<ReservationId> {
    let target = clone_header(conn, source, user)?;
    move_cells_to(conn, policy, selection, new_range, target, user)?;
    migrate_payments(conn, source.id(), selection, target)?;

    refresh_reservation(conn, source.id(), user)?;
    refresh_reservation(conn, target, user)?;
    Ok(target)
}

/// Double-subset move: the selection splits off, and whatever the
/// continuity closure reaches beyond it forms a second reservation.
fn both_subset_move(
    conn: &Connection,
    policy: DoubleBookingPolicy,
    source: &Reservation,
    active: &[OccupancyCell],
    selection: &[OccupancyCell],
    new_range: Option<DateRange>,
    user: UserId,
) -> Result<RelocateOutcome> {
    let index = RoomDayIndex::from_nights(active.iter().map(|c| (c.room(), c.stay_date())));
    let selected_nights: Vec<(RoomId, NaiveDate)> = selection
        .iter()
        .map(|c| (c.room(), c.stay_date()))
        .collect();
    let continuation: BTreeSet<(RoomId, NaiveDate)> =
        continuation_nights(&index, &selected_nights).into_iter().collect();
    let continuation_cells: Vec<OccupancyCell> = active
        .iter()
        .filter(|c| continuation.contains(&(c.room(), c.stay_date())))
        .cloned()
        .collect();

    let target = clone_header(conn, source, user)?;
    move_cells_to(conn, policy, selection, new_range, target, user)?;
    migrate_payments(conn, source.id(), selection, target)?;

    if continuation_cells.is_empty() {
        refresh_reservation(conn, source.id(), user)?;
        refresh_reservation(conn, target, user)?;
        return Ok(RelocateOutcome::Moved {
            reservation: target,
        });
    }

    log::debug!(
        "continuation of {} cell(s) follows the split off reservation {}",
        continuation_cells.len(),
        source.id()
    );

    // The continuation keeps its dates; it only changes owner
    let continuation_res = clone_header(conn, source, user)?;
    let ids: Vec<CellId> = continuation_cells.iter().map(OccupancyCell::id).collect();
    grid::repoint_cells(conn, &ids, continuation_res, user)?;
    migrate_payments(conn, source.id(), &continuation_cells, continuation_res)?;

    refresh_reservation(conn, source.id(), user)?;
    refresh_reservation(conn, target, user)?;
    refresh_reservation(conn, continuation_res, user)?;

    Ok(RelocateOutcome::SplitContinuation {
        reservation: target,
        continuation: continuation_res,
    })
}

/// Copies a source header into a fresh reservation (same client, status,
/// channel, payment timing; empty derived fields).
fn clone_header(conn: &Connection, source: &Reservation, user: UserId) -> Result<ReservationId> {
    bookings::insert_reservation(
        conn,
        &bookings::NewReservation {
            hotel: source.hotel(),
            client: source.client().map(str::to_string),
            status: source.status(),
            kind: source.kind(),
            payment_timing: source.payment_timing(),
        },
        user,
    )
}

/// Relocates the selection per room: a plain re-point when the dates
/// stay, the date-diff procedure when a new range is given.
fn move_cells_to(
    conn: &Connection,
    policy: DoubleBookingPolicy,
    selection: &[OccupancyCell],
    new_range: Option<DateRange>,
    target: ReservationId,
    user: UserId,
) -> Result<()> {
    for cells in group_by_room(selection).values() {
        match new_range {
            None => {
                let ids: Vec<CellId> = cells.iter().map(OccupancyCell::id).collect();
                grid::repoint_cells(conn, &ids, target, user)?;
            }
            Some(range) => date_diff_move(conn, policy, cells, range, target, user)?,
        }
    }
    Ok(())
}

/// The duration-changing procedure for one room's cells.
///
/// Diffs the room's current night set against `new_range`: dropped
/// nights are deleted (with their lines), overlapping nights re-pointed
/// at `target`, added nights inserted from the room's earliest cell as a
/// template, duplicating its client links and addon lines.
fn date_diff_move(
    conn: &Connection,
    policy: DoubleBookingPolicy,
    room_cells: &[OccupancyCell],
    new_range: DateRange,
    target: ReservationId,
    user: UserId,
) -> Result<()> {
    let template = room_cells.first().ok_or_else(|| {
        Error::consistency("date-diff move invoked with an empty room selection".to_string())
    })?;

    let new_dates: BTreeSet<NaiveDate> = new_range.iter_nights().collect();
    let old_dates: BTreeSet<NaiveDate> =
        room_cells.iter().map(OccupancyCell::stay_date).collect();

    let dropped: Vec<CellId> = room_cells
        .iter()
        .filter(|c| !new_dates.contains(&c.stay_date()))
        .map(OccupancyCell::id)
        .collect();
    let overlapping: Vec<CellId> = room_cells
        .iter()
        .filter(|c| new_dates.contains(&c.stay_date()) && c.reservation() != target)
        .map(OccupancyCell::id)
        .collect();

    // Added nights are templated while the template row still exists;
    // the template itself may be one of the dropped nights
    for night in new_dates.difference(&old_dates) {
        let id = grid::insert_cell(
            conn,
            &grid::NewCell {
                hotel: template.hotel(),
                room: template.room(),
                stay_date: *night,
                reservation: target,
                rate_plan: template.rate_plan(),
                people: template.people(),
                price: template.price(),
                billable: template.billable(),
            },
            policy,
            user,
        )?;
        grid::copy_cell_clients(conn, template.id(), id)?;
        grid::copy_addon_lines(conn, template.id(), id)?;
    }

    if !overlapping.is_empty() {
        grid::repoint_cells(conn, &overlapping, target, user)?;
    }
    if !dropped.is_empty() {
        grid::delete_cells(conn, &dropped)?;
    }

    Ok(())
}

/// Applies the payment-migration rule for each room the moved cells
/// touch: a room the source no longer holds any cell of hands over all
/// its payments; otherwise only payments dated inside the moved
/// sub-range follow.
fn migrate_payments(
    conn: &Connection,
    source: ReservationId,
    moved: &[OccupancyCell],
    target: ReservationId,
) -> Result<()> {
    for (room, cells) in &group_by_room(moved) {
        let remaining = grid::count_room_cells(conn, source, *room)?;
        let migrated = if remaining == 0 {
            bookings::move_room_payments_all(conn, source, *room, target)?
        } else {
            let dates: Vec<NaiveDate> = cells.iter().map(OccupancyCell::stay_date).collect();
            let sub_range = effective_window(&dates).ok_or_else(|| {
                Error::consistency("payment migration invoked with an empty night set".to_string())
            })?;
            bookings::move_room_payments_in_range(conn, source, *room, target, sub_range)?
        };
        if migrated > 0 {
            log::debug!(
                "moved {migrated} payment(s) for room {room} from reservation {source} to {target}"
            );
        }
    }
    Ok(())
}

/// Groups cells per room, each room's cells ordered by night.
fn group_by_room(cells: &[OccupancyCell]) -> BTreeMap<RoomId, Vec<OccupancyCell>> {
    let mut map: BTreeMap<RoomId, Vec<OccupancyCell>> = BTreeMap::new();
    for cell in cells {
        map.entry(cell.room()).or_default().push(cell.clone());
    }
    for cells in map.values_mut() {
        cells.sort_by_key(OccupancyCell::stay_date);
    }
    map
}
