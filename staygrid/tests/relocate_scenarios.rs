//! End-to-end scenarios for the split/move/merge engine.
//!
//! Each test drives the public `relocate` entry point against a real
//! database file and checks both the structural outcome and the derived
//! reservation fields.

mod common;

use common::{book_rooms, d, open_store, pay, range, seed_hotel};

use staygrid::balance;
use staygrid::database::{bookings, grid};
use staygrid::operations::{relocate, RelocateOutcome, RelocateRequest};
use staygrid::pricing::RoundingPolicy;
use staygrid::{CellId, EngineConfig, ReservationId, UserId};

fn cell_ids(db: &staygrid::Database, reservation: ReservationId) -> Vec<CellId> {
    grid::active_cells_for_reservation(db.connection(), reservation)
        .unwrap()
        .iter()
        .map(staygrid::OccupancyCell::id)
        .collect()
}

/// Splitting one of two rooms (partial rooms, full period)
/// produces a new reservation holding exactly that room's cells, the
/// source recomputes its window over the remaining room, and the moved
/// room's payments follow.
#[test]
fn room_subset_split_moves_cells_and_payments() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 2);
    let stay = range(1, 3);

    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0], fixture.rooms[1]], stay);
    pay(&store.db, &fixture, r1, fixture.rooms[0], 1, 4000);
    pay(&store.db, &fixture, r1, fixture.rooms[1], 1, 2000);

    let selection: Vec<CellId> = grid::active_cells_for_reservation(store.db.connection(), r1)
        .unwrap()
        .iter()
        .filter(|c| c.room() == fixture.rooms[0])
        .map(staygrid::OccupancyCell::id)
        .collect();
    assert_eq!(selection.len(), 2);

    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: None,
            full_period: true,
            full_rooms: false,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    let RelocateOutcome::Moved { reservation: r2 } = outcome else {
        panic!("expected a single new reservation, got {outcome:?}");
    };

    let conn = store.db.connection();

    // R2 holds exactly room 101's two cells
    let moved = grid::active_cells_for_reservation(conn, r2).unwrap();
    assert_eq!(moved.len(), 2);
    assert!(moved.iter().all(|c| c.room() == fixture.rooms[0]));

    // R1 retains room 102 with its window recomputed, not trusted stale
    let retained = grid::active_cells_for_reservation(conn, r1).unwrap();
    assert_eq!(retained.len(), 2);
    assert!(retained.iter().all(|c| c.room() == fixture.rooms[1]));
    let header = bookings::get_reservation(conn, r1).unwrap();
    assert_eq!(header.check_in(), Some(d(1)));
    assert_eq!(header.check_out(), Some(d(3)));

    // All of room 101's payments migrated (zero cells left for it in R1)
    assert!(bookings::payments_for(conn, r1, Some(fixture.rooms[0]))
        .unwrap()
        .is_empty());
    assert_eq!(
        bookings::payments_for(conn, r2, Some(fixture.rooms[0]))
            .unwrap()
            .len(),
        1
    );
    // Room 102's payment stayed put
    assert_eq!(
        bookings::payments_for(conn, r1, Some(fixture.rooms[1]))
            .unwrap()
            .len(),
        1
    );
}

/// Moving the tail nights of a single room (partial period,
/// full rooms) splits the stay in two; the source's check-out recomputes
/// to the split point.
#[test]
fn period_subset_split_recomputes_checkout() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 1);

    // Room 101 booked 06-01..06-05 (4 cells)
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0]], range(1, 5));

    let selection: Vec<CellId> = grid::active_cells_for_reservation(store.db.connection(), r1)
        .unwrap()
        .iter()
        .filter(|c| c.stay_date() >= d(3))
        .map(staygrid::OccupancyCell::id)
        .collect();
    assert_eq!(selection.len(), 2);

    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: None,
            full_period: false,
            full_rooms: true,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    let RelocateOutcome::Moved { reservation: r2 } = outcome else {
        panic!("expected a single new reservation, got {outcome:?}");
    };

    let conn = store.db.connection();
    assert_eq!(grid::active_cells_for_reservation(conn, r2).unwrap().len(), 2);
    assert_eq!(grid::active_cells_for_reservation(conn, r1).unwrap().len(), 2);

    let source = bookings::get_reservation(conn, r1).unwrap();
    assert_eq!(source.check_out(), Some(d(3)));
    let target = bookings::get_reservation(conn, r2).unwrap();
    assert_eq!(target.check_in(), Some(d(3)));
    assert_eq!(target.check_out(), Some(d(5)));
}

/// A pure period shift translates every cell by the day
/// delta in place - same rows, same reservation id, no new reservation.
#[test]
fn pure_period_shift_translates_dates() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 1);
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0]], range(1, 3));

    let before = cell_ids(&store.db, r1);
    assert_eq!(before.len(), 2);

    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: before.clone(),
            new_range: Some(range(5, 7)),
            full_period: true,
            full_rooms: true,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();
    assert_eq!(outcome, RelocateOutcome::Unchanged);

    let conn = store.db.connection();
    let cells = grid::active_cells_for_reservation(conn, r1).unwrap();
    assert_eq!(cells.len(), 2);
    // Same cell rows, dates shifted by exactly +4 days
    assert_eq!(
        cells.iter().map(staygrid::OccupancyCell::id).collect::<Vec<_>>(),
        before
    );
    assert_eq!(cells[0].stay_date(), d(5));
    assert_eq!(cells[1].stay_date(), d(6));

    let header = bookings::get_reservation(conn, r1).unwrap();
    assert_eq!(header.check_in(), Some(d(5)));
    assert_eq!(header.check_out(), Some(d(7)));
}

/// Boundary: a selection covering 100% of cells and rooms with unchanged
/// dates is a whole move - "unchanged", creating nothing.
#[test]
fn whole_move_returns_unchanged_and_creates_nothing() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 2);
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0], fixture.rooms[1]], range(1, 3));

    let cells = cell_ids(&store.db, r1);
    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells,
            new_range: Some(range(1, 3)),
            full_period: true,
            full_rooms: true,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();
    assert_eq!(outcome, RelocateOutcome::Unchanged);

    let count: i64 = store
        .db
        .connection()
        .query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

/// Round trip: relocating a room's cells onto their existing check-in
/// leaves price totals and the date range unchanged.
#[test]
fn noop_subset_move_preserves_totals_and_range() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 2);
    let stay = range(1, 3);
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0], fixture.rooms[1]], stay);

    let total_before = balance::statement(
        store.db.connection(),
        r1,
        None,
        None,
        RoundingPolicy::Round,
    )
    .unwrap()
    .total;

    let selection: Vec<CellId> = grid::active_cells_for_reservation(store.db.connection(), r1)
        .unwrap()
        .iter()
        .filter(|c| c.room() == fixture.rooms[0])
        .map(staygrid::OccupancyCell::id)
        .collect();

    // newCheckIn == check_in: the date diff degenerates to a re-point
    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: Some(stay),
            full_period: true,
            full_rooms: false,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();
    let RelocateOutcome::Moved { reservation: r2 } = outcome else {
        panic!("expected a single new reservation, got {outcome:?}");
    };

    let conn = store.db.connection();
    let rounding = RoundingPolicy::Round;
    let total_after = balance::statement(conn, r1, None, None, rounding).unwrap().total
        + balance::statement(conn, r2, None, None, rounding).unwrap().total;
    assert_eq!(total_before, total_after);

    for id in [r1, r2] {
        let header = bookings::get_reservation(conn, id).unwrap();
        assert_eq!(header.check_in(), Some(d(1)));
        assert_eq!(header.check_out(), Some(d(3)));
    }
}

/// Double-subset split: the explicitly selected cells split off, and the
/// stay's overnight continuation into another room follows into a second
/// reservation instead of being stranded.
#[test]
fn double_subset_split_carries_continuation() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 3);

    // One logical stay: room 101 nights 1-2, then room 102 nights 3-4;
    // room 103 is a separate, disconnected stay on night 10
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0]], range(1, 3));
    {
        // Attach 102's continuation and 103's island to the same header
        let conn = store.db.connection();
        for (room, day) in [(1usize, 3), (1, 4), (2, 10)] {
            grid::insert_cell(
                conn,
                &grid::NewCell {
                    hotel: fixture.hotel,
                    room: fixture.rooms[room],
                    stay_date: d(day),
                    reservation: r1,
                    rate_plan: Some(1),
                    people: 2,
                    price: rust_decimal::Decimal::from(5000),
                    billable: true,
                },
                staygrid::DoubleBookingPolicy::RejectConfirmed,
                UserId::new(1),
            )
            .unwrap();
        }
        staygrid::operations::refresh_reservation(conn, r1, UserId::new(1)).unwrap();
    }

    let selection: Vec<CellId> = grid::active_cells_for_reservation(store.db.connection(), r1)
        .unwrap()
        .iter()
        .filter(|c| c.room() == fixture.rooms[0])
        .map(staygrid::OccupancyCell::id)
        .collect();
    assert_eq!(selection.len(), 2);

    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: None,
            full_period: false,
            full_rooms: false,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    let RelocateOutcome::SplitContinuation {
        reservation: r2,
        continuation: r3,
    } = outcome
    else {
        panic!("expected a continuation split, got {outcome:?}");
    };

    let conn = store.db.connection();

    // R2: the explicit selection (room 101)
    let moved = grid::active_cells_for_reservation(conn, r2).unwrap();
    assert!(moved.iter().all(|c| c.room() == fixture.rooms[0]));
    assert_eq!(moved.len(), 2);

    // R3: the overnight continuation (room 102), dates untouched
    let continuation = grid::active_cells_for_reservation(conn, r3).unwrap();
    assert!(continuation.iter().all(|c| c.room() == fixture.rooms[1]));
    assert_eq!(continuation.len(), 2);
    assert_eq!(continuation[0].stay_date(), d(3));

    // The original keeps the disconnected stay (room 103)
    let remaining = grid::active_cells_for_reservation(conn, r1).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].room(), fixture.rooms[2]);
    let header = bookings::get_reservation(conn, r1).unwrap();
    assert_eq!(header.check_in(), Some(d(10)));
    assert_eq!(header.check_out(), Some(d(11)));
}

/// A duration-changing subset move: the selection relocates onto a
/// different, longer range; dropped nights disappear, added nights are
/// templated.
#[test]
fn subset_move_with_new_range_applies_date_diff() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 2);
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0], fixture.rooms[1]], range(1, 3));

    let selection: Vec<CellId> = grid::active_cells_for_reservation(store.db.connection(), r1)
        .unwrap()
        .iter()
        .filter(|c| c.room() == fixture.rooms[0])
        .map(staygrid::OccupancyCell::id)
        .collect();

    // Room 101 moves from nights {1,2} to nights {2,3,4}
    let outcome = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: Some(range(2, 5)),
            full_period: true,
            full_rooms: false,
            acting_user: UserId::new(1),
        },
    )
    .unwrap();
    let RelocateOutcome::Moved { reservation: r2 } = outcome else {
        panic!("expected a single new reservation, got {outcome:?}");
    };

    let conn = store.db.connection();
    let moved = grid::active_cells_for_reservation(conn, r2).unwrap();
    let dates: Vec<_> = moved.iter().map(staygrid::OccupancyCell::stay_date).collect();
    assert_eq!(dates, vec![d(2), d(3), d(4)]);
    // Added nights inherit the template's pricing
    assert!(moved
        .iter()
        .all(|c| c.price() == rust_decimal::Decimal::from(5000)));

    let header = bookings::get_reservation(conn, r2).unwrap();
    assert_eq!(header.check_in(), Some(d(2)));
    assert_eq!(header.check_out(), Some(d(5)));
}

/// Consistency: a selection containing a cell from another reservation
/// aborts with nothing applied.
#[test]
fn foreign_selection_rolls_back_everything() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 2);
    let r1 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[0]], range(1, 3));
    let r2 = book_rooms(&mut store.db, &fixture, &[fixture.rooms[1]], range(1, 3));

    let mut selection = cell_ids(&store.db, r1);
    selection.push(cell_ids(&store.db, r2)[0]);

    let err = relocate(
        &mut store.db,
        &EngineConfig::default(),
        &RelocateRequest {
            reservation: r1,
            cells: selection,
            new_range: None,
            full_period: true,
            full_rooms: false,
            acting_user: UserId::new(1),
        },
    )
    .unwrap_err();
    assert!(err.is_consistency());

    // Both reservations untouched
    let conn = store.db.connection();
    assert_eq!(grid::active_cells_for_reservation(conn, r1).unwrap().len(), 2);
    assert_eq!(grid::active_cells_for_reservation(conn, r2).unwrap().len(), 2);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}
