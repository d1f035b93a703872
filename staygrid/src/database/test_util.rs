//! Shared test utilities for database unit tests.
//!
//! Helper functions used across multiple database and engine test
//! modules.

use rusqlite::Connection;

use crate::database::{Database, DatabaseConfig};
use crate::database::{bookings, registry};
use crate::hotel::{HotelId, RoomId, UserId};
use crate::reservation::{PaymentTiming, ReservationId, ReservationKind, ReservationStatus};

/// A seeded hotel with a handful of rooms, for tests.
#[derive(Debug)]
pub struct SeededHotel {
    /// The hotel id.
    pub hotel: HotelId,
    /// Room ids, in insertion order (numbers "101", "102", ...).
    pub rooms: Vec<RoomId>,
}

/// Creates a temporary test database that will be cleaned up
/// automatically.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
/// This is acceptable in test code where we want to fail fast.
#[must_use]
pub fn open_test_database() -> Database {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = DatabaseConfig::new(path);
    let db = Database::open(config).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

/// Seeds one hotel with `rooms` rooms numbered from "101".
///
/// # Panics
///
/// Panics on any store error; acceptable in test code.
#[must_use]
pub fn seed_hotel_with_rooms(conn: &Connection, rooms: u32) -> SeededHotel {
    let hotel = registry::insert_hotel(conn, "Test Hotel").unwrap();
    let mut room_ids = Vec::new();
    for i in 0..rooms {
        let number = format!("{}", 101 + i);
        let id = registry::insert_room(
            conn,
            &registry::NewRoom {
                hotel,
                number: &number,
                room_type: "double",
                capacity: 2,
                smoking: false,
                for_sale: true,
                assignment_priority: i64::from(i),
            },
        )
        .unwrap();
        room_ids.push(id);
    }
    SeededHotel {
        hotel,
        rooms: room_ids,
    }
}

/// Seeds an empty reservation header in the given status.
///
/// # Panics
///
/// Panics on any store error; acceptable in test code.
#[must_use]
pub fn seed_reservation(
    conn: &Connection,
    seed: &SeededHotel,
    status: ReservationStatus,
) -> ReservationId {
    bookings::insert_reservation(
        conn,
        &bookings::NewReservation {
            hotel: seed.hotel,
            client: Some("Test Client".to_string()),
            status,
            kind: ReservationKind::Direct,
            payment_timing: PaymentTiming::OnDeparture,
        },
        UserId::new(1),
    )
    .unwrap()
}
