//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use staygrid::cell::{AdjustmentType, TaxKind};
use staygrid::database::{bookings, registry, Database, DatabaseConfig};
use staygrid::operations::{book, BookingRequest, RateLineSpec, RoomBooking};
use staygrid::reservation::{PaymentTiming, ReservationId, ReservationKind};
use staygrid::{DateRange, EngineConfig, HotelId, RoomId, UserId};

/// A test database together with the directory keeping it alive.
pub struct TestStore {
    pub db: Database,
    pub dir: TempDir,
}

/// Opens a fresh database in a temporary directory.
pub fn open_store() -> TestStore {
    let dir = TempDir::new().unwrap();
    let db = Database::open(DatabaseConfig::new(dir.path().join("staygrid.db"))).unwrap();
    TestStore { db, dir }
}

/// A seeded hotel with rooms "101", "102", ...
pub struct Fixture {
    pub hotel: HotelId,
    pub rooms: Vec<RoomId>,
}

/// Seeds one hotel with the given number of rooms.
pub fn seed_hotel(db: &Database, rooms: u32) -> Fixture {
    let conn = db.connection();
    let hotel = registry::insert_hotel(conn, "Integration Hotel").unwrap();
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
    Fixture {
        hotel,
        rooms: room_ids,
    }
}

/// June 2024 calendar shorthand.
pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

/// Inclusive-night shorthand: `range(1, 3)` covers nights 1 and 2.
pub fn range(check_in: u32, check_out: u32) -> DateRange {
    DateRange::new(d(check_in), d(check_out)).unwrap()
}

/// One base rate line worth `value`.
pub fn base_rate(value: i64) -> RateLineSpec {
    RateLineSpec {
        adjustment: AdjustmentType::BaseRate,
        value: Decimal::from(value),
        tax_rate: Decimal::from(5),
        tax_kind: TaxKind::Standard,
        include_in_cancel_fee: true,
        sales_category: "lodging".to_string(),
    }
}

/// Books one reservation holding `rooms` over `stay`, 5000 a night each.
pub fn book_rooms(
    db: &mut Database,
    fixture: &Fixture,
    rooms: &[RoomId],
    stay: DateRange,
) -> ReservationId {
    book(
        db,
        &EngineConfig::default(),
        &BookingRequest {
            hotel: fixture.hotel,
            client: Some("Integration Client".to_string()),
            kind: ReservationKind::Direct,
            payment_timing: PaymentTiming::OnDeparture,
            rooms: rooms
                .iter()
                .map(|room| RoomBooking {
                    room: *room,
                    range: stay,
                    people: 2,
                    rate_plan: Some(1),
                    rate_lines: vec![base_rate(5000)],
                    addons: vec![],
                })
                .collect(),
            acting_user: UserId::new(1),
        },
    )
    .unwrap()
}

/// Records a payment against (reservation, room, date).
pub fn pay(
    db: &Database,
    fixture: &Fixture,
    reservation: ReservationId,
    room: RoomId,
    day: u32,
    value: i64,
) {
    bookings::insert_payment(
        db.connection(),
        &bookings::NewPayment {
            hotel: fixture.hotel,
            reservation,
            room,
            pay_date: d(day),
            payer: "Integration Client".to_string(),
            value: Decimal::from(value),
            invoice: None,
        },
    )
    .unwrap();
}
