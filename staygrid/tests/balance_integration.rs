//! Balance coverage over full engine flows: booking, addons,
//! cancellation fees, and partial-period payables.

mod common;

use common::{base_rate, d, open_store, pay, range, seed_hotel};
use rust_decimal::Decimal;

use staygrid::balance;
use staygrid::cell::AddonKind;
use staygrid::operations::{
    book, cancel, AddonSpec, BookingRequest, CancelOptions, RoomBooking,
};
use staygrid::pricing::RoundingPolicy;
use staygrid::reservation::{PaymentTiming, ReservationKind};
use staygrid::{DateRange, EngineConfig, UserId};

#[test]
fn booked_stay_with_addons_balances_against_payments() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 1);

    // 2 nights at 5000 + a 450 breakfast per night
    let reservation = book(
        &mut store.db,
        &EngineConfig::default(),
        &BookingRequest {
            hotel: fixture.hotel,
            client: Some("Balance Client".to_string()),
            kind: ReservationKind::Direct,
            payment_timing: PaymentTiming::OnDeparture,
            rooms: vec![RoomBooking {
                room: fixture.rooms[0],
                range: range(1, 3),
                people: 2,
                rate_plan: Some(1),
                rate_lines: vec![base_rate(5000)],
                addons: vec![AddonSpec {
                    addon: 7,
                    kind: AddonKind::PerNight,
                    quantity: 1,
                    unit_price: Decimal::from(450),
                    tax_rate: Decimal::from(27),
                }],
            }],
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    pay(&store.db, &fixture, reservation, fixture.rooms[0], 1, 6000);

    let statement = balance::statement(
        store.db.connection(),
        reservation,
        None,
        None,
        RoundingPolicy::Round,
    )
    .unwrap();
    assert_eq!(statement.total, Decimal::from(10_900));
    assert_eq!(statement.paid, Decimal::from(6000));
    assert_eq!(statement.balance, Decimal::from(4900));
}

#[test]
fn cancellation_keeps_only_retained_fees_in_the_balance() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 1);

    // The 5000 base is retained as a cancellation fee; the 1000 flat
    // service fee is waived on cancel
    let mut waived = base_rate(1000);
    waived.adjustment = staygrid::cell::AdjustmentType::FlatFee;
    waived.include_in_cancel_fee = false;

    let reservation = book(
        &mut store.db,
        &EngineConfig::default(),
        &BookingRequest {
            hotel: fixture.hotel,
            client: None,
            kind: ReservationKind::Web,
            payment_timing: PaymentTiming::Prepaid,
            rooms: vec![RoomBooking {
                room: fixture.rooms[0],
                range: range(1, 3),
                people: 2,
                rate_plan: None,
                rate_lines: vec![base_rate(5000), waived],
                addons: vec![],
            }],
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    // Before cancel: (5000 + 1000) × 2 nights
    let before = balance::statement(
        store.db.connection(),
        reservation,
        None,
        None,
        RoundingPolicy::Round,
    )
    .unwrap();
    assert_eq!(before.total, Decimal::from(12_000));

    let outcome = cancel(
        &mut store.db,
        &CancelOptions {
            reservation,
            room: None,
            range: None,
            cancelled_on: d(1),
            acting_user: UserId::new(1),
        },
    )
    .unwrap();
    assert!(outcome.reservation_cancelled);

    // After cancel only the retained base survives, per night
    let after = balance::statement(
        store.db.connection(),
        reservation,
        None,
        None,
        RoundingPolicy::Round,
    )
    .unwrap();
    assert_eq!(after.total, Decimal::from(10_000));
}

#[test]
fn period_payable_supports_partial_bulk_payment() {
    let mut store = open_store();
    let fixture = seed_hotel(&store.db, 1);

    let reservation = book(
        &mut store.db,
        &EngineConfig::default(),
        &BookingRequest {
            hotel: fixture.hotel,
            client: None,
            kind: ReservationKind::Agent,
            payment_timing: PaymentTiming::Invoiced,
            rooms: vec![RoomBooking {
                room: fixture.rooms[0],
                range: range(1, 5),
                people: 1,
                rate_plan: None,
                rate_lines: vec![base_rate(5000)],
                addons: vec![],
            }],
            acting_user: UserId::new(1),
        },
    )
    .unwrap();

    // A bulk payment action covering only the first two nights
    let first_two = DateRange::new(d(1), d(3)).unwrap();
    let statement = balance::statement(
        store.db.connection(),
        reservation,
        None,
        Some(first_two),
        RoundingPolicy::Round,
    )
    .unwrap();
    assert_eq!(statement.total, Decimal::from(20_000));
    assert_eq!(statement.period_payable, Decimal::from(10_000));

    // Once most of the stay is paid, the period payable clamps to what
    // is still owed
    pay(&store.db, &fixture, reservation, fixture.rooms[0], 1, 19_000);
    let statement = balance::statement(
        store.db.connection(),
        reservation,
        None,
        Some(first_two),
        RoundingPolicy::Round,
    )
    .unwrap();
    assert_eq!(statement.balance, Decimal::from(1000));
    assert_eq!(statement.period_payable, Decimal::from(1000));
}
