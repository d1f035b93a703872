//! Row access for reference data: hotels, rooms, parking spots, and
//! vehicle categories.
//!
//! These tables are setup data written by back-office surfaces; the
//! engine mostly reads them. All functions take an explicit connection
//! handle so they work equally inside or outside a transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::hotel::{HotelId, ParkingSpot, Room, RoomId, SpotId, VehicleCategory};

const INSERT_HOTEL: &str = "INSERT INTO hotels (name) VALUES (?)";

const INSERT_ROOM: &str = r"
    INSERT INTO rooms (hotel_id, number, room_type, capacity, smoking, for_sale, assignment_priority)
    VALUES (?, ?, ?, ?, ?, ?, ?)
";

const SELECT_ROOM: &str = r"
    SELECT id, hotel_id, number, room_type, capacity, smoking, for_sale, assignment_priority
    FROM rooms
    WHERE id = ?
";

const LIST_ROOMS: &str = r"
    SELECT id, hotel_id, number, room_type, capacity, smoking, for_sale, assignment_priority
    FROM rooms
    WHERE hotel_id = ?
    ORDER BY assignment_priority, number
";

const INSERT_PARKING_SPOT: &str = r"
    INSERT INTO parking_spots (hotel_id, label, capacity_units, for_sale, assignment_priority)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_PARKING_SPOT: &str = r"
    SELECT id, hotel_id, label, capacity_units, for_sale, assignment_priority
    FROM parking_spots
    WHERE id = ?
";

const INSERT_VEHICLE_CATEGORY: &str =
    "INSERT INTO vehicle_categories (name, required_units) VALUES (?, ?)";

const SELECT_VEHICLE_CATEGORY: &str =
    "SELECT id, name, required_units FROM vehicle_categories WHERE id = ?";

/// Maps a rooms row in SELECT column order.
pub(crate) fn row_to_room(row: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: RoomId::new(row.get(0)?),
        hotel: HotelId::new(row.get(1)?),
        number: row.get(2)?,
        room_type: row.get(3)?,
        capacity: row.get(4)?,
        smoking: row.get(5)?,
        for_sale: row.get(6)?,
        assignment_priority: row.get(7)?,
    })
}

/// Maps a parking spots row in SELECT column order.
pub(crate) fn row_to_spot(row: &Row<'_>) -> rusqlite::Result<ParkingSpot> {
    Ok(ParkingSpot {
        id: SpotId::new(row.get(0)?),
        hotel: HotelId::new(row.get(1)?),
        label: row.get(2)?,
        capacity_units: row.get(3)?,
        for_sale: row.get(4)?,
        assignment_priority: row.get(5)?,
    })
}

/// Creates a hotel and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate name).
pub fn insert_hotel(conn: &Connection, name: &str) -> Result<HotelId> {
    conn.execute(INSERT_HOTEL, params![name])?;
    Ok(HotelId::new(conn.last_insert_rowid()))
}

/// Creates a room and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate number within the
/// hotel).
pub fn insert_room(conn: &Connection, room: &NewRoom<'_>) -> Result<RoomId> {
    conn.execute(
        INSERT_ROOM,
        params![
            room.hotel.value(),
            room.number,
            room.room_type,
            room.capacity,
            room.smoking,
            room.for_sale,
            room.assignment_priority,
        ],
    )?;
    Ok(RoomId::new(conn.last_insert_rowid()))
}

/// A room to be created.
#[derive(Debug, Clone)]
pub struct NewRoom<'a> {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Human-facing room number, unique within the hotel.
    pub number: &'a str,
    /// Room type code.
    pub room_type: &'a str,
    /// Maximum number of guests.
    pub capacity: u32,
    /// Whether smoking is allowed.
    pub smoking: bool,
    /// Whether the room is offered for sale.
    pub for_sale: bool,
    /// Allocation tie-break; lower values are proposed first.
    pub assignment_priority: i64,
}

/// Fetches a room by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the room does not exist.
pub fn get_room(conn: &Connection, room: RoomId) -> Result<Room> {
    conn.query_row(SELECT_ROOM, params![room.value()], row_to_room)
        .optional()?
        .ok_or_else(|| Error::not_found(format!("room {room}")))
}

/// Lists a hotel's rooms ordered by assignment priority then number.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_rooms(conn: &Connection, hotel: HotelId) -> Result<Vec<Room>> {
    let mut stmt = conn.prepare(LIST_ROOMS)?;
    let rooms = stmt
        .query_map(params![hotel.value()], row_to_room)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rooms)
}

/// A parking spot to be created.
#[derive(Debug, Clone)]
pub struct NewParkingSpot<'a> {
    /// Owning hotel.
    pub hotel: HotelId,
    /// Human-facing label, unique within the hotel.
    pub label: &'a str,
    /// Size threshold.
    pub capacity_units: i64,
    /// Whether the spot is offered.
    pub for_sale: bool,
    /// Allocation tie-break; lower values are proposed first.
    pub assignment_priority: i64,
}

/// Creates a parking spot and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_parking_spot(conn: &Connection, spot: &NewParkingSpot<'_>) -> Result<SpotId> {
    conn.execute(
        INSERT_PARKING_SPOT,
        params![
            spot.hotel.value(),
            spot.label,
            spot.capacity_units,
            spot.for_sale,
            spot.assignment_priority,
        ],
    )?;
    Ok(SpotId::new(conn.last_insert_rowid()))
}

/// Fetches a parking spot by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the spot does not exist.
pub fn get_parking_spot(conn: &Connection, spot: SpotId) -> Result<ParkingSpot> {
    conn.query_row(SELECT_PARKING_SPOT, params![spot.value()], row_to_spot)
        .optional()?
        .ok_or_else(|| Error::not_found(format!("parking spot {spot}")))
}

/// Creates a vehicle category and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_vehicle_category(conn: &Connection, name: &str, required_units: i64) -> Result<i64> {
    conn.execute(INSERT_VEHICLE_CATEGORY, params![name, required_units])?;
    Ok(conn.last_insert_rowid())
}

/// Fetches a vehicle category by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the category does not exist.
pub fn get_vehicle_category(conn: &Connection, id: i64) -> Result<VehicleCategory> {
    conn.query_row(SELECT_VEHICLE_CATEGORY, params![id], |row| {
        Ok(VehicleCategory {
            id: row.get(0)?,
            name: row.get(1)?,
            required_units: row.get(2)?,
        })
    })
    .optional()?
    .ok_or_else(|| Error::not_found(format!("vehicle category {id}")))
}
