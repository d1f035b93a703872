//! Hotels, rooms, and the parking resource pool.
//!
//! All entities are scoped by hotel id (the tenant/partition key). Rooms
//! and parking spots are the two allocatable resource pools; both carry an
//! `assignment_priority` used as the allocation tie-break.

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from its raw store value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw store value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype! {
    /// Identifier of a hotel (the tenant/partition key).
    HotelId
}

id_newtype! {
    /// Identifier of a room.
    RoomId
}

id_newtype! {
    /// Identifier of a parking spot.
    SpotId
}

id_newtype! {
    /// Opaque identifier of the acting user, recorded in audit columns.
    ///
    /// The engine has no dependency on how this identity was
    /// authenticated; callers pass whatever their auth layer produced.
    UserId
}

pub(crate) use id_newtype;

/// A sellable room.
///
/// `assignment_priority` orders allocation candidates (lower first);
/// capacity breaks ties descending so the least-wasteful room that still
/// fits is proposed first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room id.
    pub id: RoomId,
    /// Owning hotel.
    pub hotel: HotelId,
    /// Human-facing room number, unique within the hotel.
    pub number: String,
    /// Room type code (e.g. "double", "suite").
    pub room_type: String,
    /// Maximum number of guests.
    pub capacity: u32,
    /// Whether smoking is allowed.
    pub smoking: bool,
    /// Whether the room is currently offered for sale.
    pub for_sale: bool,
    /// Allocation tie-break; lower values are proposed first.
    pub assignment_priority: i64,
}

/// A parking spot, the second allocatable resource pool.
///
/// Spots are allocated by the same pattern as rooms, except that the
/// claim path is race-safe (lock-skip semantics, see
/// [`crate::availability::claim_parking_spot`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Spot id.
    pub id: SpotId,
    /// Owning hotel.
    pub hotel: HotelId,
    /// Human-facing label, unique within the hotel.
    pub label: String,
    /// Size threshold; a spot fits a vehicle when
    /// `capacity_units >= required_units`.
    pub capacity_units: i64,
    /// Whether the spot is currently offered.
    pub for_sale: bool,
    /// Allocation tie-break; lower values are proposed first.
    pub assignment_priority: i64,
}

/// A vehicle category mapping to the units a parking spot must offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCategory {
    /// Category id.
    pub id: i64,
    /// Category name (e.g. "car", "bus").
    pub name: String,
    /// Units a spot must offer to fit this category.
    pub required_units: i64,
}
