//! Availability resolution for rooms and parking spots.
//!
//! Room search is a plain ranked query with **no** lock: there is a
//! time-of-check-to-time-of-use gap between "find free room" and "commit
//! reservation", which is why the audit scan exists. The parking claim
//! path is the race-safe exception: candidates are claimed with lock-skip
//! semantics, so two concurrent attempts never receive the same spot and
//! never wait on each other beyond the store's busy timeout.

use rusqlite::{params, Connection, Transaction};

use crate::calendar::DateRange;
use crate::error::{is_constraint_violation, Result};
use crate::hotel::{HotelId, ParkingSpot, Room, UserId};
use crate::reservation::ReservationId;

const FIND_ROOMS: &str = r"
    SELECT id, hotel_id, number, room_type, capacity, smoking, for_sale, assignment_priority
    FROM rooms
    WHERE hotel_id = ?1
      AND for_sale = 1
      AND id NOT IN (
          SELECT room_id FROM occupancy_cells
          WHERE hotel_id = ?1
            AND cancelled_on IS NULL
            AND stay_date >= ?2 AND stay_date < ?3
      )
      AND (?4 IS NULL OR capacity >= ?4)
      AND (?5 IS NULL OR room_type = ?5)
      AND (?6 IS NULL OR smoking = ?6)
    ORDER BY assignment_priority, capacity DESC, id
";

const FIND_PARKING: &str = r"
    SELECT id, hotel_id, label, capacity_units, for_sale, assignment_priority
    FROM parking_spots
    WHERE hotel_id = ?1
      AND for_sale = 1
      AND capacity_units >= ?4
      AND id NOT IN (
          SELECT spot_id FROM parking_occupancy
          WHERE hotel_id = ?1
            AND stay_date >= ?2 AND stay_date < ?3
      )
    ORDER BY assignment_priority, capacity_units DESC, id
";

const INSERT_PARKING_OCCUPANCY: &str = r"
    INSERT INTO parking_occupancy (hotel_id, spot_id, stay_date, reservation_id, created_by)
    VALUES (?, ?, ?, ?, ?)
";

/// Filters for a room search. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct RoomRequirements {
    /// Minimum guest capacity.
    pub min_capacity: Option<u32>,
    /// Exact room type code.
    pub room_type: Option<String>,
    /// Smoking preference.
    pub smoking: Option<bool>,
}

/// Finds rooms free for every night of `range`, ranked for allocation.
///
/// Rooms holding an active cell on any night of the range are excluded;
/// the remainder is filtered to `for_sale` and the requirements, then
/// ordered by `assignment_priority` and descending capacity (best-fit,
/// least-waste).
///
/// This query carries no lock; a concurrent booking may take a returned
/// room before the caller commits.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_rooms(
    conn: &Connection,
    hotel: HotelId,
    range: DateRange,
    requirements: &RoomRequirements,
) -> Result<Vec<Room>> {
    let mut stmt = conn.prepare(FIND_ROOMS)?;
    let rooms = stmt
        .query_map(
            params![
                hotel.value(),
                range.check_in(),
                range.check_out(),
                requirements.min_capacity,
                requirements.room_type,
                requirements.smoking,
            ],
            crate::database::registry::row_to_room,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rooms)
}

/// Finds parking spots free for every night of `range` that offer at
/// least `required_units`, ranked for allocation.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_parking(
    conn: &Connection,
    hotel: HotelId,
    range: DateRange,
    required_units: i64,
) -> Result<Vec<ParkingSpot>> {
    let mut stmt = conn.prepare(FIND_PARKING)?;
    let spots = stmt
        .query_map(
            params![
                hotel.value(),
                range.check_in(),
                range.check_out(),
                required_units,
            ],
            crate::database::registry::row_to_spot,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(spots)
}

/// A parking spot held exclusively by the caller's transaction.
#[derive(Debug, Clone)]
pub struct ParkingClaim {
    /// The claimed spot.
    pub spot: ParkingSpot,
    /// The claimed nights.
    pub range: DateRange,
}

/// Claims one eligible parking spot inside the caller's transaction -
/// the locked variant of the parking search.
///
/// Lock-skip semantics: each candidate is claimed by inserting its
/// occupancy rows under a savepoint; a uniqueness conflict means a
/// competing transaction already took the spot, so the candidate is
/// *skipped* rather than waited on. At most one spot is returned, and it
/// stays held (its rows uncommitted but visible to this transaction)
/// until the caller commits or rolls back.
///
/// Returns `Ok(None)` when no candidate survives - the caller may retry
/// with different criteria.
///
/// # Errors
///
/// Returns an error on store failure; uniqueness conflicts are handled,
/// not surfaced.
pub fn claim_parking_spot(
    tx: &mut Transaction<'_>,
    hotel: HotelId,
    range: DateRange,
    required_units: i64,
    reservation: ReservationId,
    user: UserId,
) -> Result<Option<ParkingClaim>> {
    let candidates = find_parking(tx, hotel, range, required_units)?;

    for spot in candidates {
        let sp = tx.savepoint()?;
        let mut conflicted = false;

        for night in range.iter_nights() {
            let inserted = sp.execute(
                INSERT_PARKING_OCCUPANCY,
                params![
                    hotel.value(),
                    spot.id.value(),
                    night,
                    reservation.value(),
                    user.value(),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(ref e) if is_constraint_violation(e) => {
                    log::debug!("parking spot {} already claimed for {night}, skipping", spot.id);
                    conflicted = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if conflicted {
            // Savepoint drop rolls back the partial claim
            drop(sp);
            continue;
        }

        sp.commit()?;
        return Ok(Some(ParkingClaim { spot, range }));
    }

    Ok(None)
}
