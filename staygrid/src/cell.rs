//! Occupancy cells and the charge lines attached to them.
//!
//! The cell is the atomic allocation and charge unit: one (reservation,
//! room, date) row. Cancelling a cell is a soft delete - the row is kept,
//! marked, and its cancellation-fee rate lines stay attributable.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::hotel::{id_newtype, HotelId, RoomId};
use crate::reservation::ReservationId;

id_newtype! {
    /// Identifier of an occupancy cell.
    CellId
}

/// One occupied (room, night) belonging to a reservation.
///
/// At most one *active* (non-cancelled) cell may exist per
/// (hotel, room, date); violations are double bookings surfaced by
/// [`crate::audit::scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyCell {
    id: CellId,
    hotel: HotelId,
    room: RoomId,
    stay_date: NaiveDate,
    reservation: ReservationId,
    rate_plan: Option<i64>,
    people: u32,
    price: Decimal,
    billable: bool,
    cancelled_on: Option<NaiveDate>,
}

impl OccupancyCell {
    /// Creates a cell record from its parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: CellId,
        hotel: HotelId,
        room: RoomId,
        stay_date: NaiveDate,
        reservation: ReservationId,
        rate_plan: Option<i64>,
        people: u32,
        price: Decimal,
        billable: bool,
        cancelled_on: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            hotel,
            room,
            stay_date,
            reservation,
            rate_plan,
            people,
            price,
            billable,
            cancelled_on,
        }
    }

    /// Returns the cell id.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Returns the owning hotel.
    #[must_use]
    pub const fn hotel(&self) -> HotelId {
        self.hotel
    }

    /// Returns the room this cell occupies.
    #[must_use]
    pub const fn room(&self) -> RoomId {
        self.room
    }

    /// Returns the occupied night.
    #[must_use]
    pub const fn stay_date(&self) -> NaiveDate {
        self.stay_date
    }

    /// Returns the reservation this cell belongs to.
    #[must_use]
    pub const fn reservation(&self) -> ReservationId {
        self.reservation
    }

    /// Returns the rate plan reference, if any.
    #[must_use]
    pub const fn rate_plan(&self) -> Option<i64> {
        self.rate_plan
    }

    /// Returns the per-night guest count.
    #[must_use]
    pub const fn people(&self) -> u32 {
        self.people
    }

    /// Returns the aggregated rate total for this night.
    ///
    /// Addon totals are not included here; see
    /// [`crate::pricing::CellPrice`].
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Whether this cell's charge counts toward the balance.
    #[must_use]
    pub const fn billable(&self) -> bool {
        self.billable
    }

    /// Returns the soft-cancel date, if the cell has been cancelled.
    #[must_use]
    pub const fn cancelled_on(&self) -> Option<NaiveDate> {
        self.cancelled_on
    }

    /// Whether the cell still occupies inventory.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.cancelled_on.is_none()
    }
}

/// How a rate line adjusts the nightly charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// A base room rate; its value is the price.
    BaseRate,
    /// A percentage of the cell's base-rate sum.
    Percentage,
    /// A fixed surcharge or discount.
    FlatFee,
}

impl AdjustmentType {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseRate => "base_rate",
            Self::Percentage => "percentage",
            Self::FlatFee => "flat_fee",
        }
    }

    /// Parses an adjustment type from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a known type.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "base_rate" => Ok(Self::BaseRate),
            "percentage" => Ok(Self::Percentage),
            "flat_fee" => Ok(Self::FlatFee),
            _ => Err(format!("unknown adjustment type: {s}")),
        }
    }
}

/// Tax treatment of a charge line, independent of its sales category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// Standard rate.
    Standard,
    /// Reduced rate (e.g. lodging tax regimes).
    Reduced,
    /// Tax exempt.
    Exempt,
}

impl TaxKind {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reduced => "reduced",
            Self::Exempt => "exempt",
        }
    }

    /// Parses a tax kind from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a known kind.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "standard" => Ok(Self::Standard),
            "reduced" => Ok(Self::Reduced),
            "exempt" => Ok(Self::Exempt),
            _ => Err(format!("unknown tax kind: {s}")),
        }
    }
}

/// An itemized charge adjustment attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLine {
    /// Line id.
    pub id: i64,
    /// Owning cell.
    pub cell: CellId,
    /// How this line adjusts the charge.
    pub adjustment: AdjustmentType,
    /// Raw value: an amount for base/flat lines, a percentage otherwise.
    pub value: Decimal,
    /// Tax rate applied to this line.
    pub tax_rate: Decimal,
    /// Tax treatment bucket.
    pub tax_kind: TaxKind,
    /// Computed price of the line.
    pub price: Decimal,
    /// Whether the line still charges when the cell is cancelled.
    pub include_in_cancel_fee: bool,
    /// Revenue-reporting category, independent of tax treatment.
    pub sales_category: String,
}

/// What an addon line charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonKind {
    /// Charged for every night of the stay.
    PerNight,
    /// Charged once per stay.
    PerStay,
    /// Parking charge.
    Parking,
}

impl AddonKind {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerNight => "per_night",
            Self::PerStay => "per_stay",
            Self::Parking => "parking",
        }
    }

    /// Parses an addon kind from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a known kind.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "per_night" => Ok(Self::PerNight),
            "per_stay" => Ok(Self::PerStay),
            "parking" => Ok(Self::Parking),
            _ => Err(format!("unknown addon kind: {s}")),
        }
    }
}

/// An itemized extra attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonLine {
    /// Line id.
    pub id: i64,
    /// Owning cell.
    pub cell: CellId,
    /// Addon catalogue reference.
    pub addon: i64,
    /// What the addon charges for.
    pub kind: AddonKind,
    /// Quantity.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// Tax rate applied to this line.
    pub tax_rate: Decimal,
}

impl AddonLine {
    /// Returns the line total (`quantity × unit_price`).
    #[must_use]
    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A payment recorded against (reservation, room, date, payer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: i64,
    /// Owning hotel.
    pub hotel: HotelId,
    /// Reservation the payment settles.
    pub reservation: ReservationId,
    /// Room the payment is attributed to.
    pub room: RoomId,
    /// Date the payment applies to.
    pub pay_date: NaiveDate,
    /// Who paid.
    pub payer: String,
    /// Paid amount.
    pub value: Decimal,
    /// Invoice grouping, if the payment was invoiced.
    pub invoice: Option<i64>,
}
