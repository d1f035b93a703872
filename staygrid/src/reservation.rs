//! Reservation headers and their lifecycle vocabulary.
//!
//! A reservation is a booking header; its stay window and head count are
//! *derived* from its occupancy cells and recomputed after every
//! structural mutation, never trusted stale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::hotel::{id_newtype, HotelId};

id_newtype! {
    /// Identifier of a reservation.
    ReservationId
}

/// Lifecycle status of a reservation.
///
/// A reservation is created as [`Hold`](Self::Hold); staff actions firm it
/// up; it disappears once its last cell row is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Unconfirmed initial state; inventory overlap may be tolerated here
    /// depending on the configured double-booking policy.
    Hold,
    /// Provisional booking awaiting confirmation.
    Provisory,
    /// Confirmed booking.
    Confirmed,
    /// Guest has arrived.
    CheckedIn,
    /// Guest has departed.
    CheckedOut,
    /// Cancelled; retained while soft-cancelled cells still reference it.
    Cancelled,
    /// Inventory block (maintenance, allotment), not a guest stay.
    Block,
}

impl ReservationStatus {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Provisory => "provisory",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
            Self::Cancelled => "cancelled",
            Self::Block => "block",
        }
    }

    /// Parses a status from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a known status.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "hold" => Ok(Self::Hold),
            "provisory" => Ok(Self::Provisory),
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            "cancelled" => Ok(Self::Cancelled),
            "block" => Ok(Self::Block),
            _ => Err(format!("unknown reservation status: {s}")),
        }
    }

    /// Whether this status is the provisional `hold` state.
    #[must_use]
    pub const fn is_hold(self) -> bool {
        matches!(self, Self::Hold)
    }

    /// Whether the status machine permits moving to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Hold, Self::Provisory | Self::Confirmed | Self::Cancelled)
                | (Self::Provisory, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::CheckedIn | Self::Cancelled)
                | (Self::CheckedIn, Self::CheckedOut)
                | (Self::Block, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales channel of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationKind {
    /// Booked directly at the desk or by phone.
    Direct,
    /// Booked through the hotel's own web booking engine.
    Web,
    /// Pushed by an online travel agency.
    Ota,
    /// Booked by a travel agent with contracted rates.
    Agent,
    /// Employee stay.
    Employee,
}

impl ReservationKind {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Web => "web",
            Self::Ota => "ota",
            Self::Agent => "agent",
            Self::Employee => "employee",
        }
    }

    /// Parses a kind from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a known kind.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "direct" => Ok(Self::Direct),
            "web" => Ok(Self::Web),
            "ota" => Ok(Self::Ota),
            "agent" => Ok(Self::Agent),
            "employee" => Ok(Self::Employee),
            _ => Err(format!("unknown reservation kind: {s}")),
        }
    }
}

/// When payment is expected for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Settled at check-out.
    OnDeparture,
    /// Paid in advance.
    Prepaid,
    /// Invoiced to a contracted partner after the stay.
    Invoiced,
}

impl PaymentTiming {
    /// Returns the stable string form used in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnDeparture => "on_departure",
            Self::Prepaid => "prepaid",
            Self::Invoiced => "invoiced",
        }
    }

    /// Parses a payment timing from its store string form.
    ///
    /// # Errors
    ///
    /// Returns an error message if the string is not a supported value.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "on_departure" => Ok(Self::OnDeparture),
            "prepaid" => Ok(Self::Prepaid),
            "invoiced" => Ok(Self::Invoiced),
            _ => Err(format!("unsupported payment timing: {s}")),
        }
    }
}

/// A booking header.
///
/// `check_in`, `check_out`, and `people` are derived aggregates over the
/// reservation's active cells. The engine recomputes them after every
/// structural mutation; readers must not treat them as authoritative
/// mid-transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    hotel: HotelId,
    client: Option<String>,
    status: ReservationStatus,
    kind: ReservationKind,
    payment_timing: PaymentTiming,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    people: u32,
}

impl Reservation {
    /// Creates a reservation record from its parts.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the client name is provided but
    /// empty after trimming, or if only one of the window bounds is set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ReservationId,
        hotel: HotelId,
        client: Option<String>,
        status: ReservationStatus,
        kind: ReservationKind,
        payment_timing: PaymentTiming,
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
        people: u32,
    ) -> Result<Self, ValidationError> {
        let client = match client {
            Some(c) => {
                let trimmed = c.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError {
                        field: "client".into(),
                        message: "client must be non-empty after trimming whitespace".into(),
                    });
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        if check_in.is_some() != check_out.is_some() {
            return Err(ValidationError {
                field: "window".into(),
                message: "check-in and check-out must be set together".into(),
            });
        }

        Ok(Self {
            id,
            hotel,
            client,
            status,
            kind,
            payment_timing,
            check_in,
            check_out,
            people,
        })
    }

    /// Returns the reservation id.
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the owning hotel.
    #[must_use]
    pub const fn hotel(&self) -> HotelId {
        self.hotel
    }

    /// Returns the booking client name, if any.
    #[must_use]
    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns the sales channel.
    #[must_use]
    pub const fn kind(&self) -> ReservationKind {
        self.kind
    }

    /// Returns the payment timing.
    #[must_use]
    pub const fn payment_timing(&self) -> PaymentTiming {
        self.payment_timing
    }

    /// Returns the derived check-in date, if the reservation has cells.
    #[must_use]
    pub const fn check_in(&self) -> Option<NaiveDate> {
        self.check_in
    }

    /// Returns the derived check-out date, if the reservation has cells.
    #[must_use]
    pub const fn check_out(&self) -> Option<NaiveDate> {
        self.check_out
    }

    /// Returns the derived stay window, if the reservation has cells.
    #[must_use]
    pub fn window(&self) -> Option<DateRange> {
        match (self.check_in, self.check_out) {
            (Some(ci), Some(co)) => DateRange::new(ci, co).ok(),
            _ => None,
        }
    }

    /// Returns the derived head count (maximum per-night aggregate).
    #[must_use]
    pub const fn people(&self) -> u32 {
        self.people
    }
}

/// Error type for validation failures on reservation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::error::Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample(status: ReservationStatus) -> Reservation {
        Reservation::new(
            ReservationId::new(1),
            HotelId::new(1),
            Some("Kovacs Anna".to_string()),
            status,
            ReservationKind::Direct,
            PaymentTiming::OnDeparture,
            Some(d(2024, 6, 1)),
            Some(d(2024, 6, 3)),
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            ReservationStatus::Hold,
            ReservationStatus::Provisory,
            ReservationStatus::Confirmed,
            ReservationStatus::CheckedIn,
            ReservationStatus::CheckedOut,
            ReservationStatus::Cancelled,
            ReservationStatus::Block,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ReservationStatus::parse("waitlist").is_err());
    }

    #[test]
    fn test_kind_and_timing_roundtrip() {
        for kind in [
            ReservationKind::Direct,
            ReservationKind::Web,
            ReservationKind::Ota,
            ReservationKind::Agent,
            ReservationKind::Employee,
        ] {
            assert_eq!(ReservationKind::parse(kind.as_str()).unwrap(), kind);
        }
        for timing in [
            PaymentTiming::OnDeparture,
            PaymentTiming::Prepaid,
            PaymentTiming::Invoiced,
        ] {
            assert_eq!(PaymentTiming::parse(timing.as_str()).unwrap(), timing);
        }
        assert!(PaymentTiming::parse("barter").is_err());
    }

    #[test]
    fn test_status_transitions() {
        use ReservationStatus::{Cancelled, CheckedIn, CheckedOut, Confirmed, Hold, Provisory};

        assert!(Hold.can_transition_to(Confirmed));
        assert!(Hold.can_transition_to(Provisory));
        assert!(Provisory.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(CheckedOut));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!CheckedOut.can_transition_to(Hold));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Hold));
    }

    #[test]
    fn test_reservation_window() {
        let r = sample(ReservationStatus::Confirmed);
        let window = r.window().unwrap();
        assert_eq!(window.nights(), 2);
        assert_eq!(r.people(), 2);
        assert_eq!(r.client(), Some("Kovacs Anna"));
    }

    #[test]
    fn test_reservation_rejects_empty_client() {
        let result = Reservation::new(
            ReservationId::new(1),
            HotelId::new(1),
            Some("   ".to_string()),
            ReservationStatus::Hold,
            ReservationKind::Web,
            PaymentTiming::Prepaid,
            None,
            None,
            0,
        );
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "client");
    }

    #[test]
    fn test_reservation_rejects_half_window() {
        let result = Reservation::new(
            ReservationId::new(1),
            HotelId::new(1),
            None,
            ReservationStatus::Hold,
            ReservationKind::Web,
            PaymentTiming::Prepaid,
            Some(d(2024, 6, 1)),
            None,
            0,
        );
        assert!(result.is_err());
    }

}
