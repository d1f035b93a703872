//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pricing::RoundingPolicy;

/// Write-time double-booking enforcement.
///
/// The per-(hotel, room, date) uniqueness invariant is enforced inside the
/// cell-insert transaction, aware of reservation status. The
/// [`crate::audit`] scan remains the independent after-the-fact check
/// regardless of policy, since `Allow` is selectable and data may predate
/// the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleBookingPolicy {
    /// Never reject; overlaps are only surfaced by the audit scan.
    Allow,
    /// Reject an overlap unless both parties are provisional `hold`
    /// reservations.
    #[default]
    RejectConfirmed,
    /// Reject every overlap, holds included.
    RejectAll,
}

/// Database location settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    /// Path to the database file. Defaults to `<data dir>/staygrid.db`.
    pub path: Option<PathBuf>,
    /// Busy timeout for lock contention, in milliseconds.
    pub busy_timeout_ms: Option<u64>,
}

/// Complete engine configuration.
///
/// # Examples
///
/// ```
/// use staygrid::{DoubleBookingPolicy, EngineConfig};
///
/// let config = EngineConfig::default();
/// assert_eq!(config.double_booking_policy(), DoubleBookingPolicy::RejectConfirmed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Database location settings.
    pub database: Option<DatabaseSection>,

    /// Rounding of percentage rate lines.
    pub rounding: Option<RoundingPolicy>,

    /// Write-time double-booking enforcement.
    pub double_booking: Option<DoubleBookingPolicy>,
}

impl EngineConfig {
    /// Returns the effective rounding policy (default: round).
    #[must_use]
    pub fn rounding_policy(&self) -> RoundingPolicy {
        self.rounding.unwrap_or_default()
    }

    /// Returns the effective double-booking policy
    /// (default: reject unless both sides are holds).
    #[must_use]
    pub fn double_booking_policy(&self) -> DoubleBookingPolicy {
        self.double_booking.unwrap_or_default()
    }
}
