//! Engine operations: booking, cancellation, and structural mutation.
//!
//! Every operation here runs as exactly one `Immediate` transaction:
//! BEGIN, all writes, derived-field refresh, COMMIT. Any step affecting
//! fewer rows than its input set size raises
//! [`crate::Error::Consistency`] and the whole transaction rolls back -
//! nothing is partially applied. Mutating operations are never
//! automatically retried.
//!
//! Concurrent structural mutation of the *same* reservation is an
//! unsupported scenario: operations targeting one reservation must be
//! serialized by the caller (e.g. UI-level single-flight per
//! reservation). Concurrency across different reservations is coordinated
//! by the store alone.

mod book;
mod cancel;
mod refresh;
mod relocate;

pub use book::{book, set_status, AddonSpec, BookingRequest, RateLineSpec, RoomBooking};
pub use cancel::{cancel, CancelOptions, CancelOutcome};
pub use refresh::{refresh_reservation, RefreshOutcome};
pub use relocate::{relocate, MoveKind, RelocateOutcome, RelocateRequest};
