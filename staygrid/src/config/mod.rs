//! Engine configuration.
//!
//! Configuration is deliberately small: where the store lives, how
//! percentage prices round, and how strictly double bookings are rejected
//! at write time. Everything else the engine needs arrives as explicit
//! call parameters.

mod loader;
mod schema;

pub use loader::{load_config, load_or_default};
pub use schema::{DatabaseSection, DoubleBookingPolicy, EngineConfig};
