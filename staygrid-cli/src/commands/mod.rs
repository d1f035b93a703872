//! Command implementations.

mod audit;
mod balance;
mod init;
mod rooms;

pub use audit::AuditCommand;
pub use balance::BalanceCommand;
pub use init::InitCommand;
pub use rooms::RoomsCommand;

use clap::ValueEnum;

/// Output format shared by the query commands.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// One JSON document on stdout.
    Json,
}
