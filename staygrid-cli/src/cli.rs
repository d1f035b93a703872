//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{AuditCommand, BalanceCommand, InitCommand, RoomsCommand};

/// Operational CLI for the staygrid reservation inventory engine.
#[derive(Parser)]
#[command(name = "staygrid")]
#[command(version, about = "Inspect and audit hotel reservation inventory", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "STAYGRID_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create or verify the inventory database
    Init(InitCommand),

    /// Scan the grid for double bookings
    Audit(AuditCommand),

    /// Query room availability for a date range
    Rooms(RoomsCommand),

    /// Show charges, payments, and balance for a reservation
    Balance(BalanceCommand),
}
