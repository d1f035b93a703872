//! Rooms command implementation.
//!
//! Queries ranked room availability for a date range. The listing
//! carries no lock; it is a proposal, not a claim.

use clap::Args;

use staygrid::availability::{find_rooms, RoomRequirements};
use staygrid::HotelId;

use crate::commands::OutputFormat;
use crate::error::CliError;
use crate::utils::{open_database, parse_range, GlobalOptions};

/// Query room availability for a date range.
#[derive(Args)]
pub struct RoomsCommand {
    /// Hotel to search in
    #[arg(long, value_name = "HOTEL_ID")]
    pub hotel: i64,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub check_in: String,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub check_out: String,

    /// Minimum guest capacity
    #[arg(long, value_name = "N")]
    pub capacity: Option<u32>,

    /// Exact room type code
    #[arg(long, value_name = "TYPE")]
    pub room_type: Option<String>,

    /// Require (or forbid) smoking rooms
    #[arg(long, value_name = "BOOL")]
    pub smoking: Option<bool>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

impl RoomsCommand {
    /// Executes the rooms command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let range = parse_range(&self.check_in, &self.check_out)?;

        let requirements = RoomRequirements {
            min_capacity: self.capacity,
            room_type: self.room_type.clone(),
            smoking: self.smoking,
        };
        let rooms = find_rooms(db.connection(), HotelId::new(self.hotel), range, &requirements)?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rooms).map_err(|e| {
                    CliError::Config(format!("cannot serialize room list: {e}"))
                })?);
            }
            OutputFormat::Text => {
                for room in &rooms {
                    println!(
                        "{}\ttype={}\tcapacity={}\tpriority={}",
                        room.number, room.room_type, room.capacity, room.assignment_priority
                    );
                }
                if rooms.is_empty() && !global.quiet {
                    eprintln!("no rooms available for {range}");
                }
            }
        }

        Ok(())
    }
}
