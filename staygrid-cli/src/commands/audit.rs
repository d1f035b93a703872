//! Audit command implementation.
//!
//! Runs the double-booking scan and reports every conflicted
//! (hotel, room, date) with its reservations. Exits 1 when conflicts
//! exist so scripts and cron jobs can alert on it.

use clap::Args;

use staygrid::audit;
use staygrid::HotelId;

use crate::commands::OutputFormat;
use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions};

/// Scan the grid for double bookings.
#[derive(Args)]
pub struct AuditCommand {
    /// Restrict the scan to one hotel
    #[arg(long, value_name = "HOTEL_ID")]
    pub hotel: Option<i64>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

impl AuditCommand {
    /// Executes the audit command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let report = audit::scan(db.connection(), self.hotel.map(HotelId::new))?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report).map_err(|e| {
                    CliError::Config(format!("cannot serialize audit report: {e}"))
                })?);
            }
            OutputFormat::Text => {
                for conflict in &report {
                    println!(
                        "hotel {} room {} on {}: {} overlapping reservations",
                        conflict.hotel,
                        conflict.room,
                        conflict.stay_date,
                        conflict.conflicts.len()
                    );
                    for stay in &conflict.conflicts {
                        println!(
                            "  reservation {} [{}] {} ({} night(s))",
                            stay.reservation,
                            stay.status,
                            stay.client.as_deref().unwrap_or("-"),
                            stay.nights
                        );
                    }
                }
            }
        }

        if report.is_empty() {
            if !global.quiet {
                eprintln!("no double bookings found");
            }
            Ok(())
        } else {
            Err(CliError::SemanticFailure(format!(
                "{} double-booked (room, date) pair(s) found",
                report.len()
            )))
        }
    }
}
