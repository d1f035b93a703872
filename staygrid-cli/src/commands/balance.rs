//! Balance command implementation.
//!
//! Shows what a reservation owes: total charges, payments, balance, and
//! the payable amount for an optional period.

use clap::Args;

use staygrid::balance;
use staygrid::calendar::DateRange;
use staygrid::{ReservationId, RoomId};

use crate::commands::OutputFormat;
use crate::error::CliError;
use crate::utils::{load_engine_config, open_database, parse_date, GlobalOptions};

/// Show charges, payments, and balance for a reservation.
#[derive(Args)]
pub struct BalanceCommand {
    /// Reservation to inspect
    #[arg(long, value_name = "RESERVATION_ID")]
    pub reservation: i64,

    /// Restrict to one room
    #[arg(long, value_name = "ROOM_ID")]
    pub room: Option<i64>,

    /// Period start (YYYY-MM-DD); requires --to
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<String>,

    /// Period end, exclusive (YYYY-MM-DD); requires --from
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

impl BalanceCommand {
    /// Executes the balance command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;
        let config = load_engine_config(global)?;

        let period = match (&self.from, &self.to) {
            (Some(from), Some(to)) => {
                let from = parse_date(from, "from")?;
                let to = parse_date(to, "to")?;
                Some(
                    DateRange::new(from, to)
                        .map_err(|e| CliError::InvalidArguments(e.to_string()))?,
                )
            }
            _ => None,
        };

        let statement = balance::statement(
            db.connection(),
            ReservationId::new(self.reservation),
            self.room.map(RoomId::new),
            period,
            config.rounding_policy(),
        )?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&statement).map_err(|e| {
                    CliError::Config(format!("cannot serialize balance statement: {e}"))
                })?);
            }
            OutputFormat::Text => {
                println!("total:          {}", statement.total);
                println!("paid:           {}", statement.paid);
                println!("balance:        {}", statement.balance);
                println!("period payable: {}", statement.period_payable);
            }
        }

        Ok(())
    }
}
