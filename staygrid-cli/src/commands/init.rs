//! Init command implementation.
//!
//! Creates the inventory database (schema included) or verifies an
//! existing one, then prints its location.

use clap::Args;

use staygrid::database::resolve_database_path;

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions};

/// Create or verify the inventory database.
#[derive(Args)]
pub struct InitCommand {}

impl InitCommand {
    /// Executes the init command.
    pub fn execute(&self, global: &GlobalOptions) -> Result<(), CliError> {
        // Opening runs schema initialization / compatibility checks
        let _db = open_database(global)?;
        let path = resolve_database_path(global.data_dir.as_deref())?;

        if !global.quiet {
            println!("{}", path.display());
        }
        Ok(())
    }
}
