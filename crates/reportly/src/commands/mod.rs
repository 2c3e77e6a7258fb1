//! Command dispatch: bridges CLI args -> data-access services -> output formatting.

pub mod config_cmd;
pub mod resource;
pub mod util;

use reportly_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the handler for its resource.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::CoverTypes(args) => {
            resource::handle(session.cover_types(), args, "cover-types", global).await
        }
        Command::UnitCategories(args) => {
            resource::handle(session.unit_categories(), args, "unit-categories", global).await
        }
        Command::Units(args) => resource::handle(session.units(), args, "units", global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
