use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Parse the command line, install logging and resolve the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be initialized or the arguments do
/// not describe a runnable server.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(commands::logging::level(&matches))?;

    dispatch::handler(&matches)
}
