//! Map validated CLI matches to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{smtp, store};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let store_opts = store::Options::parse(matches)?;
    let smtp_opts = smtp::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn: store_opts.dsn,
        db_username: store_opts.username,
        db_password: store_opts.password,
        cache_path: store_opts.cache_path,
        smtp_host: smtp_opts.host,
        smtp_port: smtp_opts.port,
        smtp_username: smtp_opts.username,
        smtp_password: smtp_opts.password,
        smtp_from: smtp_opts.from,
    }))
}
