use crate::store::cache::DEFAULT_CACHE_PATH;
use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_USERNAME: &str = "db-username";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_CACHE_PATH: &str = "cache-path";

#[derive(Debug)]
pub struct Options {
    pub dsn: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub cache_path: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the DSN is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .context("missing required argument: --dsn")?;

        Ok(Self {
            dsn,
            username: matches.get_one::<String>(ARG_DB_USERNAME).cloned(),
            password: matches
                .get_one::<String>(ARG_DB_PASSWORD)
                .cloned()
                .map(SecretString::from),
            cache_path: matches
                .get_one::<String>(ARG_CACHE_PATH)
                .cloned()
                .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "Database connection string. When --db-username/--db-password are set they replace the credentials in the DSN.",
                )
                .env("OCCASIO_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_USERNAME)
                .long(ARG_DB_USERNAME)
                .help("Database username injected into the DSN")
                .env("OCCASIO_DB_USERNAME"),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password injected into the DSN")
                .env("OCCASIO_DB_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_CACHE_PATH)
                .long(ARG_CACHE_PATH)
                .help("Local JSON file mirrored from the user store")
                .env("OCCASIO_CACHE_PATH")
                .default_value(DEFAULT_CACHE_PATH),
        )
}
