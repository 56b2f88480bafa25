use crate::api::email::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_USERNAME: &str = "smtp-username";
pub const ARG_SMTP_PASSWORD: &str = "smtp-password";
pub const ARG_SMTP_FROM: &str = "smtp-from";

#[derive(Debug)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            host: matches
                .get_one::<String>(ARG_SMTP_HOST)
                .cloned()
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: matches
                .get_one::<u16>(ARG_SMTP_PORT)
                .copied()
                .unwrap_or(DEFAULT_SMTP_PORT),
            username: matches.get_one::<String>(ARG_SMTP_USERNAME).cloned(),
            password: matches
                .get_one::<String>(ARG_SMTP_PASSWORD)
                .cloned()
                .map(SecretString::from),
            from: matches.get_one::<String>(ARG_SMTP_FROM).cloned(),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host (STARTTLS)")
                .env("OCCASIO_SMTP_HOST")
                .default_value(DEFAULT_SMTP_HOST),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port")
                .env("OCCASIO_SMTP_PORT")
                .default_value("587")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_USERNAME)
                .long(ARG_SMTP_USERNAME)
                .help("SMTP login; without it OTP emails are only logged")
                .env("OCCASIO_SMTP_USERNAME")
                .requires(ARG_SMTP_PASSWORD),
        )
        .arg(
            Arg::new(ARG_SMTP_PASSWORD)
                .long(ARG_SMTP_PASSWORD)
                .help("SMTP password")
                .env("OCCASIO_SMTP_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_SMTP_USERNAME),
        )
        .arg(
            Arg::new(ARG_SMTP_FROM)
                .long(ARG_SMTP_FROM)
                .help("Sender address (default: the SMTP username)")
                .env("OCCASIO_SMTP_FROM"),
        )
}
