use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Log levels in verbosity order; `-v` flags and `OCCASIO_LOG_LEVEL` both index into it.
const LEVELS: [(&str, Level); 5] = [
    ("error", Level::ERROR),
    ("warn", Level::WARN),
    ("info", Level::INFO),
    ("debug", Level::DEBUG),
    ("trace", Level::TRACE),
];

/// Accepts a level name or its position in [`LEVELS`].
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        let level = level.trim().to_lowercase();
        let index = match level.parse::<usize>() {
            Ok(index) => Some(index).filter(|index| *index < LEVELS.len()),
            Err(_) => LEVELS.iter().position(|(name, _)| *name == level),
        };

        index.and_then(|index| u8::try_from(index).ok()).ok_or_else(|| {
            let names: Vec<&str> = LEVELS.iter().map(|(name, _)| *name).collect();
            format!("invalid log level {level:?}, expected one of {}", names.join(", "))
        })
    })
}

/// Level selected on the command line; extra `-v` flags saturate at TRACE.
#[must_use]
pub fn level(matches: &ArgMatches) -> Level {
    let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
    LEVELS
        .get(usize::from(verbosity))
        .map_or(Level::TRACE, |(_, level)| *level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log level, repeat -v to raise it: error, warn, info, debug, trace")
            .env("OCCASIO_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        with_args(Command::new("occasio")).get_matches_from(args)
    }

    #[test]
    fn level_defaults_to_error() {
        temp_env::with_var_unset("OCCASIO_LOG_LEVEL", || {
            assert_eq!(level(&parse(&["occasio"])), Level::ERROR);
        });
    }

    #[test]
    fn level_follows_flag_count_and_saturates() {
        temp_env::with_var_unset("OCCASIO_LOG_LEVEL", || {
            assert_eq!(level(&parse(&["occasio", "-vv"])), Level::INFO);
            assert_eq!(level(&parse(&["occasio", "-vvvvvvv"])), Level::TRACE);
        });
    }

    #[test]
    fn env_accepts_names_and_indexes() {
        let cases = [
            ("DEBUG", Level::DEBUG),
            (" warn ", Level::WARN),
            ("4", Level::TRACE),
        ];
        for (value, expected) in cases {
            temp_env::with_var("OCCASIO_LOG_LEVEL", Some(value), || {
                assert_eq!(level(&parse(&["occasio"])), expected);
            });
        }
    }

    #[test]
    fn env_rejects_unknown_levels() {
        for value in ["verbose", "5"] {
            temp_env::with_var("OCCASIO_LOG_LEVEL", Some(value), || {
                let result = with_args(Command::new("occasio")).try_get_matches_from(["occasio"]);
                assert!(result.is_err());
            });
        }
    }
}
