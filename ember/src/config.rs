use std::env;

use crate::policy::CommandContext;

/// Environment variable selecting the log level; `verbose` enables verbose output.
pub const LOG_LEVEL_ENV: &str = "EMBER_LOG_LEVEL";
/// Environment variable naming the command being executed.
pub const EXECUTING_COMMAND_ENV: &str = "EMBER_EXECUTING_COMMAND";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterConfig {
    pub verbose: bool,
    pub no_color: bool,
    pub command: CommandContext,
}

impl ReporterConfig {
    /// Read the configuration from `EMBER_LOG_LEVEL`, `EMBER_EXECUTING_COMMAND` and `NO_COLOR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let command = lookup(EXECUTING_COMMAND_ENV)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        Self {
            verbose: lookup(LOG_LEVEL_ENV).is_some_and(|level| is_verbose_level(&level)),
            no_color: lookup("NO_COLOR").is_some_and(|value| !value.is_empty()),
            command,
        }
    }
}

pub(crate) fn is_verbose_level(level: &str) -> bool {
    level.eq_ignore_ascii_case("verbose")
}
