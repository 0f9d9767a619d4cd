//! Which commands abort on a build error.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The command the process is executing.
///
/// One-shot build commands fail fast on a reported build error; interactive
/// commands log the error and keep running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandContext {
    Build,
    Develop,
    Other(String),
    #[default]
    Unknown,
}

impl CommandContext {
    /// Whether `panic_on_build` terminates the process under this command.
    pub fn terminates_on_build_error(&self) -> bool {
        matches!(self, CommandContext::Build)
    }
}

impl FromStr for CommandContext {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "build" => CommandContext::Build,
            "develop" => CommandContext::Develop,
            "" => CommandContext::Unknown,
            other => CommandContext::Other(other.to_string()),
        })
    }
}

impl fmt::Display for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandContext::Build => write!(f, "build"),
            CommandContext::Develop => write!(f, "develop"),
            CommandContext::Other(name) => write!(f, "{name}"),
            CommandContext::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cases = [
            ("build", CommandContext::Build),
            ("develop", CommandContext::Develop),
            (" build ", CommandContext::Build),
            ("", CommandContext::Unknown),
            ("serve", CommandContext::Other("serve".to_string())),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<CommandContext>().unwrap(), expected);
        }
    }

    #[test]
    fn test_only_build_terminates() {
        assert!(CommandContext::Build.terminates_on_build_error());
        assert!(!CommandContext::Develop.terminates_on_build_error());
        assert!(!CommandContext::Other("serve".into()).terminates_on_build_error());
        assert!(!CommandContext::Unknown.terminates_on_build_error());
    }
}
