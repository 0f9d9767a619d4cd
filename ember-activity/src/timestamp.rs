//! Wall-clock stamps for the activity journal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// When the registry accepted a transition.
///
/// Written as RFC 3339 in UTC with millisecond precision, e.g.
/// `2024-05-01T12:30:00.250Z`, both in the journal JSON and through `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub SystemTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(SystemTime::now())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self(time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_rfc3339_millis(self.0))
    }
}

impl FromStr for Timestamp {
    type Err = humantime::TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        humantime::parse_rfc3339(s).map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_display_truncates_to_millis() {
        let stamp = Timestamp(UNIX_EPOCH + Duration::from_micros(1_250_999));
        assert_eq!(stamp.to_string(), "1970-01-01T00:00:01.250Z");
    }

    #[test]
    fn test_parse() {
        let stamp: Timestamp = "1970-01-01T00:00:02.500Z".parse().unwrap();
        assert_eq!(stamp, Timestamp(UNIX_EPOCH + Duration::from_millis(2500)));
        assert!("yesterday".parse::<Timestamp>().is_err());
    }
}
