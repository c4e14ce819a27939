use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

/// Wire format of every timestamp in the ledger.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A wall-clock instant in UTC with whole-second precision.
///
/// Serialized as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Truncates sub-second precision so that a value survives a round trip unchanged.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::from_naive(instant.naive_utc())
    }

    pub fn from_naive(naive: NaiveDateTime) -> Self {
        Self(naive.with_nanosecond(0).unwrap_or(naive))
    }

    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map(Self)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_matches_wire() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let ts = Timestamp::from_utc(at);
        assert_eq!(ts.to_string(), "2024-03-09 07:05:01");
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2024-03-09 07:05:01\""
        );
    }

    #[test]
    fn test_subseconds_are_dropped() {
        let at = Utc.timestamp_opt(1_700_000_000, 999_000_000).unwrap();
        let ts = Timestamp::from_utc(at);
        assert_eq!(Timestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn test_rejects_other_formats() {
        assert!(serde_json::from_str::<Timestamp>("\"2024-03-09T07:05:01Z\"").is_err());
    }
}
