//! Time-series point model.

use std::collections::BTreeMap;

/// One point bound for the metrics database.
///
/// `fields` always contains a `"value"` key. A `None` field marks an
/// aggregate that reported no mean; writers omit such fields rather
/// than inventing a number for them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    /// Unix epoch seconds, shared by every point of one cycle.
    pub time: u64,
    pub fields: BTreeMap<String, Option<f64>>,
}

/// Timestamp precision understood by InfluxDB 1.x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl TimePrecision {
    /// Parse the short unit forms used by the HTTP API.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "n" => Some(Self::Nanoseconds),
            "u" => Some(Self::Microseconds),
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            "m" => Some(Self::Minutes),
            "h" => Some(Self::Hours),
            _ => None,
        }
    }

    /// The `precision` query parameter value.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "n",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }

    /// Convert an epoch-seconds timestamp into this precision.
    pub fn from_epoch_secs(&self, secs: u64) -> u64 {
        match self {
            Self::Nanoseconds => secs * 1_000_000_000,
            Self::Microseconds => secs * 1_000_000,
            Self::Milliseconds => secs * 1_000,
            Self::Seconds => secs,
            Self::Minutes => secs / 60,
            Self::Hours => secs / 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_units() {
        assert_eq!(TimePrecision::parse("m"), Some(TimePrecision::Minutes));
        assert_eq!(TimePrecision::parse("ms"), Some(TimePrecision::Milliseconds));
        assert_eq!(TimePrecision::parse(" s "), Some(TimePrecision::Seconds));
        assert_eq!(TimePrecision::parse("d"), None);
    }

    #[test]
    fn epoch_conversion() {
        assert_eq!(TimePrecision::Minutes.from_epoch_secs(180), 3);
        assert_eq!(TimePrecision::Seconds.from_epoch_secs(180), 180);
        assert_eq!(TimePrecision::Milliseconds.from_epoch_secs(2), 2000);
        assert_eq!(TimePrecision::Hours.from_epoch_secs(7200), 2);
    }

    #[test]
    fn unit_round_trips_through_parse() {
        for precision in [
            TimePrecision::Nanoseconds,
            TimePrecision::Microseconds,
            TimePrecision::Milliseconds,
            TimePrecision::Seconds,
            TimePrecision::Minutes,
            TimePrecision::Hours,
        ] {
            assert_eq!(TimePrecision::parse(precision.unit()), Some(precision));
        }
    }
}
