//! TimeUnit - rate / duration / period units

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ContractError;

/// Time unit used for rate conversion, duration conversion and the reporting period.
///
/// Parsed case-insensitively from configuration (`"seconds"`, `"SECONDS"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Nanoseconds in one unit
    pub const fn nanos(self) -> u64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3_600 * 1_000_000_000,
            Self::Days => 86_400 * 1_000_000_000,
        }
    }

    /// `amount` of this unit as a `Duration` (saturating)
    pub fn to_duration(self, amount: u64) -> Duration {
        Duration::from_nanos(amount.saturating_mul(self.nanos()))
    }

    /// Convert an events-per-second rate into events per this unit
    pub fn convert_rate(self, per_second: f64) -> f64 {
        per_second * (self.nanos() as f64 / 1e9)
    }

    /// Convert a duration measured in nanoseconds into this unit
    pub fn convert_duration(self, nanos: f64) -> f64 {
        nanos / self.nanos() as f64
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "NANOSECONDS",
            Self::Microseconds => "MICROSECONDS",
            Self::Milliseconds => "MILLISECONDS",
            Self::Seconds => "SECONDS",
            Self::Minutes => "MINUTES",
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NANOSECONDS" => Ok(Self::Nanoseconds),
            "MICROSECONDS" => Ok(Self::Microseconds),
            "MILLISECONDS" => Ok(Self::Milliseconds),
            "SECONDS" => Ok(Self::Seconds),
            "MINUTES" => Ok(Self::Minutes),
            "HOURS" => Ok(Self::Hours),
            "DAYS" => Ok(Self::Days),
            _ => Err(ContractError::config_parse(format!("unknown time unit '{s}'"))),
        }
    }
}

impl TryFrom<String> for TimeUnit {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeUnit> for String {
    fn from(unit: TimeUnit) -> Self {
        unit.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("seconds".parse::<TimeUnit>().unwrap(), TimeUnit::Seconds);
        assert_eq!(
            "MilliSeconds".parse::<TimeUnit>().unwrap(),
            TimeUnit::Milliseconds
        );
        assert!("fortnights".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(TimeUnit::Minutes.to_duration(2), Duration::from_secs(120));
        assert!((TimeUnit::Minutes.convert_rate(2.0) - 120.0).abs() < 1e-9);
        assert!((TimeUnit::Milliseconds.convert_duration(3_000_000.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        let json = serde_json::to_string(&TimeUnit::Hours).unwrap();
        assert_eq!(json, "\"HOURS\"");
        let unit: TimeUnit = serde_json::from_str("\"days\"").unwrap();
        assert_eq!(unit, TimeUnit::Days);
    }
}
