//! Canonical deadline timestamps and their normalization.
//!
//! Deadlines enter the system as ISO-8601 text that may or may not carry a
//! UTC offset. Before a deadline reaches business logic or storage it is
//! normalized into a [`Deadline`]: the same instant expressed in UTC with the
//! offset stripped. Values without an offset are taken to be UTC already.

use super::PlanningDomainError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

/// Accepted layouts for timestamps with a numeric offset, beyond RFC 3339.
const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Accepted layouts for timestamps without an offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A client-supplied timestamp, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineInput {
    /// Timestamp carrying an explicit UTC offset.
    Offset(DateTime<FixedOffset>),
    /// Timestamp without offset information, assumed to be UTC.
    Naive(NaiveDateTime),
}

impl DeadlineInput {
    /// Parses an ISO-8601 timestamp, with or without an offset.
    ///
    /// A bare date is read as midnight of that day.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningDomainError::InvalidDeadline`] when the text matches
    /// none of the accepted layouts.
    pub fn parse(value: &str) -> Result<Self, PlanningDomainError> {
        let trimmed = value.trim();
        if let Some(aware) = parse_with_offset(trimmed) {
            return Ok(Self::Offset(aware));
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        {
            return Ok(Self::Naive(naive));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|date| Self::Naive(date.and_time(NaiveTime::MIN)))
            .map_err(|_| PlanningDomainError::InvalidDeadline(value.to_owned()))
    }
}

/// Parses RFC 3339 and the wider ISO-8601 offset layouts: minutes-only
/// times, compact `+hhmm` offsets and a trailing `Z`.
fn parse_with_offset(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware);
    }
    let explicit = value
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| value.to_owned(), |stem| format!("{stem}+00:00"));
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&explicit, format).ok())
}

impl FromStr for DeadlineInput {
    type Err = PlanningDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl<'de> Deserialize<'de> for DeadlineInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

impl From<DateTime<FixedOffset>> for DeadlineInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Offset(value)
    }
}

impl From<DateTime<Utc>> for DeadlineInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Offset(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for DeadlineInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<Deadline> for DeadlineInput {
    fn from(value: Deadline) -> Self {
        Self::Naive(value.0)
    }
}

/// Canonical deadline: a timezone-naive timestamp in UTC.
///
/// Serializes as ISO-8601 without an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadline(NaiveDateTime);

impl Deadline {
    /// Converts a client timestamp into canonical form.
    ///
    /// Offset-bearing values are shifted to UTC and the offset dropped;
    /// naive values pass through unchanged. Normalizing an already canonical
    /// value is a no-op.
    #[must_use]
    pub fn normalize(input: DeadlineInput) -> Self {
        match input {
            DeadlineInput::Offset(aware) => Self(aware.naive_utc()),
            DeadlineInput::Naive(naive) => Self(naive),
        }
    }

    /// Wraps a naive timestamp that is already expressed in UTC.
    #[must_use]
    pub const fn from_naive_utc(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Returns the naive UTC timestamp.
    #[must_use]
    pub const fn as_naive_utc(self) -> NaiveDateTime {
        self.0
    }

    /// Returns the deadline as an offset-aware UTC timestamp.
    #[must_use]
    pub fn to_utc(self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}

impl From<DeadlineInput> for Deadline {
    fn from(value: DeadlineInput) -> Self {
        Self::normalize(value)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.f"))
    }
}
