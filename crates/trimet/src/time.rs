//! TriMet timestamps
//!
//! The web services emit timestamps such as `2014-01-19T12:00:00.000-0800`:
//! ISO-8601-like, but with a colon-less offset and no `Z`/`T` separation
//! between the seconds and the zone, so RFC 3339 parsers reject them. Newer
//! service versions send epoch milliseconds instead. [`TrimetTime`] accepts
//! both and always presents the instant in Pacific time.

use std::fmt;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Zone used by the service for every timestamp
pub const SERVICE_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const SERVICE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Errors produced while interpreting a TriMet timestamp
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeParseError {
    /// Input was empty
    #[error("empty timestamp")]
    Empty,

    /// Input did not match the service format
    #[error("malformed timestamp: {0}")]
    Malformed(String),

    /// Wall-clock time falls into a daylight-saving gap
    #[error("local time {0} does not exist in America/Los_Angeles")]
    NonexistentLocalTime(String),

    /// Epoch value cannot be represented
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// An instant reported by the TriMet services, held in Pacific time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrimetTime(DateTime<Tz>);

impl TrimetTime {
    /// Wrap an instant, converting it to the service zone
    #[must_use]
    pub fn new<Z: TimeZone>(instant: DateTime<Z>) -> Self {
        Self(instant.with_timezone(&SERVICE_TIMEZONE))
    }

    /// Parse a service timestamp
    ///
    /// An explicit `±HHMM` offset pins the instant. Without one, the
    /// wall-clock time is read in Pacific time and the earlier instant wins
    /// when the clock is ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`TimeParseError`] for empty or malformed input and for wall
    /// clock times that do not exist in Pacific time.
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        if input.trim().is_empty() {
            return Err(TimeParseError::Empty);
        }
        if input.trim() != input {
            return Err(TimeParseError::Malformed(input.to_string()));
        }

        if let Ok(fixed) = DateTime::<FixedOffset>::parse_from_str(input, OFFSET_FORMAT) {
            // chrono also takes `-08:00` for `%z`
            if !has_compact_offset(input) {
                return Err(TimeParseError::Malformed(input.to_string()));
            }
            return Ok(Self::new(fixed));
        }

        let naive = NaiveDateTime::parse_from_str(input, NAIVE_FORMAT)
            .map_err(|_| TimeParseError::Malformed(input.to_string()))?;
        Self::from_local(naive)
    }

    /// Build from a wall-clock time in the service zone
    ///
    /// # Errors
    ///
    /// Returns [`TimeParseError::NonexistentLocalTime`] inside a DST gap.
    pub fn from_local(naive: NaiveDateTime) -> Result<Self, TimeParseError> {
        match SERVICE_TIMEZONE.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(Self(dt)),
            LocalResult::None => Err(TimeParseError::NonexistentLocalTime(naive.to_string())),
        }
    }

    /// Build from milliseconds since the Unix epoch
    ///
    /// # Errors
    ///
    /// Returns [`TimeParseError::OutOfRange`] if chrono cannot represent it.
    pub fn from_millis(millis: i64) -> Result<Self, TimeParseError> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Self::new)
            .ok_or(TimeParseError::OutOfRange(millis))
    }

    /// The instant in Pacific time
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Tz> {
        &self.0
    }

    /// The instant in UTC
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Milliseconds since the Unix epoch
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

/// Whether the input ends in a colon-less `±HHMM` offset
fn has_compact_offset(input: &str) -> bool {
    input
        .len()
        .checked_sub(5)
        .and_then(|start| input.get(start..))
        .is_some_and(|tail| {
            let mut chars = tail.chars();
            matches!(chars.next(), Some('+' | '-')) && chars.all(|c| c.is_ascii_digit())
        })
}

impl From<DateTime<Tz>> for TrimetTime {
    fn from(value: DateTime<Tz>) -> Self {
        Self::new(value)
    }
}

impl From<DateTime<Utc>> for TrimetTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value)
    }
}

impl std::str::FromStr for TrimetTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TrimetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SERVICE_FORMAT))
    }
}

impl Serialize for TrimetTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TrimetTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TrimetTimeVisitor)
    }
}

struct TrimetTimeVisitor;

impl Visitor<'_> for TrimetTimeVisitor {
    type Value = TrimetTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a TriMet timestamp string or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        TrimetTime::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        TrimetTime::from_millis(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let millis = i64::try_from(v).map_err(|_| E::custom(TimeParseError::OutOfRange(i64::MAX)))?;
        self.visit_i64(millis)
    }
}
