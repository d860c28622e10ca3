//! TriMet data models
//!
//! Typed mirrors of the entities in TriMet web service results: stop
//! locations, routes and their directions, arrivals with vehicle positions,
//! and detours. Member names follow the service's JSON; the service omits
//! empty members, so every field has a default.

use std::fmt;

use chrono::TimeDelta;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::TrimetTime;

/// A stop location
///
/// Appears as the requested stop in arrivals and stop searches, and as the
/// stop list of a route direction in route configurations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Location (stop) id
    #[serde(rename = "locid")]
    pub id: u32,
    /// Public description of the stop
    #[serde(rename = "desc")]
    pub description: String,
    /// Direction of traffic at the stop, e.g. "Southbound"
    #[serde(rename = "dir", skip_serializing_if = "String::is_empty")]
    pub direction: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    #[serde(rename = "lng")]
    pub lon: f64,
    /// Whether the stop is a time point of the route direction
    #[serde(rename = "tp", skip_serializing_if = "is_false")]
    pub time_point: bool,
    /// Stop sequence number within the route direction
    #[serde(rename = "seq", skip_serializing_if = "is_zero")]
    pub sequence: u32,
    /// Routes serving the stop
    #[serde(rename = "route", skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.id)
    }
}

/// Vehicle type of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RouteType {
    /// Bus route
    #[serde(rename = "B")]
    Bus,
    /// Fixed guideway: light rail, streetcar or aerial tram
    #[serde(rename = "R")]
    FixedGuideway,
    /// Any type code the client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl RouteType {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bus => "Bus",
            Self::FixedGuideway => "Rail",
            Self::Unknown => "Transit",
        }
    }
}

/// A route as reported by TransitTracker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    /// Route number
    #[serde(rename = "route")]
    pub id: u32,
    /// Route description, e.g. "12-Barbur/Sandy Blvd"
    #[serde(rename = "desc")]
    pub description: String,
    /// Bus or fixed guideway
    #[serde(rename = "type")]
    pub route_type: RouteType,
    /// Whether a detour is in effect on the route
    #[serde(skip_serializing_if = "is_false")]
    pub detour: bool,
    /// Directions of the route
    #[serde(rename = "dir", skip_serializing_if = "Vec::is_empty")]
    pub directions: Vec<Direction>,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// One direction of a route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Direction {
    /// 0 for outbound, 1 for inbound
    #[serde(rename = "dir")]
    pub number: u8,
    /// Description of the direction, e.g. "To Gateway TC"
    #[serde(rename = "desc")]
    pub description: String,
    /// Stops served in this direction
    #[serde(rename = "stop", skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
}

impl Direction {
    /// Outbound direction number
    pub const OUTBOUND: u8 = 0;
    /// Inbound direction number
    pub const INBOUND: u8 = 1;

    #[must_use]
    pub const fn is_inbound(&self) -> bool {
        self.number == Self::INBOUND
    }

    #[must_use]
    pub const fn is_outbound(&self) -> bool {
        self.number == Self::OUTBOUND
    }

    /// Stops of this direction that are time points
    pub fn time_points(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().filter(|l| l.time_point)
    }
}

/// Service status of an arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalStatus {
    /// Time estimated from vehicle position
    Estimated,
    /// Only the schedule is known
    Scheduled,
    /// Status of service is uncertain
    Delayed,
    /// Arrival was canceled for the day
    Canceled,
    /// Status string the client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl ArrivalStatus {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Estimated => "estimated",
            Self::Scheduled => "scheduled",
            Self::Delayed => "delayed",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reporting condition of a route, set in inclement weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteCondition {
    /// Arrivals are only reported if they can be estimated within the hour
    EstimatedOnly,
    /// No arrivals are reported for the route
    Off,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Reporting status attached to an arrival
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteStatus {
    /// Route number of this status
    pub route: u32,
    /// Most recently reported condition
    pub status: RouteCondition,
}

/// A predicted or scheduled arrival at a stop
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Arrival {
    /// Location id of the stop
    #[serde(rename = "locid")]
    pub location_id: u32,
    /// Block of the vehicle
    pub block: u32,
    /// Route number
    pub route: u32,
    /// Whether the vehicle has begun the trip that reaches the stop
    pub departed: bool,
    /// Whether a detour may affect the arrival
    pub detour: bool,
    /// Route direction, 0 outbound or 1 inbound
    #[serde(rename = "dir")]
    pub direction: u8,
    pub status: ArrivalStatus,
    /// Estimated arrival time; absent when only the schedule is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated: Option<TrimetTime>,
    /// Scheduled (or interpolated) stop time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<TrimetTime>,
    /// Full overhead sign text
    pub full_sign: String,
    /// Short overhead sign text
    pub short_sign: String,
    /// Piece of the block
    #[serde(skip_serializing_if = "String::is_empty")]
    pub piece: String,
    /// Last known vehicle position along its block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_status: Option<RouteStatus>,
}

impl Arrival {
    /// Best known arrival time: the estimate, falling back to the schedule
    #[must_use]
    pub fn expected(&self) -> Option<TrimetTime> {
        self.estimated.or(self.scheduled)
    }

    /// Estimated minus scheduled time, when both are known
    #[must_use]
    pub fn delay(&self) -> Option<TimeDelta> {
        match (self.estimated, self.scheduled) {
            (Some(est), Some(sched)) => Some(*est.as_datetime() - *sched.as_datetime()),
            _ => None,
        }
    }

    /// Whole minutes from `now` until the expected arrival
    #[must_use]
    pub fn minutes_until(&self, now: &TrimetTime) -> Option<i64> {
        self.expected()
            .map(|t| (*t.as_datetime() - *now.as_datetime()).num_minutes())
    }

    /// Sign text, preferring the short form
    #[must_use]
    pub fn sign(&self) -> &str {
        if self.short_sign.is_empty() {
            &self.full_sign
        } else {
            &self.short_sign
        }
    }

    /// Format the delay as " +Nmin" / " -Nmin", empty when on time or unknown
    #[must_use]
    pub fn format_delay(&self) -> String {
        match self.delay().map(|d| d.num_minutes()) {
            Some(mins) if mins > 0 => format!(" +{mins}min"),
            Some(mins) if mins < 0 => format!(" -{}min", mins.unsigned_abs()),
            _ => String::new(),
        }
    }

    /// Format as a compact one-line summary relative to `now`
    #[must_use]
    pub fn format_summary(&self, now: &TrimetTime) -> String {
        let sign = self.sign();
        if self.status == ArrivalStatus::Canceled {
            return format!("{sign}: canceled");
        }

        let Some(expected) = self.expected() else {
            return format!("{sign}: no time available");
        };

        let clock = expected.as_datetime().format("%H:%M");
        let eta = match self.minutes_until(now) {
            Some(mins) if mins <= 0 => "due".to_string(),
            Some(mins) => format!("{mins} min"),
            None => String::new(),
        };
        let delay = self.format_delay();

        format!("{sign}: {clock} ({eta}, {}){delay}", self.status)
    }
}

/// Last reported position of a vehicle along its block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    /// Time the position was reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<TrimetTime>,
    /// Feet between the vehicle and the stop
    pub feet: u32,
    /// Vehicle heading in degrees
    pub heading: u16,
    pub lat: f64,
    #[serde(rename = "lng")]
    pub lon: f64,
    /// Trips the vehicle must traverse to reach the stop
    #[serde(rename = "trip", skip_serializing_if = "Vec::is_empty")]
    pub trips: Vec<Trip>,
    /// Layover between the vehicle position and the arrival
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover: Option<Layover>,
}

/// A layover window
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Layover {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<TrimetTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<TrimetTime>,
}

/// A trip the vehicle runs before arriving at the requested stop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trip {
    /// Trip number
    #[serde(rename = "tripNum", deserialize_with = "string_or_number")]
    pub id: String,
    /// Direction description of the trip
    #[serde(rename = "desc")]
    pub description: String,
    /// Feet to traverse along this trip to reach the stop
    #[serde(rename = "destDist")]
    pub distance: u32,
    #[serde(rename = "dir")]
    pub direction: u8,
    /// Pattern number
    pub pattern: u32,
    /// Feet already traversed along the trip's pattern
    pub progress: u32,
    pub route: u32,
}

/// A detour in effect at query time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Detour {
    /// Detour id; the service has sent it both as a string and a number
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// When the detour began (always in the past)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<TrimetTime>,
    /// When the detour becomes invalid (always in the future)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<TrimetTime>,
    /// Plain text description
    #[serde(rename = "desc")]
    pub description: String,
    /// Phonetic spelling used by the text-to-speech system
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phonetic: String,
    /// Routes the detour applies to
    #[serde(rename = "route", skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Detour {
    /// Whether the detour window contains `at`; missing bounds are open
    #[must_use]
    pub fn is_active_at(&self, at: &TrimetTime) -> bool {
        self.begin.is_none_or(|begin| begin <= *at) && self.end.is_none_or(|end| *at < end)
    }

    /// Whether the detour applies to the given route number
    #[must_use]
    pub fn affects_route(&self, route: u32) -> bool {
        self.routes.iter().any(|r| r.id == route)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Accept an identifier sent either as a JSON string or a JSON number
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer identifier")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
