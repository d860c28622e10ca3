//! Request parameter objects
//!
//! Each request type serializes to the query parameters of one service
//! endpoint. The client adds the application id and `json=true` itself, so
//! these types only carry what is specific to the call. Lists are sent
//! comma-separated; flags and optional values are left out when unset.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::error::TrimetError;
use crate::response::{ArrivalsResponse, DetoursResponse, RouteConfigResponse, StopsResponse};

/// Largest number of location ids an arrivals request may carry
pub const MAX_LOCATION_IDS: usize = 10;

/// Service endpoint a request type is sent to, and the result it decodes to
pub trait Endpoint {
    /// Path relative to the base URL, without a leading slash
    const ENDPOINT: &'static str;

    /// Body of the `resultSet` the endpoint answers with
    type Response: DeserializeOwned + Send;
}

/// Local validation performed before a request is sent
pub trait Validate {
    /// Check the request parameters
    ///
    /// # Errors
    ///
    /// Returns [`TrimetError::InvalidRequest`] describing the first problem.
    fn validate(&self) -> Result<(), TrimetError>;
}

/// Next arrivals at one or more stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrivalsRequest {
    /// Location ids to report arrivals for (1 to 10)
    #[serde(rename = "locIDs", serialize_with = "comma_separated")]
    pub location_ids: Vec<u32>,

    /// Include NextBus predictions for stops served by Portland Streetcar
    #[serde(skip_serializing_if = "is_false")]
    pub streetcar: bool,
}

impl ArrivalsRequest {
    #[must_use]
    pub fn new(location_ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            location_ids: location_ids.into_iter().collect(),
            streetcar: false,
        }
    }

    /// Also report Portland Streetcar arrivals
    #[must_use]
    pub const fn with_streetcar(mut self) -> Self {
        self.streetcar = true;
        self
    }
}

impl Endpoint for ArrivalsRequest {
    const ENDPOINT: &'static str = "arrivals";

    type Response = ArrivalsResponse;
}

impl Validate for ArrivalsRequest {
    fn validate(&self) -> Result<(), TrimetError> {
        if self.location_ids.is_empty() {
            return Err(TrimetError::InvalidRequest(
                "at least one location id is required".to_string(),
            ));
        }
        if self.location_ids.len() > MAX_LOCATION_IDS {
            return Err(TrimetError::InvalidRequest(format!(
                "at most {MAX_LOCATION_IDS} location ids may be requested, got {}",
                self.location_ids.len()
            )));
        }
        Ok(())
    }
}

/// Detours currently in effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetoursRequest {
    /// Restrict to these route numbers; empty means every detour
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "comma_separated"
    )]
    pub routes: Vec<u32>,
}

impl DetoursRequest {
    #[must_use]
    pub fn for_routes(routes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }
}

impl Endpoint for DetoursRequest {
    const ENDPOINT: &'static str = "detours";

    type Response = DetoursResponse;
}

impl Validate for DetoursRequest {
    fn validate(&self) -> Result<(), TrimetError> {
        Ok(())
    }
}

/// Which route directions a route configuration should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectionFilter {
    #[serde(rename = "0")]
    Outbound,
    #[serde(rename = "1")]
    Inbound,
    #[serde(rename = "true")]
    Both,
}

impl FromStr for DirectionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "outbound" => Ok(Self::Outbound),
            "1" | "inbound" => Ok(Self::Inbound),
            "true" | "yes" | "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown direction '{other}' (expected outbound, inbound or both)"
            )),
        }
    }
}

impl fmt::Display for DirectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
            Self::Both => "both",
        })
    }
}

/// Routes from the active schedule, optionally with directions and stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteConfigRequest {
    /// Restrict to these route numbers; empty means every route
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "comma_separated"
    )]
    pub routes: Vec<u32>,

    /// Include direction elements for the selected directions
    #[serde(rename = "dir", skip_serializing_if = "Option::is_none")]
    pub direction: Option<DirectionFilter>,

    /// Include every stop under each direction
    #[serde(skip_serializing_if = "is_false")]
    pub stops: bool,

    /// Include only time-point stops under each direction
    #[serde(rename = "tp", skip_serializing_if = "is_false")]
    pub time_points: bool,

    /// Lowest stop sequence number to include
    #[serde(rename = "startSeq", skip_serializing_if = "Option::is_none")]
    pub start_sequence: Option<u32>,

    /// Highest stop sequence number to include
    #[serde(rename = "endSeq", skip_serializing_if = "Option::is_none")]
    pub end_sequence: Option<u32>,
}

impl RouteConfigRequest {
    #[must_use]
    pub fn with_routes(mut self, routes: impl IntoIterator<Item = u32>) -> Self {
        self.routes = routes.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_direction(mut self, direction: DirectionFilter) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub const fn with_stops(mut self) -> Self {
        self.stops = true;
        self
    }

    #[must_use]
    pub const fn with_time_points(mut self) -> Self {
        self.time_points = true;
        self
    }

    /// Limit stop lists to sequence numbers within `start..=end`
    #[must_use]
    pub const fn with_sequence_range(mut self, start: u32, end: u32) -> Self {
        self.start_sequence = Some(start);
        self.end_sequence = Some(end);
        self
    }
}

impl Endpoint for RouteConfigRequest {
    const ENDPOINT: &'static str = "routeConfig";

    type Response = RouteConfigResponse;
}

impl Validate for RouteConfigRequest {
    fn validate(&self) -> Result<(), TrimetError> {
        if let (Some(start), Some(end)) = (self.start_sequence, self.end_sequence) {
            if start > end {
                return Err(TrimetError::InvalidRequest(format!(
                    "startSeq {start} is greater than endSeq {end}"
                )));
            }
        }
        Ok(())
    }
}

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    fn check(&self) -> Result<(), TrimetError> {
        if !(-180.0..=180.0).contains(&self.lon) || !(-90.0..=90.0).contains(&self.lat) {
            return Err(TrimetError::InvalidRequest(format!(
                "coordinates out of range: lon {}, lat {}",
                self.lon, self.lat
            )));
        }
        Ok(())
    }
}

/// Sent as `lon,lat`
impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{},{}", self.lon, self.lat))
    }
}

/// Search area bounded by its lower-left and upper-right corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    fn check(&self) -> Result<(), TrimetError> {
        GeoPoint::new(self.lon_min, self.lat_min).check()?;
        GeoPoint::new(self.lon_max, self.lat_max).check()?;
        if self.lon_min > self.lon_max || self.lat_min > self.lat_max {
            return Err(TrimetError::InvalidRequest(
                "bounding box minimum corner must be below and left of the maximum".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sent as `lonmin,latmin,lonmax,latmax`
impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!(
            "{},{},{},{}",
            self.lon_min, self.lat_min, self.lon_max, self.lat_max
        ))
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bounding box '{s}': {e}"))?;

        match values.as_slice() {
            [lon_min, lat_min, lon_max, lat_max] => {
                Ok(Self::new(*lon_min, *lat_min, *lon_max, *lat_max))
            },
            _ => Err(format!(
                "invalid bounding box '{s}': expected lonmin,latmin,lonmax,latmax"
            )),
        }
    }
}

/// Stops inside a bounding box or within a radius of a point
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StopsRequest {
    #[serde(rename = "bbox", skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,

    /// Center of a radius search
    #[serde(rename = "ll", skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,

    /// Search radius in feet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet: Option<u32>,

    /// Search radius in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meters: Option<u32>,

    /// Include the routes serving each stop
    #[serde(rename = "showRoutes", skip_serializing_if = "is_false")]
    pub show_routes: bool,

    /// Include route directions serving each stop
    #[serde(rename = "showRouteDirs", skip_serializing_if = "is_false")]
    pub show_route_directions: bool,
}

impl StopsRequest {
    /// Stops inside `bounding_box`
    #[must_use]
    pub fn in_box(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box: Some(bounding_box),
            ..Self::default()
        }
    }

    /// Stops within `feet` of a point
    #[must_use]
    pub fn within_feet(center: GeoPoint, feet: u32) -> Self {
        Self {
            center: Some(center),
            feet: Some(feet),
            ..Self::default()
        }
    }

    /// Stops within `meters` of a point
    #[must_use]
    pub fn within_meters(center: GeoPoint, meters: u32) -> Self {
        Self {
            center: Some(center),
            meters: Some(meters),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_routes(mut self) -> Self {
        self.show_routes = true;
        self
    }

    /// Include route directions; implies routes
    #[must_use]
    pub const fn with_route_directions(mut self) -> Self {
        self.show_route_directions = true;
        self
    }
}

impl Endpoint for StopsRequest {
    const ENDPOINT: &'static str = "stops";

    type Response = StopsResponse;
}

impl Validate for StopsRequest {
    fn validate(&self) -> Result<(), TrimetError> {
        match (&self.bounding_box, &self.center) {
            (Some(_), Some(_)) => Err(TrimetError::InvalidRequest(
                "use either a bounding box or a center point, not both".to_string(),
            )),
            (None, None) => Err(TrimetError::InvalidRequest(
                "a bounding box or a center point is required".to_string(),
            )),
            (Some(bbox), None) => {
                if self.feet.is_some() || self.meters.is_some() {
                    return Err(TrimetError::InvalidRequest(
                        "a search radius only applies to a center point".to_string(),
                    ));
                }
                bbox.check()
            },
            (None, Some(center)) => {
                center.check()?;
                match (self.feet, self.meters) {
                    (Some(_), Some(_)) => Err(TrimetError::InvalidRequest(
                        "give the search radius in feet or meters, not both".to_string(),
                    )),
                    (None, None) => Err(TrimetError::InvalidRequest(
                        "a search radius in feet or meters is required".to_string(),
                    )),
                    _ => Ok(()),
                }
            },
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

fn comma_separated<T, S>(values: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_arrivals_params() {
        let req = ArrivalsRequest::new([8989, 7787]).with_streetcar();
        let params = serde_json::to_value(&req).unwrap();
        assert_eq!(params, json!({ "locIDs": "8989,7787", "streetcar": true }));

        let req = ArrivalsRequest::new([8989]);
        let params = serde_json::to_value(&req).unwrap();
        assert_eq!(params, json!({ "locIDs": "8989" }));
    }

    #[test]
    fn test_arrivals_validation() {
        assert!(ArrivalsRequest::new([8989]).validate().is_ok());
        assert!(ArrivalsRequest::new(1..=10).validate().is_ok());

        let err = ArrivalsRequest::default().validate().unwrap_err();
        assert!(matches!(err, TrimetError::InvalidRequest(_)));

        let err = ArrivalsRequest::new(1..=11).validate().unwrap_err();
        assert!(err.to_string().contains("11"));
    }

    #[test]
    fn test_detours_params() {
        let params = serde_json::to_value(DetoursRequest::for_routes([12, 15])).unwrap();
        assert_eq!(params, json!({ "routes": "12,15" }));

        let params = serde_json::to_value(DetoursRequest::default()).unwrap();
        assert_eq!(params, json!({}));
        assert!(DetoursRequest::default().validate().is_ok());
    }

    #[test]
    fn test_route_config_params() {
        let req = RouteConfigRequest::default()
            .with_routes([193])
            .with_time_points();
        let params = serde_json::to_value(&req).unwrap();
        assert_eq!(params, json!({ "routes": "193", "tp": true }));

        let req = RouteConfigRequest::default()
            .with_direction(DirectionFilter::Both)
            .with_stops()
            .with_sequence_range(100, 500);
        let params = serde_json::to_value(&req).unwrap();
        assert_eq!(
            params,
            json!({ "dir": "true", "stops": true, "startSeq": 100, "endSeq": 500 })
        );
    }

    #[test]
    fn test_route_config_validation() {
        assert!(RouteConfigRequest::default().validate().is_ok());
        let req = RouteConfigRequest::default().with_sequence_range(500, 100);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_direction_filter_parse() {
        assert_eq!("outbound".parse(), Ok(DirectionFilter::Outbound));
        assert_eq!("0".parse(), Ok(DirectionFilter::Outbound));
        assert_eq!("Inbound".parse(), Ok(DirectionFilter::Inbound));
        assert_eq!("yes".parse(), Ok(DirectionFilter::Both));
        assert_eq!("both".parse(), Ok(DirectionFilter::Both));
        assert!("sideways".parse::<DirectionFilter>().is_err());
        assert_eq!(DirectionFilter::Inbound.to_string(), "inbound");
    }

    #[test]
    fn test_stops_radius_params() {
        let req = StopsRequest::within_feet(GeoPoint::new(-122.686_153, 45.530_55), 500)
            .with_route_directions();
        let params = serde_json::to_value(&req).unwrap();
        assert_eq!(
            params,
            json!({ "ll": "-122.686153,45.53055", "feet": 500, "showRouteDirs": true })
        );
    }

    #[test]
    fn test_stops_bbox_params() {
        let bbox = BoundingBox::new(-122.7, 45.5, -122.6, 45.6);
        let params = serde_json::to_value(StopsRequest::in_box(bbox).with_routes()).unwrap();
        assert_eq!(
            params,
            json!({ "bbox": "-122.7,45.5,-122.6,45.6", "showRoutes": true })
        );
    }

    #[test]
    fn test_stops_validation() {
        let center = GeoPoint::new(-122.686_153, 45.530_55);
        let bbox = BoundingBox::new(-122.7, 45.5, -122.6, 45.6);

        assert!(StopsRequest::within_feet(center, 500).validate().is_ok());
        assert!(StopsRequest::within_meters(center, 150).validate().is_ok());
        assert!(StopsRequest::in_box(bbox).validate().is_ok());

        assert!(StopsRequest::default().validate().is_err());

        let mut both_areas = StopsRequest::in_box(bbox);
        both_areas.center = Some(center);
        assert!(both_areas.validate().is_err());

        let mut both_units = StopsRequest::within_feet(center, 500);
        both_units.meters = Some(150);
        assert!(both_units.validate().is_err());

        let no_radius = StopsRequest {
            center: Some(center),
            ..StopsRequest::default()
        };
        assert!(no_radius.validate().is_err());

        let mut radius_on_box = StopsRequest::in_box(bbox);
        radius_on_box.feet = Some(100);
        assert!(radius_on_box.validate().is_err());

        let inverted = BoundingBox::new(-122.6, 45.6, -122.7, 45.5);
        assert!(StopsRequest::in_box(inverted).validate().is_err());

        let off_planet = GeoPoint::new(45.5, -122.6);
        assert!(StopsRequest::within_feet(off_planet, 500).validate().is_err());
    }

    #[test]
    fn test_bounding_box_parse() {
        let bbox: BoundingBox = "-122.7, 45.5, -122.6, 45.6".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(-122.7, 45.5, -122.6, 45.6));
        assert!("-122.7,45.5".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(ArrivalsRequest::ENDPOINT, "arrivals");
        assert_eq!(DetoursRequest::ENDPOINT, "detours");
        assert_eq!(RouteConfigRequest::ENDPOINT, "routeConfig");
        assert_eq!(StopsRequest::ENDPOINT, "stops");
    }
}
