//! Service results
//!
//! Every payload arrives wrapped as `{"resultSet": {...}}`. The result set
//! carries either the requested data or an `errorMessage`, and the service
//! reports request errors that way even with HTTP 200.

use serde::{Deserialize, Serialize};

use crate::models::{Arrival, Detour, Location, Route};
use crate::time::TrimetTime;

/// Top-level JSON document returned by every endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "resultSet")]
    pub result_set: ResultSet<T>,
}

/// Body of a result set plus the optional service error
#[derive(Debug, Deserialize)]
pub struct ResultSet<T> {
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<ErrorMessage>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> ResultSet<T> {
    /// The body, or the service's error message if one was reported
    ///
    /// # Errors
    ///
    /// Returns the error message content when the result set carries one.
    pub fn into_result(self) -> Result<T, String> {
        match self.error_message {
            Some(message) => Err(message.content),
            None => Ok(self.body),
        }
    }
}

/// `errorMessage` element of a result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessage {
    pub content: String,
}

/// Extract the error message from a failed response body
///
/// Accepts the enveloped form and a bare `{"errorMessage": ...}`. Anything
/// else, including an empty or non-JSON body, yields an empty message.
pub(crate) fn error_message_from_body(body: &str) -> String {
    #[derive(Deserialize)]
    struct Wrapped {
        #[serde(rename = "resultSet")]
        result_set: Bare,
    }

    #[derive(Deserialize)]
    struct Bare {
        #[serde(rename = "errorMessage")]
        error_message: ErrorMessage,
    }

    if let Ok(wrapped) = serde_json::from_str::<Wrapped>(body) {
        return wrapped.result_set.error_message.content;
    }
    serde_json::from_str::<Bare>(body)
        .map(|bare| bare.error_message.content)
        .unwrap_or_default()
}

/// Arrivals at the requested stops
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalsResponse {
    /// Time the service answered the query
    #[serde(rename = "queryTime", skip_serializing_if = "Option::is_none")]
    pub query_time: Option<TrimetTime>,
    /// The requested stops
    #[serde(rename = "location")]
    pub locations: Vec<Location>,
    #[serde(rename = "arrival")]
    pub arrivals: Vec<Arrival>,
}

impl ArrivalsResponse {
    /// Arrivals at one of the requested stops
    pub fn arrivals_at(&self, location_id: u32) -> impl Iterator<Item = &Arrival> {
        self.arrivals
            .iter()
            .filter(move |a| a.location_id == location_id)
    }

    /// The requested stop with the given id
    #[must_use]
    pub fn location(&self, location_id: u32) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == location_id)
    }
}

/// Detours in effect
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetoursResponse {
    #[serde(rename = "queryTime", skip_serializing_if = "Option::is_none")]
    pub query_time: Option<TrimetTime>,
    #[serde(rename = "detour")]
    pub detours: Vec<Detour>,
}

impl DetoursResponse {
    /// Detours affecting a route
    pub fn for_route(&self, route: u32) -> impl Iterator<Item = &Detour> {
        self.detours.iter().filter(move |d| d.affects_route(route))
    }
}

/// Route configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfigResponse {
    #[serde(rename = "queryTime", skip_serializing_if = "Option::is_none")]
    pub query_time: Option<TrimetTime>,
    #[serde(rename = "route")]
    pub routes: Vec<Route>,
}

impl RouteConfigResponse {
    #[must_use]
    pub fn route(&self, id: u32) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }
}

/// Stops matching a location search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StopsResponse {
    #[serde(rename = "queryTime", skip_serializing_if = "Option::is_none")]
    pub query_time: Option<TrimetTime>,
    #[serde(rename = "location")]
    pub locations: Vec<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_body() {
        let json = r#"{"resultSet": {
            "queryTime": "2014-01-12T15:32:13.438-0800",
            "location": [{"locid": 10775, "desc": "NW Northrup & 14th"}]
        }}"#;

        let envelope: Envelope<StopsResponse> = serde_json::from_str(json).unwrap();
        let stops = envelope.result_set.into_result().unwrap();
        assert_eq!(stops.locations.len(), 1);
        assert_eq!(stops.locations[0].id, 10775);
        assert_eq!(
            stops.query_time.unwrap().to_string(),
            "2014-01-12T15:32:13.438-0800"
        );
    }

    #[test]
    fn test_envelope_with_error_message() {
        let json = r#"{"resultSet": {
            "queryTime": "2014-01-12T15:32:13.438-0800",
            "errorMessage": {"content": "Location id not found 99999999"}
        }}"#;

        let envelope: Envelope<ArrivalsResponse> = serde_json::from_str(json).unwrap();
        let err = envelope.result_set.into_result().unwrap_err();
        assert_eq!(err, "Location id not found 99999999");
    }

    #[test]
    fn test_envelope_empty_result_set() {
        let envelope: Envelope<DetoursResponse> =
            serde_json::from_str(r#"{"resultSet": {}}"#).unwrap();
        let detours = envelope.result_set.into_result().unwrap();
        assert!(detours.detours.is_empty());
        assert!(detours.query_time.is_none());
    }

    #[test]
    fn test_envelope_missing_result_set() {
        let result: Result<Envelope<DetoursResponse>, _> =
            serde_json::from_str(r#"{"detour": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            error_message_from_body(r#"{"resultSet":{"errorMessage":{"content":"m"}}}"#),
            "m"
        );
        assert_eq!(error_message_from_body(r#"{"errorMessage":{"content":"m"}}"#), "m");
        assert_eq!(error_message_from_body("Bad Request"), "");
        assert_eq!(error_message_from_body(""), "");
    }

    #[test]
    fn test_arrivals_lookup_helpers() {
        let json = r#"{
            "location": [{"locid": 8989, "desc": "NW 23rd & Marshall"}],
            "arrival": [{"locid": 8989, "route": 15}, {"locid": 7787, "route": 77}]
        }"#;
        let response: ArrivalsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.arrivals_at(8989).count(), 1);
        assert_eq!(response.arrivals_at(1).count(), 0);
        assert_eq!(
            response.location(8989).map(|l| l.description.as_str()),
            Some("NW 23rd & Marshall")
        );
        assert!(response.location(7787).is_none());
    }

    #[test]
    fn test_detours_for_route() {
        let json = r#"{"detour": [
            {"id": "1", "route": [{"route": 12}]},
            {"id": "2", "route": [{"route": 15}, {"route": 12}]},
            {"id": "3", "route": [{"route": 4}]}
        ]}"#;
        let response: DetoursResponse = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = response.for_route(12).map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_route_config_lookup() {
        let json = r#"{"route": [{"route": 193, "desc": "Portland Streetcar - NS Line", "type": "R"}]}"#;
        let response: RouteConfigResponse = serde_json::from_str(json).unwrap();
        assert!(response.route(193).is_some());
        assert!(response.route(12).is_none());
    }
}
