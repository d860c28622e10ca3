//! Client for the TriMet developer web services
//!
//! Typed access to Portland's public transit real-time services: next
//! arrivals at a stop, detours in effect, route configurations and stop
//! location search.
//!
//! # Architecture
//!
//! [`TrimetClient`] defines the operations and is implemented by
//! [`HttpTrimetClient`]. Request objects ([`ArrivalsRequest`],
//! [`DetoursRequest`], [`RouteConfigRequest`], [`StopsRequest`]) serialize to
//! query parameters; results decode into plain data models. Timestamps use
//! [`TrimetTime`], which understands the service's offset notation.
//!
//! # Example
//!
//! ```rust,ignore
//! use trimet::{ArrivalsRequest, HttpTrimetClient, TrimetClient, TrimetConfig};
//!
//! let client = HttpTrimetClient::new(&TrimetConfig::new("my-app-id"))?;
//! let response = client.arrivals(&ArrivalsRequest::new([8989])).await?;
//!
//! for arrival in &response.arrivals {
//!     println!("{} {:?}", arrival.short_sign, arrival.expected());
//! }
//! ```

mod client;
mod config;
mod error;
mod models;
mod request;
mod response;
mod time;

pub use client::{HttpTrimetClient, MEDIA_TYPE, TrimetClient};
pub use config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, TrimetConfig};
pub use error::TrimetError;
pub use models::{
    Arrival, ArrivalStatus, Detour, Direction, Layover, Location, Position, Route,
    RouteCondition, RouteStatus, RouteType, Trip,
};
pub use request::{
    ArrivalsRequest, BoundingBox, DetoursRequest, DirectionFilter, Endpoint, GeoPoint,
    MAX_LOCATION_IDS, RouteConfigRequest, StopsRequest, Validate,
};
pub use response::{
    ArrivalsResponse, DetoursResponse, Envelope, ErrorMessage, ResultSet, RouteConfigResponse,
    StopsResponse,
};
pub use time::{SERVICE_TIMEZONE, TimeParseError, TrimetTime};
