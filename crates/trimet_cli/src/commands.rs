//! Command execution and output rendering

use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use trimet::{
    ArrivalsRequest, ArrivalsResponse, DetoursRequest, DetoursResponse, RouteConfigRequest,
    RouteConfigResponse, StopsRequest, StopsResponse, TrimetClient, TrimetTime,
};

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Pretty-printed JSON of the decoded result
    Json,
}

impl OutputFormat {
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Summary }
    }
}

pub async fn arrivals(
    client: &dyn TrimetClient,
    request: &ArrivalsRequest,
    format: OutputFormat,
) -> Result<String> {
    let response = client
        .arrivals(request)
        .await
        .context("Failed to fetch arrivals")?;
    info!(count = response.arrivals.len(), "Fetched arrivals");

    match format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Summary => Ok(render_arrivals(&response, request)),
    }
}

pub async fn detours(
    client: &dyn TrimetClient,
    request: &DetoursRequest,
    format: OutputFormat,
) -> Result<String> {
    let response = client
        .detours(request)
        .await
        .context("Failed to fetch detours")?;
    info!(count = response.detours.len(), "Fetched detours");

    match format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Summary => Ok(render_detours(&response)),
    }
}

pub async fn routes(
    client: &dyn TrimetClient,
    request: &RouteConfigRequest,
    format: OutputFormat,
) -> Result<String> {
    let response = client
        .route_config(request)
        .await
        .context("Failed to fetch route configuration")?;
    info!(count = response.routes.len(), "Fetched routes");

    match format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Summary => Ok(render_routes(&response)),
    }
}

pub async fn stops(
    client: &dyn TrimetClient,
    request: &StopsRequest,
    format: OutputFormat,
) -> Result<String> {
    let response = client
        .stops(request)
        .await
        .context("Failed to search stops")?;
    info!(count = response.locations.len(), "Fetched stops");

    match format {
        OutputFormat::Json => to_json(&response),
        OutputFormat::Summary => Ok(render_stops(&response)),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to encode result as JSON")
}

/// Arrivals grouped under each requested stop, in request order
fn render_arrivals(response: &ArrivalsResponse, request: &ArrivalsRequest) -> String {
    let now = response
        .query_time
        .unwrap_or_else(|| TrimetTime::from(Utc::now()));
    let mut out = String::new();

    for id in &request.location_ids {
        match response.location(*id) {
            Some(location) => {
                let _ = writeln!(out, "{location}");
            },
            None => {
                let _ = writeln!(out, "Stop {id}");
            },
        }

        let mut any = false;
        for arrival in response.arrivals_at(*id) {
            any = true;
            let _ = writeln!(out, "  {}", arrival.format_summary(&now));
        }
        if !any {
            let _ = writeln!(out, "  no arrivals");
        }
    }

    out
}

fn render_detours(response: &DetoursResponse) -> String {
    if response.detours.is_empty() {
        return "No detours\n".to_string();
    }

    let mut out = String::new();
    for detour in &response.detours {
        let routes = detour
            .routes
            .iter()
            .map(|r| r.id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "[{}] routes {routes}", detour.id);
        let _ = writeln!(out, "  {}", detour.description);
    }
    out
}

fn render_routes(response: &RouteConfigResponse) -> String {
    let mut out = String::new();
    for route in &response.routes {
        let _ = writeln!(out, "{} {route} [{}]", route.id, route.route_type.label());
        for direction in &route.directions {
            let _ = writeln!(out, "  {} {}", direction.number, direction.description);
            for stop in &direction.locations {
                let marker = if stop.time_point { "*" } else { " " };
                let _ = writeln!(out, "   {marker}{:>5} {stop}", stop.sequence);
            }
        }
    }
    out
}

fn render_stops(response: &StopsResponse) -> String {
    if response.locations.is_empty() {
        return "No stops found\n".to_string();
    }

    let mut out = String::new();
    for stop in &response.locations {
        if stop.direction.is_empty() {
            let _ = writeln!(out, "{stop}");
        } else {
            let _ = writeln!(out, "{stop} {}", stop.direction);
        }
        for route in &stop.routes {
            let _ = writeln!(out, "  {} {route}", route.id);
            for direction in &route.directions {
                let _ = writeln!(out, "    {}", direction.description);
            }
        }
    }
    out
}
