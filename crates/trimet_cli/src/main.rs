//! TriMet CLI
//!
//! Command-line access to the TriMet developer web services.

#![allow(clippy::print_stdout)]

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trimet::{
    ArrivalsRequest, BoundingBox, DetoursRequest, DirectionFilter, GeoPoint, HttpTrimetClient,
    RouteConfigRequest, StopsRequest,
};

use crate::commands::OutputFormat;
use crate::config::AppConfig;

/// TriMet CLI
#[derive(Parser)]
#[command(name = "trimet-cli")]
#[command(author, version, about = "TriMet real-time transit CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: trimet.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TriMet application id, overrides the configuration
    #[arg(long, env = "TRIMET_APP_ID")]
    app_id: Option<String>,

    /// Print the decoded result as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Next arrivals at one or more stops
    ///
    /// Example: trimet-cli arrivals 8989 7787
    Arrivals {
        /// Location ids (at most 10)
        #[arg(required = true)]
        location_ids: Vec<u32>,

        /// Include Portland Streetcar predictions
        #[arg(long)]
        streetcar: bool,
    },

    /// Detours in effect
    Detours {
        /// Only detours on this route (repeatable)
        #[arg(short, long = "route")]
        routes: Vec<u32>,
    },

    /// Route configuration with directions and stops
    Routes {
        /// Only this route (repeatable)
        #[arg(short, long = "route")]
        routes: Vec<u32>,

        /// Directions to include: outbound, inbound or both
        #[arg(short, long)]
        dir: Option<DirectionFilter>,

        /// List every stop of each direction
        #[arg(long, conflicts_with = "time_points")]
        stops: bool,

        /// List only time-point stops of each direction
        #[arg(long)]
        time_points: bool,
    },

    /// Stops near a point or inside a bounding box
    ///
    /// Example: trimet-cli stops --lon -122.686 --lat 45.530 --feet 500
    Stops(StopsArgs),
}

#[derive(Args)]
struct StopsArgs {
    /// Longitude of the search center
    #[arg(long, allow_negative_numbers = true, requires = "lat", conflicts_with = "bbox")]
    lon: Option<f64>,

    /// Latitude of the search center
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Search radius in feet
    #[arg(long, conflicts_with = "meters")]
    feet: Option<u32>,

    /// Search radius in meters
    #[arg(long)]
    meters: Option<u32>,

    /// Bounding box as lonmin,latmin,lonmax,latmax
    #[arg(long, allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Include the routes serving each stop
    #[arg(long)]
    show_routes: bool,

    /// Include the route directions serving each stop
    #[arg(long)]
    show_route_dirs: bool,
}

impl StopsArgs {
    fn to_request(&self) -> anyhow::Result<StopsRequest> {
        let mut request = match (self.bbox, self.lon, self.lat) {
            (Some(bbox), None, None) => {
                if self.feet.is_some() || self.meters.is_some() {
                    bail!("--feet and --meters apply to --lon/--lat searches only");
                }
                StopsRequest::in_box(bbox)
            },
            (None, Some(lon), Some(lat)) => {
                let center = GeoPoint::new(lon, lat);
                match (self.feet, self.meters) {
                    (Some(feet), None) => StopsRequest::within_feet(center, feet),
                    (None, Some(meters)) => StopsRequest::within_meters(center, meters),
                    _ => bail!("give a search radius with --feet or --meters"),
                }
            },
            _ => bail!("give either --bbox or --lon and --lat"),
        };

        if self.show_routes {
            request = request.with_routes();
        }
        if self.show_route_dirs {
            request = request.with_route_directions();
        }
        Ok(request)
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn route_config_request(
    routes: Vec<u32>,
    dir: Option<DirectionFilter>,
    stops: bool,
    time_points: bool,
) -> RouteConfigRequest {
    let mut request = RouteConfigRequest::default().with_routes(routes);
    if let Some(dir) = dir {
        request = request.with_direction(dir);
    }
    if stops {
        request = request.with_stops();
    }
    if time_points {
        request = request.with_time_points();
    }
    request
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut app_config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(app_id) = cli.app_id {
        app_config.app_id = app_id;
    }
    debug!(base_url = %app_config.base_url, "Configuration loaded");

    let client = HttpTrimetClient::new(&app_config.client_config())
        .context("Failed to create TriMet client (is TRIMET_APP_ID set?)")?;
    let format = OutputFormat::from_json_flag(cli.json || app_config.json);

    let output = match cli.command {
        Commands::Arrivals {
            location_ids,
            streetcar,
        } => {
            let mut request = ArrivalsRequest::new(location_ids);
            if streetcar {
                request = request.with_streetcar();
            }
            commands::arrivals(&client, &request, format).await?
        },

        Commands::Detours { routes } => {
            commands::detours(&client, &DetoursRequest::for_routes(routes), format).await?
        },

        Commands::Routes {
            routes,
            dir,
            stops,
            time_points,
        } => {
            let request = route_config_request(routes, dir, stops, time_points);
            commands::routes(&client, &request, format).await?
        },

        Commands::Stops(args) => {
            let request = args.to_request()?;
            commands::stops(&client, &request, format).await?
        },
    };

    print!("{output}");
    if format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn stops_args(args: &[&str]) -> StopsArgs {
        let mut full = vec!["trimet-cli", "stops"];
        full.extend_from_slice(args);
        match parse(&full).command {
            Commands::Stops(args) => args,
            _ => panic!("Expected Stops command"),
        }
    }

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), "info");
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), "debug");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn stops_request_within_feet() {
        let request = stops_args(&["--lon", "-122.686", "--lat", "45.53", "--feet", "500"])
            .to_request()
            .unwrap();

        assert_eq!(request.center, Some(GeoPoint::new(-122.686, 45.53)));
        assert_eq!(request.feet, Some(500));
        assert!(request.meters.is_none());
        assert!(!request.show_routes);
    }

    #[test]
    fn stops_request_in_box_with_routes() {
        let request = stops_args(&[
            "--bbox",
            "-122.69,45.52,-122.68,45.54",
            "--show-routes",
            "--show-route-dirs",
        ])
        .to_request()
        .unwrap();

        assert_eq!(
            request.bounding_box,
            Some(BoundingBox::new(-122.69, 45.52, -122.68, 45.54))
        );
        assert!(request.show_routes);
        assert!(request.show_route_directions);
    }

    #[test]
    fn stops_request_requires_radius() {
        let result = stops_args(&["--lon", "-122.686", "--lat", "45.53"]).to_request();
        assert!(result.is_err());
    }

    #[test]
    fn stops_request_requires_area() {
        assert!(stops_args(&["--feet", "500"]).to_request().is_err());
    }

    #[test]
    fn stops_request_rejects_radius_on_box() {
        let result = stops_args(&["--bbox", "-122.69,45.52,-122.68,45.54", "--meters", "10"])
            .to_request();
        assert!(result.is_err());
    }

    #[test]
    fn route_config_request_from_flags() {
        let request =
            route_config_request(vec![193], Some(DirectionFilter::Inbound), false, true);

        assert_eq!(request.routes, vec![193]);
        assert_eq!(request.direction, Some(DirectionFilter::Inbound));
        assert!(!request.stops);
        assert!(request.time_points);
    }
}
