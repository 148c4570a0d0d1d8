use clap::{Args, Parser, Subcommand};
use proximity_core::config::{parse_concurrency, parse_radius};
use std::path::PathBuf;

/// Proximity - Find the features around a map click
#[derive(Parser, Debug)]
#[command(name = "proximity")]
#[command(about = "Find the features around a map click", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query layers for features near a point
    Nearby(NearbyArgs),

    /// Describe the location of a geometry or of the map centre
    Locate(LocateArgs),

    /// List the registered host operations
    Operations,

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Args, Debug)]
pub struct NearbyArgs {
    /// X coordinate of the click in the map reference
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,

    /// Y coordinate of the click in the map reference
    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,

    /// GeoJSON layer file, repeat for several layers
    #[arg(long = "layer", value_name = "FILE")]
    pub layers: Vec<PathBuf>,

    /// WKID of the map reference
    #[arg(long)]
    pub wkid: Option<u32>,

    /// Search radius in meters (e.g. 100 or 100m)
    #[arg(long, value_parser = parse_radius_arg)]
    pub radius: Option<f64>,

    /// Number of features listed in the summary
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Layers queried at the same time
    #[arg(long, value_parser = parse_concurrency_arg)]
    pub concurrency: Option<usize>,

    /// Seconds to wait for each layer
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// GeoJSON geometry to describe
    #[arg(long, value_name = "GEOJSON")]
    pub geometry: Option<String>,

    /// WKID of the geometry, the map reference when omitted
    #[arg(long)]
    pub wkid: Option<u32>,

    /// Map centre used when no geometry is given
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub center: Option<Vec<f64>>,
}

fn parse_radius_arg(s: &str) -> Result<f64, String> {
    parse_radius(s).map_err(|e| e.to_string())
}

fn parse_concurrency_arg(s: &str) -> Result<usize, String> {
    parse_concurrency(s).map_err(|e| e.to_string())
}
