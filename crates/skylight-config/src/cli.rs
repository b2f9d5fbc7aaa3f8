//! Command-line argument parsing for skylight.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ToneMapping};

/// Skylight command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "skylight", about = "Solar-driven sky lighting")]
pub struct CliArgs {
    /// Observer latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Observer longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Fraction of the day in [0, 1). Larger values catch up one day per tick.
    #[arg(long)]
    pub time_of_day: Option<f64>,

    /// Day of year (0..=365).
    #[arg(long)]
    pub day_of_year: Option<u32>,

    /// Days advanced per second.
    #[arg(long)]
    pub time_speed: Option<f64>,

    /// Bake the equirectangular irradiance map instead of the cube map.
    #[arg(long)]
    pub pmrem: Option<bool>,

    /// Enable environment baking.
    #[arg(long)]
    pub environment: Option<bool>,

    /// Cube render target size in texels.
    #[arg(long)]
    pub render_target_size: Option<u32>,

    /// Tone mapping operator.
    #[arg(long)]
    pub tone_mapping: Option<ToneMapping>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Run without a GPU; bakes are only recorded.
    #[arg(long)]
    pub dry_run: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(lat) = args.lat {
            self.location.lat = lat;
        }
        if let Some(lon) = args.lon {
            self.location.lon = lon;
        }
        if let Some(t) = args.time_of_day {
            self.time.time_of_day = t;
        }
        if let Some(day) = args.day_of_year {
            self.time.day_of_year = day;
        }
        if let Some(speed) = args.time_speed {
            self.time.time_speed = speed;
        }
        if let Some(pmrem) = args.pmrem {
            self.environment.pmrem = pmrem;
        }
        if let Some(enabled) = args.environment {
            self.environment.enabled = enabled;
        }
        if let Some(size) = args.render_target_size {
            self.environment.render_target_size = size;
        }
        if let Some(tm) = args.tone_mapping {
            self.render.tone_mapping = tm;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
