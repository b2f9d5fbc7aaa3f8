//! Configuration system for the skylight simulation.
//!
//! Provides the observer, clock, atmosphere, baking and light settings that
//! persist to disk as RON files. Supports CLI overrides via clap and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;
mod tone_mapping;

pub use cli::CliArgs;
pub use config::{
    AtmosphereConfig, Config, DebugConfig, EnvironmentConfig, LightConfig, LocationConfig,
    MAX_DAY_OF_YEAR, MAX_RENDER_TARGET_SIZE, MIN_RENDER_TARGET_SIZE, RenderConfig, SunDiscConfig,
    TimeConfig, WaterConfig, is_valid_render_target_size,
};
pub use error::ConfigError;
pub use tone_mapping::{ToneMapping, UnknownToneMapping};
