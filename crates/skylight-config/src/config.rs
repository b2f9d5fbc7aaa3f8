//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tone_mapping::ToneMapping;

/// Smallest accepted environment render target edge, in texels.
pub const MIN_RENDER_TARGET_SIZE: u32 = 16;
/// Largest accepted environment render target edge, in texels.
pub const MAX_RENDER_TARGET_SIZE: u32 = 2048;
/// Last day of the 366-day cycle.
pub const MAX_DAY_OF_YEAR: u32 = 365;

/// Top-level sky configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Observer location.
    pub location: LocationConfig,
    /// Time of day, day of year and time-advance rate.
    pub time: TimeConfig,
    /// Scattering bounds and passthroughs.
    pub atmosphere: AtmosphereConfig,
    /// Sun disc visibility.
    pub sun: SunDiscConfig,
    /// Environment map baking.
    pub environment: EnvironmentConfig,
    /// Directional light coupling.
    pub light: LightConfig,
    /// Water surface selection.
    pub water: WaterConfig,
    /// Output tone mapping.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Geographic observer location. Values are not range-checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// Latitude in degrees, north positive.
    pub lat: f64,
    /// Longitude in degrees, east positive.
    pub lon: f64,
}

/// Simulation clock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    /// Fraction of the day in `[0, 1)`; 0.5 is local clock noon. Values of 1
    /// or more are not rejected; they shed one day per advancing tick.
    pub time_of_day: f64,
    /// Day of year. Wraps modulo 366, so the cycle is `0..=365`.
    pub day_of_year: u32,
    /// Days advanced per wall-clock second. 0 freezes the clock.
    pub time_speed: f64,
}

/// Atmosphere scattering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Haze density, passed straight to the sky material.
    pub turbidity: f64,
    /// Rayleigh coefficient once the sun is well above the horizon.
    pub rayleigh_min: f64,
    /// Rayleigh coefficient with the sun on the horizon.
    pub rayleigh_max: f64,
    /// Mie coefficient, passed straight to the sky material.
    pub mie_coefficient: f64,
    /// Mie anisotropy once the sun is well above the horizon.
    pub mie_directional_g_min: f64,
    /// Mie anisotropy with the sun on the horizon.
    pub mie_directional_g_max: f64,
}

/// Sun disc visibility, tracked separately for the camera and the baked map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunDiscConfig {
    /// Draw the disc in the primary view.
    pub show_in_sky: bool,
    /// Draw the disc into the baked environment map.
    pub show_in_environment: bool,
}

/// Environment map baking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Bake an environment map at all.
    pub enabled: bool,
    /// Use the equirectangular irradiance bake instead of the cube capture.
    pub pmrem: bool,
    /// Cube target edge length in texels (power of two).
    pub render_target_size: u32,
}

/// Directional (sun) light.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Whether the light is visible.
    pub enabled: bool,
    /// Scales the altitude-driven intensity.
    pub intensity_modifier: f64,
}

/// Water surface selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Surface roughness for the material variants.
    pub roughness: f64,
    /// Physical (transmissive) material instead of the standard one.
    pub physical: bool,
    /// Use the animated, sun-driven water mesh instead of a plain material.
    pub water_mesh: bool,
}

/// Output settings handed through to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
    /// Tone mapping exposure.
    pub exposure: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lat: 56.0,
            lon: -3.0,
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_of_day: 0.4,
            day_of_year: 242,
            time_speed: 0.0,
        }
    }
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            turbidity: 0.5,
            rayleigh_min: 0.1,
            rayleigh_max: 4.0,
            mie_coefficient: 0.06,
            mie_directional_g_min: 0.06,
            mie_directional_g_max: 0.6,
        }
    }
}

impl Default for SunDiscConfig {
    fn default() -> Self {
        Self {
            show_in_sky: true,
            show_in_environment: true,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pmrem: false,
            render_target_size: 64,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity_modifier: 0.5,
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            roughness: 0.2,
            physical: true,
            water_mesh: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 0.5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Returns `true` if `size` is an accepted environment render target edge.
pub fn is_valid_render_target_size(size: u32) -> bool {
    size.is_power_of_two() && (MIN_RENDER_TARGET_SIZE..=MAX_RENDER_TARGET_SIZE).contains(&size)
}

// --- Load / Save ---

impl Config {
    /// Reject values the baker cannot honor.
    ///
    /// Geographic values and the time of day are left alone; they only
    /// produce degenerate sun positions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.environment.render_target_size;
        if !is_valid_render_target_size(size) {
            return Err(ConfigError::InvalidValue {
                field: "environment.render_target_size",
                reason: format!(
                    "{size} is not a power of two in {MIN_RENDER_TARGET_SIZE}..={MAX_RENDER_TARGET_SIZE}"
                ),
            });
        }
        if self.time.day_of_year > MAX_DAY_OF_YEAR {
            return Err(ConfigError::InvalidValue {
                field: "time.day_of_year",
                reason: format!("{} is past day {MAX_DAY_OF_YEAR}", self.time.day_of_year),
            });
        }
        if self.time.time_speed < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "time.time_speed",
                reason: format!("{} is negative", self.time.time_speed),
            });
        }
        Ok(())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}
