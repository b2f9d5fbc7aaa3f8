//! Solar ephemeris, atmospheric scattering parameters, environment baking and
//! the per-frame scheduler that ties them to a sky renderer.

mod atmosphere;
mod environment;
mod ephemeris;
pub mod events;
mod light;
mod scheduler;
mod sky;
pub mod time;
mod water;

pub use atmosphere::{AtmosphereParams, BLEND_END, DEFAULT_NEGATIVE_CUTOFF, asymmetric_cutoff};
pub use environment::{
    BakeStats, CUBE_CAMERA_FAR, CUBE_CAMERA_NEAR, CubeTargetDescriptor, EnvironmentBaker,
    EnvironmentMode, EnvironmentRenderer, EnvironmentSettings, Filter, TexelType,
};
pub use ephemeris::{
    GeoLocation, SunState, compute_sun_position, declination, equation_of_time, fractional_year,
    hour_angle, true_solar_time,
};
pub use events::{ChangeEvent, EventError, ParamValue, RecomputeStages};
pub use light::{DirectionalLightUniform, LightState, SUN_LIGHT_COLOR, couple_light};
pub use scheduler::{RenderCommand, SkyScheduler};
pub use sky::{SkyMaterialParams, SkyUniform};
pub use time::{Advance, DAYS_PER_CYCLE, TimeState, next_day};
pub use water::{WATER_COLOR, WATER_MESH_DISTORTION, WaterMaterial, WaterSurface};
