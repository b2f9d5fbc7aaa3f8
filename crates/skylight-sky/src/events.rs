//! Parameter change events and the stages each one invalidates.
//!
//! Every user-facing setting has a [`ChangeEvent`] variant. Panels and other
//! front ends either build events directly or go through
//! [`ChangeEvent::parse`] with a `{ key, value }` pair; the scheduler applies
//! them and reruns only the [`RecomputeStages`] the event names.

use skylight_config::{Config, ToneMapping, is_valid_render_target_size};

use crate::time::DAYS_PER_CYCLE;

/// Value carried by an untyped `{ key, value }` change.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Bool(_) => "bool",
            ParamValue::Text(_) => "text",
        }
    }
}

/// Errors from turning a `{ key, value }` pair into a [`ChangeEvent`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    /// No setting has this key.
    #[error("unknown parameter `{0}`")]
    UnknownKey(String),

    /// The value has the wrong type for the key.
    #[error("parameter `{key}` expects a {expected}, got a {actual}")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// A numeric value outside what the setting can hold.
    #[error("parameter `{key}` cannot be {value}")]
    OutOfRange { key: &'static str, value: f64 },

    /// Render target sizes must be supported powers of two.
    #[error("render target size {0} is not a supported power of two")]
    InvalidRenderTargetSize(f64),

    #[error(transparent)]
    UnknownToneMapping(#[from] skylight_config::UnknownToneMapping),
}

/// A single setting change.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    Latitude(f64),
    Longitude(f64),
    TimeOfDay(f64),
    DayOfYear(u32),
    TimeSpeed(f64),
    Turbidity(f64),
    RayleighMin(f64),
    RayleighMax(f64),
    MieCoefficient(f64),
    MieDirectionalGMin(f64),
    MieDirectionalGMax(f64),
    ShowSunDiscSky(bool),
    ShowSunDiscEnv(bool),
    Environment(bool),
    Pmrem(bool),
    RenderTargetSize(u32),
    DirectionalLight(bool),
    DirLightIntensityModifier(f64),
    WaterRoughness(f64),
    WaterPhysical(bool),
    WaterMesh(bool),
    ToneMapping(ToneMapping),
    ToneMappingExposure(f64),
}

/// Pipeline stages a change invalidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecomputeStages {
    /// Ephemeris, atmosphere and sky material (implies light, water sun and a bake).
    pub sun: bool,
    /// Environment targets and a bake.
    pub environment: bool,
    pub light: bool,
    pub water: bool,
    pub tone_mapping: bool,
}

impl RecomputeStages {
    pub const NONE: Self = Self {
        sun: false,
        environment: false,
        light: false,
        water: false,
        tone_mapping: false,
    };

    /// The whole sun-driven pipeline.
    pub const FULL: Self = Self {
        sun: true,
        environment: true,
        light: true,
        water: true,
        tone_mapping: false,
    };

    pub const ENVIRONMENT: Self = Self {
        environment: true,
        ..Self::NONE
    };

    pub const LIGHT: Self = Self {
        light: true,
        ..Self::NONE
    };

    pub const WATER: Self = Self {
        water: true,
        ..Self::NONE
    };

    pub const TONE_MAPPING: Self = Self {
        tone_mapping: true,
        ..Self::NONE
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl ChangeEvent {
    /// Build an event from a panel-style key and value.
    pub fn parse(key: &str, value: ParamValue) -> Result<Self, EventError> {
        let event = match key {
            "lat" => ChangeEvent::Latitude(number("lat", &value)?),
            "lon" => ChangeEvent::Longitude(number("lon", &value)?),
            "timeOfDay" => ChangeEvent::TimeOfDay(number("timeOfDay", &value)?),
            "dayOfYear" => {
                let day = number("dayOfYear", &value)?;
                if day.fract() != 0.0 || !(0.0..f64::from(DAYS_PER_CYCLE)).contains(&day) {
                    return Err(EventError::OutOfRange {
                        key: "dayOfYear",
                        value: day,
                    });
                }
                ChangeEvent::DayOfYear(day as u32)
            }
            "timeSpeed" => {
                let speed = number("timeSpeed", &value)?;
                if speed.is_nan() || speed < 0.0 {
                    return Err(EventError::OutOfRange {
                        key: "timeSpeed",
                        value: speed,
                    });
                }
                ChangeEvent::TimeSpeed(speed)
            }
            "turbidity" => ChangeEvent::Turbidity(number("turbidity", &value)?),
            "rayleighMin" => ChangeEvent::RayleighMin(number("rayleighMin", &value)?),
            "rayleighMax" => ChangeEvent::RayleighMax(number("rayleighMax", &value)?),
            "mieCoefficient" => ChangeEvent::MieCoefficient(number("mieCoefficient", &value)?),
            "mieDirectionalGMin" => {
                ChangeEvent::MieDirectionalGMin(number("mieDirectionalGMin", &value)?)
            }
            "mieDirectionalGMax" => {
                ChangeEvent::MieDirectionalGMax(number("mieDirectionalGMax", &value)?)
            }
            "showSunDiscSky" => ChangeEvent::ShowSunDiscSky(flag("showSunDiscSky", &value)?),
            "showSunDiscEnv" => ChangeEvent::ShowSunDiscEnv(flag("showSunDiscEnv", &value)?),
            "environment" => ChangeEvent::Environment(flag("environment", &value)?),
            "pmrem" => ChangeEvent::Pmrem(flag("pmrem", &value)?),
            "renderTargetSize" => {
                let size = number("renderTargetSize", &value)?;
                if size.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&size) {
                    return Err(EventError::InvalidRenderTargetSize(size));
                }
                let size = size as u32;
                if !is_valid_render_target_size(size) {
                    return Err(EventError::InvalidRenderTargetSize(f64::from(size)));
                }
                ChangeEvent::RenderTargetSize(size)
            }
            "directionalLight" => ChangeEvent::DirectionalLight(flag("directionalLight", &value)?),
            "dirLightIntensityModifier" => ChangeEvent::DirLightIntensityModifier(number(
                "dirLightIntensityModifier",
                &value,
            )?),
            "waterRoughness" => ChangeEvent::WaterRoughness(number("waterRoughness", &value)?),
            "waterPhysical" => ChangeEvent::WaterPhysical(flag("waterPhysical", &value)?),
            "waterMesh" | "WaterMesh" => ChangeEvent::WaterMesh(flag("waterMesh", &value)?),
            "toneMapping" => ChangeEvent::ToneMapping(text("toneMapping", &value)?.parse()?),
            "toneMappingExposure" => {
                ChangeEvent::ToneMappingExposure(number("toneMappingExposure", &value)?)
            }
            _ => return Err(EventError::UnknownKey(key.to_string())),
        };
        Ok(event)
    }

    /// Stages to rerun after this change lands.
    pub fn stages(&self) -> RecomputeStages {
        match self {
            ChangeEvent::Latitude(_)
            | ChangeEvent::Longitude(_)
            | ChangeEvent::TimeOfDay(_)
            | ChangeEvent::DayOfYear(_)
            | ChangeEvent::Turbidity(_)
            | ChangeEvent::RayleighMin(_)
            | ChangeEvent::RayleighMax(_)
            | ChangeEvent::MieCoefficient(_)
            | ChangeEvent::MieDirectionalGMin(_)
            | ChangeEvent::MieDirectionalGMax(_) => RecomputeStages::FULL,
            ChangeEvent::ShowSunDiscSky(_)
            | ChangeEvent::ShowSunDiscEnv(_)
            | ChangeEvent::Environment(_)
            | ChangeEvent::Pmrem(_)
            | ChangeEvent::RenderTargetSize(_) => RecomputeStages::ENVIRONMENT,
            ChangeEvent::DirectionalLight(_) | ChangeEvent::DirLightIntensityModifier(_) => {
                RecomputeStages::LIGHT
            }
            ChangeEvent::WaterRoughness(_)
            | ChangeEvent::WaterPhysical(_)
            | ChangeEvent::WaterMesh(_) => RecomputeStages::WATER,
            ChangeEvent::ToneMapping(_) | ChangeEvent::ToneMappingExposure(_) => {
                RecomputeStages::TONE_MAPPING
            }
            // Read on every tick.
            ChangeEvent::TimeSpeed(_) => RecomputeStages::NONE,
        }
    }

    /// Write the new value into `config`. Returns `false` if it was already set.
    pub fn apply_to(&self, config: &mut Config) -> bool {
        match *self {
            ChangeEvent::Latitude(v) => set(&mut config.location.lat, v),
            ChangeEvent::Longitude(v) => set(&mut config.location.lon, v),
            ChangeEvent::TimeOfDay(v) => set(&mut config.time.time_of_day, v),
            ChangeEvent::DayOfYear(v) => set(&mut config.time.day_of_year, v),
            ChangeEvent::TimeSpeed(v) => set(&mut config.time.time_speed, v),
            ChangeEvent::Turbidity(v) => set(&mut config.atmosphere.turbidity, v),
            ChangeEvent::RayleighMin(v) => set(&mut config.atmosphere.rayleigh_min, v),
            ChangeEvent::RayleighMax(v) => set(&mut config.atmosphere.rayleigh_max, v),
            ChangeEvent::MieCoefficient(v) => set(&mut config.atmosphere.mie_coefficient, v),
            ChangeEvent::MieDirectionalGMin(v) => {
                set(&mut config.atmosphere.mie_directional_g_min, v)
            }
            ChangeEvent::MieDirectionalGMax(v) => {
                set(&mut config.atmosphere.mie_directional_g_max, v)
            }
            ChangeEvent::ShowSunDiscSky(v) => set(&mut config.sun.show_in_sky, v),
            ChangeEvent::ShowSunDiscEnv(v) => set(&mut config.sun.show_in_environment, v),
            ChangeEvent::Environment(v) => set(&mut config.environment.enabled, v),
            ChangeEvent::Pmrem(v) => set(&mut config.environment.pmrem, v),
            ChangeEvent::RenderTargetSize(v) => set(&mut config.environment.render_target_size, v),
            ChangeEvent::DirectionalLight(v) => set(&mut config.light.enabled, v),
            ChangeEvent::DirLightIntensityModifier(v) => {
                set(&mut config.light.intensity_modifier, v)
            }
            ChangeEvent::WaterRoughness(v) => set(&mut config.water.roughness, v),
            ChangeEvent::WaterPhysical(v) => set(&mut config.water.physical, v),
            ChangeEvent::WaterMesh(v) => set(&mut config.water.water_mesh, v),
            ChangeEvent::ToneMapping(v) => set(&mut config.render.tone_mapping, v),
            ChangeEvent::ToneMappingExposure(v) => set(&mut config.render.exposure, v),
        }
    }
}

fn number(key: &'static str, value: &ParamValue) -> Result<f64, EventError> {
    match value {
        ParamValue::Number(n) => Ok(*n),
        other => Err(EventError::TypeMismatch {
            key,
            expected: "number",
            actual: other.kind(),
        }),
    }
}

fn flag(key: &'static str, value: &ParamValue) -> Result<bool, EventError> {
    match value {
        ParamValue::Bool(b) => Ok(*b),
        other => Err(EventError::TypeMismatch {
            key,
            expected: "bool",
            actual: other.kind(),
        }),
    }
}

fn text<'a>(key: &'static str, value: &'a ParamValue) -> Result<&'a str, EventError> {
    match value {
        ParamValue::Text(s) => Ok(s),
        other => Err(EventError::TypeMismatch {
            key,
            expected: "text",
            actual: other.kind(),
        }),
    }
}
