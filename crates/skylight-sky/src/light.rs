//! Directional light driven by the sun.
//!
//! [`couple_light`] derives the CPU-side [`LightState`] from a [`SunState`];
//! [`DirectionalLightUniform`] is the GPU-side form written each frame.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::ephemeris::SunState;

/// Light color in linear RGB. The sky carries the tint, the light stays white.
pub const SUN_LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// CPU-side directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightState {
    /// Unit direction towards the sun; also used as the light's position.
    pub direction: DVec3,
    /// Never negative; exactly zero while the sun is at or below the horizon.
    pub intensity: f64,
    pub visible: bool,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            direction: DVec3::Y,
            intensity: 0.0,
            visible: false,
        }
    }
}

impl LightState {
    /// Whether the light contributes anything this frame.
    pub fn is_lit(&self) -> bool {
        self.visible && self.intensity > 0.0
    }

    /// Build the GPU-side uniform from this light's properties.
    ///
    /// A hidden light is uploaded with zero intensity.
    pub fn to_uniform(&self) -> DirectionalLightUniform {
        let intensity = if self.visible { self.intensity } else { 0.0 };
        DirectionalLightUniform {
            direction_intensity: [
                self.direction.x as f32,
                self.direction.y as f32,
                self.direction.z as f32,
                intensity as f32,
            ],
            color_padding: [SUN_LIGHT_COLOR[0], SUN_LIGHT_COLOR[1], SUN_LIGHT_COLOR[2], 0.0],
        }
    }
}

/// Derive the light from the sun: `intensity = modifier * max(0, altitude)`.
///
/// The direction is copied out of `sun`, so the published light does not
/// change if the caller later overwrites its sun snapshot.
pub fn couple_light(sun: &SunState, intensity_modifier: f64, enabled: bool) -> LightState {
    LightState {
        direction: sun.direction,
        intensity: intensity_modifier * sun.altitude.max(0.0),
        visible: enabled,
    }
}

/// GPU-side representation, 32 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// xyz = direction (normalized), w = intensity.
    pub direction_intensity: [f32; 4],
    /// xyz = color (linear RGB), w = padding.
    pub color_padding: [f32; 4],
}

static_assertions::assert_eq_size!(DirectionalLightUniform, [u8; 32]);
