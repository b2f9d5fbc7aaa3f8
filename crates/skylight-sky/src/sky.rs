//! Sky material parameters published to the renderer.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

use crate::atmosphere::AtmosphereParams;
use crate::ephemeris::SunState;

/// Parameters the sky shader needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyMaterialParams {
    /// Unit-scaled sun position.
    pub sun_position: DVec3,
    pub turbidity: f64,
    pub rayleigh: f64,
    pub mie_coefficient: f64,
    pub mie_directional_g: f64,
    /// Whether the sun disc is drawn.
    pub show_sun_disc: bool,
}

impl SkyMaterialParams {
    pub fn new(sun: &SunState, atmosphere: &AtmosphereParams, show_sun_disc: bool) -> Self {
        Self {
            sun_position: sun.position,
            turbidity: atmosphere.turbidity,
            rayleigh: atmosphere.rayleigh,
            mie_coefficient: atmosphere.mie_coefficient,
            mie_directional_g: atmosphere.mie_directional_g,
            show_sun_disc,
        }
    }

    /// Copy of these parameters with a different disc visibility.
    pub fn with_sun_disc(mut self, show_sun_disc: bool) -> Self {
        self.show_sun_disc = show_sun_disc;
        self
    }

    /// Build the GPU-side uniform.
    pub fn to_uniform(&self) -> SkyUniform {
        SkyUniform {
            sun_position_turbidity: [
                self.sun_position.x as f32,
                self.sun_position.y as f32,
                self.sun_position.z as f32,
                self.turbidity as f32,
            ],
            scattering: [
                self.rayleigh as f32,
                self.mie_coefficient as f32,
                self.mie_directional_g as f32,
                if self.show_sun_disc { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// GPU-side sky parameters, 32 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyUniform {
    /// xyz = sun position, w = turbidity.
    pub sun_position_turbidity: [f32; 4],
    /// x = rayleigh, y = mie coefficient, z = mie directional g, w = disc flag.
    pub scattering: [f32; 4],
}

static_assertions::assert_eq_size!(SkyUniform, [u8; 32]);
