//! Water surface variants.
//!
//! The demo water plane is drawn either with one of two materials or as the
//! animated water mesh whose highlights follow the sun. All three live behind
//! [`WaterSurface`], picked from configuration.

use glam::DVec3;
use skylight_config::WaterConfig;

/// Base water tint, `0x66aaff`.
pub const WATER_COLOR: u32 = 0x66aaff;

/// Distortion applied to the mesh variant's normal map.
pub const WATER_MESH_DISTORTION: f64 = 3.7;

/// Material used for the flat water plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaterMaterial {
    /// Transmissive physically based water.
    Physical {
        color: u32,
        roughness: f64,
        metalness: f64,
        transmission: f64,
        ior: f64,
        thickness: f64,
    },
    /// Alpha-blended standard material.
    Standard {
        color: u32,
        roughness: f64,
        metalness: f64,
        opacity: f64,
    },
}

impl WaterMaterial {
    pub fn physical(roughness: f64) -> Self {
        WaterMaterial::Physical {
            color: WATER_COLOR,
            roughness,
            metalness: 0.0,
            transmission: 1.0,
            ior: 1.33,
            thickness: -0.1,
        }
    }

    pub fn standard(roughness: f64) -> Self {
        WaterMaterial::Standard {
            color: WATER_COLOR,
            roughness,
            metalness: 0.0,
            opacity: 0.8,
        }
    }

    pub fn roughness(&self) -> f64 {
        match self {
            WaterMaterial::Physical { roughness, .. } | WaterMaterial::Standard { roughness, .. } => {
                *roughness
            }
        }
    }
}

/// What the renderer should draw for the water plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaterSurface {
    /// Flat plane with one of the materials.
    Material(WaterMaterial),
    /// Animated water mesh lit from `sun_direction`.
    Mesh {
        sun_direction: DVec3,
        sun_color: u32,
        water_color: u32,
        distortion_scale: f64,
    },
}

impl WaterSurface {
    /// Select the surface described by `config`.
    pub fn from_config(config: &WaterConfig, sun_direction: DVec3) -> Self {
        if config.water_mesh {
            WaterSurface::Mesh {
                sun_direction,
                sun_color: 0xffffff,
                water_color: WATER_COLOR,
                distortion_scale: WATER_MESH_DISTORTION,
            }
        } else if config.physical {
            WaterSurface::Material(WaterMaterial::physical(config.roughness))
        } else {
            WaterSurface::Material(WaterMaterial::standard(config.roughness))
        }
    }

    /// Point the mesh variant's highlights at a new sun. Materials ignore it.
    pub fn set_sun_direction(&mut self, direction: DVec3) {
        if let WaterSurface::Mesh { sun_direction, .. } = self {
            *sun_direction = direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(physical: bool, water_mesh: bool) -> WaterConfig {
        WaterConfig {
            roughness: 0.3,
            physical,
            water_mesh,
        }
    }

    #[test]
    fn test_selects_physical_material() {
        let surface = WaterSurface::from_config(&config(true, false), DVec3::Y);
        let WaterSurface::Material(material) = surface else {
            panic!("expected material, got {surface:?}");
        };
        assert!(matches!(material, WaterMaterial::Physical { ior, .. } if ior == 1.33));
        assert_eq!(material.roughness(), 0.3);
    }

    #[test]
    fn test_selects_standard_material() {
        let surface = WaterSurface::from_config(&config(false, false), DVec3::Y);
        assert_eq!(surface, WaterSurface::Material(WaterMaterial::standard(0.3)));
    }

    #[test]
    fn test_mesh_wins_over_material_flag() {
        let surface = WaterSurface::from_config(&config(true, true), DVec3::Z);
        assert!(matches!(surface, WaterSurface::Mesh { sun_direction, .. } if sun_direction == DVec3::Z));
    }

    #[test]
    fn test_sun_direction_only_moves_mesh() {
        let mut mesh = WaterSurface::from_config(&config(false, true), DVec3::Y);
        mesh.set_sun_direction(DVec3::X);
        assert!(matches!(mesh, WaterSurface::Mesh { sun_direction, .. } if sun_direction == DVec3::X));

        let mut plane = WaterSurface::from_config(&config(false, false), DVec3::Y);
        let before = plane;
        plane.set_sun_direction(DVec3::X);
        assert_eq!(plane, before);
    }
}
