//! Environment map baking with explicit render target lifecycle.
//!
//! The [`EnvironmentBaker`] turns the current sky into an image-based lighting
//! source using one of two strategies:
//!
//! * **Cube capture**: the sky is rendered into the six faces of a cube target
//!   (with a full mip chain for roughness lookups). The target is kept and
//!   re-rendered on every bake; changing its resolution reallocates it.
//! * **Irradiance (PMREM)**: the sky is convolved into an equirectangular
//!   irradiance map. Every bake produces a fresh target and the previous one is
//!   disposed first.
//!
//! At most one target is ever live. Switching strategy, changing resolution or
//! disabling the environment disposes the current target before anything new
//! is allocated. The GPU work itself is delegated to an
//! [`EnvironmentRenderer`].

use skylight_config::{EnvironmentConfig, SunDiscConfig};

use crate::sky::SkyMaterialParams;

/// Near plane of the cube capture camera.
pub const CUBE_CAMERA_NEAR: f32 = 1.0;
/// Far plane of the cube capture camera; covers the scaled sky dome.
pub const CUBE_CAMERA_FAR: f32 = 20_000.0;

/// Which baking strategy is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentMode {
    Cubemap,
    Pmrem,
}

/// Texture filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Storage type of the target texels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TexelType {
    /// Four 16-bit floats per texel.
    HalfFloat,
}

/// Everything a renderer needs to allocate a cube target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeTargetDescriptor {
    /// Face edge length in texels, a power of two.
    pub resolution: u32,
    pub generate_mipmaps: bool,
    pub mag_filter: Filter,
    pub min_filter: Filter,
    /// `Some` enables filtering between mip levels.
    pub mipmap_filter: Option<Filter>,
    pub texel_type: TexelType,
    pub near: f32,
    pub far: f32,
}

impl CubeTargetDescriptor {
    /// Trilinear, mipmapped half-float cube target at `resolution`.
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            generate_mipmaps: true,
            mag_filter: Filter::Linear,
            min_filter: Filter::Linear,
            mipmap_filter: Some(Filter::Linear),
            texel_type: TexelType::HalfFloat,
            near: CUBE_CAMERA_NEAR,
            far: CUBE_CAMERA_FAR,
        }
    }
}

/// Baking-related settings, gathered from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentSettings {
    pub enabled: bool,
    pub mode: EnvironmentMode,
    /// Cube target resolution. Ignored in [`EnvironmentMode::Pmrem`].
    pub resolution: u32,
    /// Draw the sun disc into the baked map.
    pub show_sun_disc: bool,
}

impl EnvironmentSettings {
    pub fn from_config(environment: &EnvironmentConfig, sun: &SunDiscConfig) -> Self {
        Self {
            enabled: environment.enabled,
            mode: if environment.pmrem {
                EnvironmentMode::Pmrem
            } else {
                EnvironmentMode::Cubemap
            },
            resolution: environment.render_target_size,
            show_sun_disc: sun.show_in_environment,
        }
    }
}

/// The renderer-side half of environment baking.
///
/// Targets are handed back by value to be disposed, so a disposed target can
/// never be used again. `Texture` is a cheap handle the scene can hold for the
/// current frame.
pub trait EnvironmentRenderer {
    type CubeTarget;
    type IrradianceTarget;
    type Texture: Clone;

    /// Allocate an empty cube target.
    fn create_cube_target(&mut self, desc: &CubeTargetDescriptor) -> Self::CubeTarget;

    /// Render the sky, and nothing else, into all six faces from the origin.
    fn capture_cube(&mut self, target: &mut Self::CubeTarget, sky: &SkyMaterialParams);

    fn cube_texture(&self, target: &Self::CubeTarget) -> Self::Texture;

    /// Render the sky through an irradiance convolution into a new
    /// equirectangular target.
    fn bake_irradiance(&mut self, sky: &SkyMaterialParams) -> Self::IrradianceTarget;

    fn irradiance_texture(&self, target: &Self::IrradianceTarget) -> Self::Texture;

    fn dispose_cube(&mut self, target: Self::CubeTarget);

    fn dispose_irradiance(&mut self, target: Self::IrradianceTarget);
}

/// Lifetime counters for the baker's targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeStats {
    pub allocations: u64,
    pub disposals: u64,
    pub bakes: u64,
}

impl BakeStats {
    /// Targets allocated and not yet disposed.
    pub fn live(&self) -> u64 {
        self.allocations - self.disposals
    }
}

enum LiveTarget<C, I> {
    Cube { target: C, resolution: u32 },
    Irradiance(I),
}

/// Owns the single live environment target.
pub struct EnvironmentBaker<R: EnvironmentRenderer> {
    live: Option<LiveTarget<R::CubeTarget, R::IrradianceTarget>>,
    stats: BakeStats,
}

impl<R: EnvironmentRenderer> Default for EnvironmentBaker<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: EnvironmentRenderer> EnvironmentBaker<R> {
    pub fn new() -> Self {
        Self {
            live: None,
            stats: BakeStats::default(),
        }
    }

    pub fn stats(&self) -> BakeStats {
        self.stats
    }

    /// Strategy of the live target, if any.
    pub fn live_mode(&self) -> Option<EnvironmentMode> {
        match self.live {
            Some(LiveTarget::Cube { .. }) => Some(EnvironmentMode::Cubemap),
            Some(LiveTarget::Irradiance(_)) => Some(EnvironmentMode::Pmrem),
            None => None,
        }
    }

    /// Resolution of the live cube target, if one is live.
    pub fn cube_resolution(&self) -> Option<u32> {
        match self.live {
            Some(LiveTarget::Cube { resolution, .. }) => Some(resolution),
            _ => None,
        }
    }

    /// Texture handle of the live target, for the scene's environment slot.
    pub fn environment(&self, renderer: &R) -> Option<R::Texture> {
        match &self.live {
            Some(LiveTarget::Cube { target, .. }) => Some(renderer.cube_texture(target)),
            Some(LiveTarget::Irradiance(target)) => Some(renderer.irradiance_texture(target)),
            None => None,
        }
    }

    /// Bring the live target in line with `settings` without baking.
    ///
    /// * disabled: dispose whatever is live;
    /// * cube mode: keep a cube target of exactly `settings.resolution`;
    /// * irradiance mode: drop any cube target (irradiance targets are made by
    ///   [`bake`](Self::bake)).
    pub fn sync_targets(&mut self, renderer: &mut R, settings: &EnvironmentSettings) {
        if !settings.enabled {
            self.release(renderer);
            return;
        }

        match settings.mode {
            EnvironmentMode::Cubemap => {
                if self.cube_resolution() == Some(settings.resolution) {
                    return;
                }
                self.release(renderer);
                let desc = CubeTargetDescriptor::with_resolution(settings.resolution);
                debug_assert!(self.live.is_none(), "allocating over a live target");
                let target = renderer.create_cube_target(&desc);
                self.stats.allocations += 1;
                log::debug!(
                    "Allocated {}x{} cube environment target",
                    settings.resolution,
                    settings.resolution
                );
                self.live = Some(LiveTarget::Cube {
                    target,
                    resolution: settings.resolution,
                });
            }
            EnvironmentMode::Pmrem => {
                if self.live_mode() == Some(EnvironmentMode::Cubemap) {
                    self.release(renderer);
                }
            }
        }
    }

    /// Bake the environment from `sky` and return the texture to assign to
    /// the scene, or `None` when the environment is disabled.
    ///
    /// The bake sees a copy of `sky` with the disc visibility taken from
    /// `settings`; the caller's parameters are left untouched.
    pub fn bake(
        &mut self,
        renderer: &mut R,
        settings: &EnvironmentSettings,
        sky: &SkyMaterialParams,
    ) -> Option<R::Texture> {
        self.sync_targets(renderer, settings);
        if !settings.enabled {
            return None;
        }

        let snapshot = sky.with_sun_disc(settings.show_sun_disc);
        match settings.mode {
            EnvironmentMode::Cubemap => {
                if let Some(LiveTarget::Cube { target, .. }) = self.live.as_mut() {
                    renderer.capture_cube(target, &snapshot);
                }
            }
            EnvironmentMode::Pmrem => {
                self.release(renderer);
                debug_assert!(self.live.is_none(), "allocating over a live target");
                let target = renderer.bake_irradiance(&snapshot);
                self.stats.allocations += 1;
                self.live = Some(LiveTarget::Irradiance(target));
            }
        }
        self.stats.bakes += 1;
        log::trace!("Baked {:?} environment", settings.mode);

        self.environment(renderer)
    }

    /// Dispose the live target, if any. Leaves the environment empty.
    pub fn release(&mut self, renderer: &mut R) {
        let Some(live) = self.live.take() else {
            return;
        };
        match live {
            LiveTarget::Cube { target, resolution } => {
                renderer.dispose_cube(target);
                log::debug!("Disposed {resolution}x{resolution} cube environment target");
            }
            LiveTarget::Irradiance(target) => {
                renderer.dispose_irradiance(target);
                log::trace!("Disposed irradiance environment target");
            }
        }
        self.stats.disposals += 1;
    }

    /// Dispose everything before the renderer goes away.
    pub fn shutdown(&mut self, renderer: &mut R) {
        self.release(renderer);
        log::debug!(
            "Environment baker shut down: {} allocations, {} disposals, {} bakes",
            self.stats.allocations,
            self.stats.disposals,
            self.stats.bakes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    /// Records every call and hands out numbered targets.
    #[derive(Default)]
    struct Recorder {
        next_id: u32,
        live: Vec<u32>,
        captured_discs: Vec<bool>,
    }

    impl Recorder {
        fn alloc(&mut self) -> u32 {
            self.next_id += 1;
            self.live.push(self.next_id);
            self.next_id
        }

        fn free(&mut self, id: u32) {
            let idx = self.live.iter().position(|&l| l == id).expect("double free");
            self.live.remove(idx);
        }
    }

    impl EnvironmentRenderer for Recorder {
        type CubeTarget = (u32, u32);
        type IrradianceTarget = u32;
        type Texture = u32;

        fn create_cube_target(&mut self, desc: &CubeTargetDescriptor) -> (u32, u32) {
            (self.alloc(), desc.resolution)
        }

        fn capture_cube(&mut self, _target: &mut (u32, u32), sky: &SkyMaterialParams) {
            self.captured_discs.push(sky.show_sun_disc);
        }

        fn cube_texture(&self, target: &(u32, u32)) -> u32 {
            target.0
        }

        fn bake_irradiance(&mut self, sky: &SkyMaterialParams) -> u32 {
            self.captured_discs.push(sky.show_sun_disc);
            self.alloc()
        }

        fn irradiance_texture(&self, target: &u32) -> u32 {
            *target
        }

        fn dispose_cube(&mut self, target: (u32, u32)) {
            self.free(target.0);
        }

        fn dispose_irradiance(&mut self, target: u32) {
            self.free(target);
        }
    }

    fn sky() -> SkyMaterialParams {
        SkyMaterialParams {
            sun_position: DVec3::Y,
            turbidity: 0.5,
            rayleigh: 0.1,
            mie_coefficient: 0.06,
            mie_directional_g: 0.06,
            show_sun_disc: true,
        }
    }

    fn settings(mode: EnvironmentMode, resolution: u32) -> EnvironmentSettings {
        EnvironmentSettings {
            enabled: true,
            mode,
            resolution,
            show_sun_disc: true,
        }
    }

    #[test]
    fn test_descriptor_is_trilinear_half_float() {
        let desc = CubeTargetDescriptor::with_resolution(64);
        assert_eq!(desc.resolution, 64);
        assert!(desc.generate_mipmaps);
        assert_eq!(desc.min_filter, Filter::Linear);
        assert_eq!(desc.mipmap_filter, Some(Filter::Linear));
        assert_eq!(desc.texel_type, TexelType::HalfFloat);
    }

    #[test]
    fn test_cube_target_reused_across_bakes() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        let s = settings(EnvironmentMode::Cubemap, 64);
        let first = baker.bake(&mut renderer, &s, &sky());
        let second = baker.bake(&mut renderer, &s, &sky());
        assert_eq!(first, second);
        assert_eq!(baker.stats().allocations, 1);
        assert_eq!(baker.stats().bakes, 2);
        assert_eq!(renderer.live.len(), 1);
    }

    #[test]
    fn test_resolution_changes_keep_one_live_target() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        let sizes = [16, 32, 64, 128, 256, 512, 1024, 2048];
        for size in sizes {
            baker.bake(&mut renderer, &settings(EnvironmentMode::Cubemap, size), &sky());
            assert_eq!(renderer.live.len(), 1);
            assert_eq!(baker.cube_resolution(), Some(size));
        }
        let stats = baker.stats();
        assert_eq!(stats.allocations, sizes.len() as u64);
        assert_eq!(stats.disposals, stats.allocations - 1);
        assert_eq!(stats.live(), 1);
    }

    #[test]
    fn test_pmrem_replaces_target_every_bake() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        let s = settings(EnvironmentMode::Pmrem, 64);
        let first = baker.bake(&mut renderer, &s, &sky());
        let second = baker.bake(&mut renderer, &s, &sky());
        assert_ne!(first, second);
        assert_eq!(renderer.live, vec![second.unwrap()]);
        assert_eq!(baker.stats().disposals, 1);
        assert_eq!(baker.live_mode(), Some(EnvironmentMode::Pmrem));
    }

    #[test]
    fn test_mode_switch_disposes_other_strategy() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        baker.bake(&mut renderer, &settings(EnvironmentMode::Cubemap, 64), &sky());
        baker.bake(&mut renderer, &settings(EnvironmentMode::Pmrem, 64), &sky());
        assert_eq!(renderer.live.len(), 1);
        assert_eq!(baker.cube_resolution(), None);

        baker.bake(&mut renderer, &settings(EnvironmentMode::Cubemap, 64), &sky());
        assert_eq!(renderer.live.len(), 1);
        assert_eq!(baker.live_mode(), Some(EnvironmentMode::Cubemap));
    }

    #[test]
    fn test_switch_to_pmrem_drops_cube_before_baking() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        baker.sync_targets(&mut renderer, &settings(EnvironmentMode::Cubemap, 64));
        assert_eq!(renderer.live.len(), 1);
        baker.sync_targets(&mut renderer, &settings(EnvironmentMode::Pmrem, 64));
        assert!(renderer.live.is_empty());
        assert_eq!(baker.environment(&renderer), None);
    }

    #[test]
    fn test_disabled_disposes_and_clears() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        baker.bake(&mut renderer, &settings(EnvironmentMode::Pmrem, 64), &sky());
        let mut off = settings(EnvironmentMode::Pmrem, 64);
        off.enabled = false;
        assert_eq!(baker.bake(&mut renderer, &off, &sky()), None);
        assert!(renderer.live.is_empty());
        assert_eq!(baker.live_mode(), None);
        assert_eq!(baker.stats().bakes, 1);
    }

    #[test]
    fn test_bake_uses_environment_disc_flag() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        let mut s = settings(EnvironmentMode::Cubemap, 32);
        s.show_sun_disc = false;
        let primary = sky();
        baker.bake(&mut renderer, &s, &primary);
        assert_eq!(renderer.captured_discs, vec![false]);
        assert!(primary.show_sun_disc, "caller's parameters must not change");
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut renderer = Recorder::default();
        let mut baker = EnvironmentBaker::new();
        baker.bake(&mut renderer, &settings(EnvironmentMode::Cubemap, 64), &sky());
        baker.shutdown(&mut renderer);
        assert!(renderer.live.is_empty());
        assert_eq!(baker.stats().live(), 0);
    }

    #[test]
    fn test_settings_from_config() {
        let env = EnvironmentConfig {
            enabled: true,
            pmrem: true,
            render_target_size: 128,
        };
        let sun = SunDiscConfig {
            show_in_sky: true,
            show_in_environment: false,
        };
        let s = EnvironmentSettings::from_config(&env, &sun);
        assert_eq!(s.mode, EnvironmentMode::Pmrem);
        assert_eq!(s.resolution, 128);
        assert!(!s.show_sun_disc);
    }
}
