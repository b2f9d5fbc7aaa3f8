//! Headless frame loop shared by the GPU and dry-run paths.

use skylight_config::Config;
use skylight_sky::{
    BakeStats, CubeTargetDescriptor, EnvironmentRenderer, RenderCommand, SkyMaterialParams,
    SkyScheduler,
};
use tracing::{debug, info};

use crate::frame_clock::FrameClock;

/// Renderer stand-in that only hands out numbered targets.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_id: u64,
    live: Vec<u64>,
    captures: u64,
    irradiance_bakes: u64,
}

impl RecordingRenderer {
    pub fn live_targets(&self) -> usize {
        self.live.len()
    }

    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn irradiance_bakes(&self) -> u64 {
        self.irradiance_bakes
    }

    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.live.push(self.next_id);
        self.next_id
    }

    fn free(&mut self, id: u64) {
        self.live.retain(|&live| live != id);
    }
}

impl EnvironmentRenderer for RecordingRenderer {
    type CubeTarget = u64;
    type IrradianceTarget = u64;
    type Texture = u64;

    fn create_cube_target(&mut self, desc: &CubeTargetDescriptor) -> u64 {
        debug!("Recording {}x{} cube target", desc.resolution, desc.resolution);
        self.alloc()
    }

    fn capture_cube(&mut self, _target: &mut u64, _sky: &SkyMaterialParams) {
        self.captures += 1;
    }

    fn cube_texture(&self, target: &u64) -> u64 {
        *target
    }

    fn bake_irradiance(&mut self, _sky: &SkyMaterialParams) -> u64 {
        self.irradiance_bakes += 1;
        self.alloc()
    }

    fn irradiance_texture(&self, target: &u64) -> u64 {
        *target
    }

    fn dispose_cube(&mut self, target: u64) {
        self.free(target);
    }

    fn dispose_irradiance(&mut self, target: u64) {
        self.free(target);
    }
}

/// End-of-run figures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
    pub rayleigh: f64,
    pub light_intensity: f64,
    pub time_of_day: f64,
    pub day_of_year: u32,
    pub bakes: BakeStats,
}

/// Tick the scheduler `frames` times, then release the environment target.
///
/// `on_frame` sees every frame's command, e.g. to upload the light.
pub fn run_frames<R, F>(
    renderer: &mut R,
    config: Config,
    frames: u32,
    clock: &mut FrameClock,
    mut on_frame: F,
) -> RunSummary
where
    R: EnvironmentRenderer,
    F: FnMut(&mut R, &RenderCommand<R::Texture>),
{
    let mut scheduler = SkyScheduler::new(config, renderer);

    for frame in 0..frames {
        let timestamp = clock.next_timestamp();
        let command = scheduler.tick(renderer, timestamp);
        debug!(
            frame,
            timestamp,
            recomputed = !command.recomputed.is_empty(),
            rayleigh = command.sky.rayleigh,
            light = command.light.intensity,
            environment = command.environment.is_some(),
            "Frame"
        );
        on_frame(renderer, &command);
    }

    let sun = scheduler.sun();
    let time = scheduler.time();
    let summary = RunSummary {
        frames,
        altitude_deg: sun.altitude.to_degrees(),
        azimuth_deg: sun.azimuth.to_degrees(),
        rayleigh: scheduler.atmosphere().rayleigh,
        light_intensity: scheduler.light().intensity,
        time_of_day: time.time_of_day,
        day_of_year: time.day_of_year,
        bakes: scheduler.bake_stats(),
    };
    scheduler.shutdown(renderer);

    info!(
        "{} frames: sun altitude {:.2} deg, azimuth {:.2} deg, rayleigh {:.3}, light {:.3}, day {} at {:.4}",
        summary.frames,
        summary.altitude_deg,
        summary.azimuth_deg,
        summary.rayleigh,
        summary.light_intensity,
        summary.day_of_year,
        summary.time_of_day
    );
    info!(
        "Environment: {} allocations, {} disposals, {} bakes",
        summary.bakes.allocations, summary.bakes.disposals, summary.bakes.bakes
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> FrameClock {
        FrameClock::new(60.0, false).unwrap()
    }

    #[test]
    fn test_static_run_bakes_once_and_cleans_up() {
        let mut renderer = RecordingRenderer::default();
        let summary = run_frames(&mut renderer, Config::default(), 30, &mut clock(), |_, _| {});

        assert_eq!(summary.bakes.bakes, 1);
        assert_eq!(summary.bakes.live(), 0);
        assert_eq!(renderer.live_targets(), 0);
        assert_eq!(renderer.captures(), 1);
        assert!(summary.altitude_deg > 0.0);
        assert_eq!(summary.rayleigh, 0.1);
    }

    #[test]
    fn test_advancing_run_bakes_every_frame() {
        let mut config = Config::default();
        config.time.time_speed = 0.001;
        config.environment.pmrem = true;

        let mut renderer = RecordingRenderer::default();
        let summary = run_frames(&mut renderer, config, 10, &mut clock(), |_, _| {});

        // One bake at startup plus one per tick.
        assert_eq!(summary.bakes.bakes, 11);
        assert_eq!(renderer.irradiance_bakes(), 11);
        assert_eq!(summary.bakes.allocations, summary.bakes.disposals);
        assert!(summary.time_of_day > 0.4);
    }

    #[test]
    fn test_frame_hook_sees_every_command() {
        let mut renderer = RecordingRenderer::default();
        let mut lights = Vec::new();
        run_frames(&mut renderer, Config::default(), 4, &mut clock(), |_, command| {
            lights.push(command.light.intensity);
        });

        assert_eq!(lights.len(), 4);
        assert!(lights.iter().all(|&intensity| intensity > 0.0));
    }

    #[test]
    fn test_disabled_environment_never_allocates() {
        let mut config = Config::default();
        config.environment.enabled = false;

        let mut renderer = RecordingRenderer::default();
        let summary = run_frames(&mut renderer, config, 5, &mut clock(), |_, _| {});
        assert_eq!(summary.bakes.allocations, 0);
        assert_eq!(renderer.captures(), 0);
    }
}
