//! Frame-driven scheduler tying the pipeline together.
//!
//! [`SkyScheduler`] owns the configuration and every derived snapshot. The
//! caller owns the frame loop and the renderer: it calls
//! [`tick`](SkyScheduler::tick) once per frame with a monotonically increasing
//! timestamp and feeds user edits through [`apply`](SkyScheduler::apply).
//!
//! Pipeline order for a full recompute: ephemeris, atmosphere, sky material,
//! directional light, water surface, environment bake.

use skylight_config::{Config, ToneMapping};

use crate::atmosphere::AtmosphereParams;
use crate::environment::{BakeStats, EnvironmentBaker, EnvironmentRenderer, EnvironmentSettings};
use crate::ephemeris::{GeoLocation, SunState, compute_sun_position};
use crate::events::{ChangeEvent, RecomputeStages};
use crate::light::{LightState, couple_light};
use crate::sky::SkyMaterialParams;
use crate::time::{Advance, TimeState};
use crate::water::WaterSurface;

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCommand<T> {
    /// Sky material, with the primary-view disc visibility.
    pub sky: SkyMaterialParams,
    pub light: LightState,
    /// Texture for the scene's environment slot; `None` when disabled.
    pub environment: Option<T>,
    pub water: WaterSurface,
    pub tone_mapping: ToneMapping,
    pub exposure: f64,
    /// Stages that ran since the previous command.
    pub recomputed: RecomputeStages,
}

/// Drives the sun, sky, light and environment from the clock and user edits.
pub struct SkyScheduler<R: EnvironmentRenderer> {
    config: Config,
    sun: SunState,
    atmosphere: AtmosphereParams,
    sky: SkyMaterialParams,
    light: LightState,
    water: WaterSurface,
    baker: EnvironmentBaker<R>,
    last_timestamp: Option<f64>,
    pending: RecomputeStages,
}

impl<R: EnvironmentRenderer> SkyScheduler<R> {
    /// Build the scheduler and run the full pipeline once, including the
    /// first bake.
    pub fn new(config: Config, renderer: &mut R) -> Self {
        let time = TimeState::from_config(&config.time);
        let geo = GeoLocation::new(config.location.lat, config.location.lon);
        warn_if_off_globe(&geo);

        let sun = compute_sun_position(&time, &geo);
        let atmosphere = AtmosphereParams::from_altitude(sun.altitude, &config.atmosphere);
        let sky = SkyMaterialParams::new(&sun, &atmosphere, config.sun.show_in_sky);
        let light = couple_light(&sun, config.light.intensity_modifier, config.light.enabled);
        let water = WaterSurface::from_config(&config.water, sun.direction);

        let mut scheduler = Self {
            config,
            sun,
            atmosphere,
            sky,
            light,
            water,
            baker: EnvironmentBaker::new(),
            last_timestamp: None,
            pending: RecomputeStages::NONE,
        };
        scheduler.recompute(renderer);
        log::info!(
            "Sky scheduler ready: sun altitude {:.2} deg, azimuth {:.2} deg",
            scheduler.sun.altitude.to_degrees(),
            scheduler.sun.azimuth.to_degrees()
        );
        scheduler
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn time(&self) -> TimeState {
        TimeState::from_config(&self.config.time)
    }

    pub fn geo(&self) -> GeoLocation {
        GeoLocation::new(self.config.location.lat, self.config.location.lon)
    }

    pub fn sun(&self) -> SunState {
        self.sun
    }

    pub fn atmosphere(&self) -> AtmosphereParams {
        self.atmosphere
    }

    pub fn sky(&self) -> SkyMaterialParams {
        self.sky
    }

    pub fn light(&self) -> LightState {
        self.light
    }

    pub fn water(&self) -> WaterSurface {
        self.water
    }

    pub fn bake_stats(&self) -> BakeStats {
        self.baker.stats()
    }

    pub fn environment_settings(&self) -> EnvironmentSettings {
        EnvironmentSettings::from_config(&self.config.environment, &self.config.sun)
    }

    /// Advance one frame.
    ///
    /// The first call has no previous timestamp and counts as zero elapsed
    /// time. While the clock is advancing every tick reruns the full
    /// pipeline, bake included; a static clock recomputes nothing here.
    pub fn tick(&mut self, renderer: &mut R, timestamp_seconds: f64) -> RenderCommand<R::Texture> {
        let delta = match self.last_timestamp {
            Some(previous) => (timestamp_seconds - previous).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_seconds);

        let mut time = self.time();
        match time.advance(delta) {
            Advance::Static => {}
            advance => {
                if advance == Advance::DayWrapped {
                    log::debug!("Day wrapped to {}", time.day_of_year);
                }
                self.config.time.time_of_day = time.time_of_day;
                self.config.time.day_of_year = time.day_of_year;
                self.run_stages(renderer, RecomputeStages::FULL);
            }
        }

        self.command(renderer)
    }

    /// Apply one user edit and rerun the stages it affects.
    ///
    /// Returns `None` without touching anything when the value is unchanged.
    pub fn apply(&mut self, renderer: &mut R, event: ChangeEvent) -> Option<RecomputeStages> {
        if !event.apply_to(&mut self.config) {
            return None;
        }
        log::debug!("Applied {event:?}");
        if matches!(event, ChangeEvent::Latitude(_) | ChangeEvent::Longitude(_)) {
            warn_if_off_globe(&self.geo());
        }

        let stages = event.stages();
        self.run_stages(renderer, stages);
        Some(stages)
    }

    /// Rerun the whole pipeline once.
    pub fn recompute(&mut self, renderer: &mut R) {
        self.run_stages(renderer, RecomputeStages::FULL);
    }

    /// Snapshot of the current outputs. Clears the recomputed-stages record.
    pub fn command(&mut self, renderer: &R) -> RenderCommand<R::Texture> {
        RenderCommand {
            sky: self.sky,
            light: self.light,
            environment: self.baker.environment(renderer),
            water: self.water,
            tone_mapping: self.config.render.tone_mapping,
            exposure: self.config.render.exposure,
            recomputed: std::mem::take(&mut self.pending),
        }
    }

    /// Release the environment target before the renderer is dropped.
    pub fn shutdown(&mut self, renderer: &mut R) {
        self.baker.shutdown(renderer);
    }

    fn run_stages(&mut self, renderer: &mut R, stages: RecomputeStages) {
        if stages.sun {
            self.sun = compute_sun_position(&self.time(), &self.geo());
            self.atmosphere =
                AtmosphereParams::from_altitude(self.sun.altitude, &self.config.atmosphere);
            self.sky = SkyMaterialParams::new(&self.sun, &self.atmosphere, self.config.sun.show_in_sky);
            log::trace!(
                "Sun at {:.3} rad altitude, rayleigh {:.3}",
                self.sun.altitude,
                self.atmosphere.rayleigh
            );
        }
        if stages.light {
            self.light = couple_light(
                &self.sun,
                self.config.light.intensity_modifier,
                self.config.light.enabled,
            );
        }
        if stages.water {
            self.water = WaterSurface::from_config(&self.config.water, self.sun.direction);
        }
        if stages.environment {
            let settings = self.environment_settings();
            self.sky.show_sun_disc = self.config.sun.show_in_sky;
            // The baker takes its own copy with the environment disc flag.
            self.baker.bake(renderer, &settings, &self.sky);
        }
        if stages.tone_mapping {
            log::debug!(
                "Tone mapping {} at exposure {}",
                self.config.render.tone_mapping,
                self.config.render.exposure
            );
        }

        self.pending = merge(self.pending, stages);
    }
}

fn merge(a: RecomputeStages, b: RecomputeStages) -> RecomputeStages {
    RecomputeStages {
        sun: a.sun || b.sun,
        environment: a.environment || b.environment,
        light: a.light || b.light,
        water: a.water || b.water,
        tone_mapping: a.tone_mapping || b.tone_mapping,
    }
}

fn warn_if_off_globe(geo: &GeoLocation) {
    if !geo.is_on_globe() {
        log::warn!(
            "Location ({}, {}) is off the globe; sun position will be degenerate",
            geo.latitude_deg,
            geo.longitude_deg
        );
    }
}
