use std::collections::HashSet;

use skylight_config::{Config, ToneMapping};
use skylight_sky::{
    ChangeEvent, CubeTargetDescriptor, EnvironmentRenderer, ParamValue, RecomputeStages,
    SkyMaterialParams, SkyScheduler,
};

/// Tracks live handles and rejects use-after-dispose.
#[derive(Default)]
struct Ledger {
    next_id: u64,
    live: HashSet<u64>,
    resolutions: Vec<u32>,
    bakes: u32,
}

impl Ledger {
    fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.next_id
    }

    fn free(&mut self, id: u64) {
        assert!(self.live.remove(&id), "target {id} disposed twice");
    }
}

impl EnvironmentRenderer for Ledger {
    type CubeTarget = u64;
    type IrradianceTarget = u64;
    type Texture = u64;

    fn create_cube_target(&mut self, desc: &CubeTargetDescriptor) -> u64 {
        self.resolutions.push(desc.resolution);
        self.alloc()
    }

    fn capture_cube(&mut self, target: &mut u64, _sky: &SkyMaterialParams) {
        assert!(self.live.contains(target), "capture into disposed target");
        self.bakes += 1;
    }

    fn cube_texture(&self, target: &u64) -> u64 {
        *target
    }

    fn bake_irradiance(&mut self, _sky: &SkyMaterialParams) -> u64 {
        self.bakes += 1;
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

#[test]
fn reference_scene_produces_lit_late_morning_sky() {
    let mut renderer = Ledger::default();
    let mut scheduler = SkyScheduler::new(Config::default(), &mut renderer);
    let command = scheduler.tick(&mut renderer, 0.0);

    let sun = scheduler.sun();
    let altitude = sun.altitude.to_degrees();
    assert!((25.0..45.0).contains(&altitude), "altitude {altitude}");
    assert!(sun.position.x > 0.0, "late-morning sun should sit east");
    assert!((sun.direction.length() - 1.0).abs() < 1e-9);

    // High sun: scattering sits at the clear-sky end of each range.
    assert_eq!(command.sky.rayleigh, 0.1);
    assert_eq!(command.sky.mie_directional_g, 0.06);
    assert!(command.light.intensity > 0.0);
    assert_eq!(command.environment, Some(1));
    assert_eq!(renderer.resolutions, vec![64]);
}

#[test]
fn resolution_changes_keep_exactly_one_target() {
    let mut renderer = Ledger::default();
    let mut scheduler = SkyScheduler::new(Config::default(), &mut renderer);

    let sizes = [128, 256, 32, 2048, 16, 64];
    for size in sizes {
        let event = ChangeEvent::parse("renderTargetSize", ParamValue::Number(f64::from(size)))
            .expect("valid size");
        scheduler.apply(&mut renderer, event);
        assert_eq!(renderer.live.len(), 1);
        assert_eq!(scheduler.bake_stats().live(), 1);
    }

    let stats = scheduler.bake_stats();
    assert_eq!(stats.allocations, sizes.len() as u64 + 1);
    assert_eq!(stats.disposals, stats.allocations - 1);
    assert_eq!(renderer.resolutions.last(), Some(&64));

    scheduler.shutdown(&mut renderer);
    assert!(renderer.live.is_empty());
}

#[test]
fn invalid_events_leave_state_untouched() {
    let mut renderer = Ledger::default();
    let mut scheduler = SkyScheduler::new(Config::default(), &mut renderer);
    let before = scheduler.config().clone();

    assert!(ChangeEvent::parse("renderTargetSize", ParamValue::Number(100.0)).is_err());
    assert!(ChangeEvent::parse("dayOfYear", ParamValue::Number(366.0)).is_err());
    assert!(ChangeEvent::parse("timeSpeed", ParamValue::Number(-1.0)).is_err());
    assert!(ChangeEvent::parse("noSuchKey", ParamValue::Bool(true)).is_err());

    assert_eq!(scheduler.config(), &before);
    assert_eq!(renderer.bakes, 1);
}

#[test]
fn full_day_cycle_wraps_once_and_keeps_light_nonnegative() {
    let mut config = Config::default();
    config.time.time_of_day = 0.0;
    config.time.day_of_year = 365;
    config.time.time_speed = 0.05;
    config.environment.pmrem = true;

    let mut renderer = Ledger::default();
    let mut scheduler = SkyScheduler::new(config, &mut renderer);

    let mut saw_night = false;
    let mut saw_day = false;
    for frame in 0..=21 {
        let command = scheduler.tick(&mut renderer, f64::from(frame));
        assert_eq!(command.recomputed, RecomputeStages::FULL);
        assert!(command.light.intensity >= 0.0);
        saw_night |= !scheduler.sun().is_up();
        saw_day |= scheduler.sun().is_up();
        assert_eq!(renderer.live.len(), 1);
    }

    assert!(saw_night && saw_day);
    assert_eq!(scheduler.time().day_of_year, 0);
    assert!(scheduler.time().time_of_day < 0.1);
}

#[test]
fn tone_mapping_event_only_touches_render_settings() {
    let mut renderer = Ledger::default();
    let mut scheduler = SkyScheduler::new(Config::default(), &mut renderer);
    scheduler.tick(&mut renderer, 0.0);

    let event = ChangeEvent::parse("toneMapping", ParamValue::Text("agx".into())).expect("known");
    let stages = scheduler.apply(&mut renderer, event);
    assert_eq!(stages, Some(RecomputeStages::TONE_MAPPING));

    let command = scheduler.tick(&mut renderer, 1.0);
    assert_eq!(command.tone_mapping, ToneMapping::AgX);
    assert_eq!(command.recomputed, RecomputeStages::TONE_MAPPING);
    assert_eq!(renderer.bakes, 1);
}
