//! The binary entry point for skylight.

use std::process::ExitCode;

use clap::Parser;
use skylight_app::frame_clock::FrameClock;
use skylight_app::headless::{RecordingRenderer, run_frames};
use skylight_app::platform::{PlatformDirs, PlatformError};
use skylight_config::{CliArgs, Config, ConfigError};
use skylight_render::{GpuContext, GpuContextError, WgpuEnvironmentRenderer};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gpu(#[from] GpuContextError),

    #[error("--fps must be a positive number, got {0}")]
    InvalidFps(f64),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("skylight: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let mut dirs = PlatformDirs::resolve()?;
    if let Some(config_dir) = &args.config {
        dirs = dirs.with_config_dir(config_dir.clone());
    }
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    skylight_log::init_logging(Some(&dirs.log_dir), true, Some(&config));
    info!("Skylight v{}", env!("CARGO_PKG_VERSION"));
    info!("  config: {}", dirs.config_dir.display());
    info!("  logs:   {}", dirs.log_dir.display());

    let mut clock = FrameClock::new(args.fps, !args.dry_run).ok_or(AppError::InvalidFps(args.fps))?;

    if args.dry_run {
        info!("Dry run: environment bakes are recorded, not rendered");
        let mut renderer = RecordingRenderer::default();
        run_frames(&mut renderer, config, args.frames, &mut clock, |_, _| {});
    } else {
        let mut renderer = WgpuEnvironmentRenderer::new(GpuContext::new_headless()?);
        run_frames(
            &mut renderer,
            config,
            args.frames,
            &mut clock,
            |renderer, command| renderer.upload_light(&command.light),
        );
        renderer.wait_idle();
    }

    Ok(())
}
