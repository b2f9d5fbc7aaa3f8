//! Skylight application: platform directories, the frame clock and the
//! headless loop that drives the sky scheduler.

pub mod frame_clock;
pub mod headless;
pub mod platform;
