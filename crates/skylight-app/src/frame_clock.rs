//! Frame timestamps for the headless loop.
//!
//! Paced clocks sleep to the target frame rate and report wall-clock time;
//! unpaced clocks report ideal timestamps `frame / fps` without waiting.

use std::time::{Duration, Instant};
use tracing::warn;

/// Frame time above which a paced frame is reported as slow.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Supplies monotonically increasing timestamps in seconds.
pub struct FrameClock {
    fps: f64,
    paced: bool,
    start: Instant,
    previous: f64,
    frame_count: u64,
}

impl FrameClock {
    /// `fps` must be positive and finite.
    pub fn new(fps: f64, paced: bool) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        Some(Self {
            fps,
            paced,
            start: Instant::now(),
            previous: 0.0,
            frame_count: 0,
        })
    }

    pub fn frame_duration(&self) -> f64 {
        1.0 / self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Timestamp of the next frame. Unpaced clocks start at `0.0`.
    pub fn next_timestamp(&mut self) -> f64 {
        let target = self.frame_count as f64 * self.frame_duration();
        self.frame_count += 1;

        let timestamp = if self.paced {
            let elapsed = self.start.elapsed().as_secs_f64();
            if elapsed < target {
                std::thread::sleep(Duration::from_secs_f64(target - elapsed));
            }
            let now = self.start.elapsed().as_secs_f64();
            let frame_time = now - self.previous;
            if self.frame_count > 1 && frame_time > MAX_FRAME_TIME {
                warn!(
                    "Frame time {:.1}ms exceeds {:.1}ms",
                    frame_time * 1000.0,
                    MAX_FRAME_TIME * 1000.0
                );
            }
            now
        } else {
            target
        };

        // Instant is monotonic, but never hand out a step backwards.
        let timestamp = timestamp.max(self.previous);
        self.previous = timestamp;
        timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_fps() {
        assert!(FrameClock::new(0.0, false).is_none());
        assert!(FrameClock::new(-30.0, false).is_none());
        assert!(FrameClock::new(f64::NAN, false).is_none());
        assert!(FrameClock::new(f64::INFINITY, false).is_none());
    }

    #[test]
    fn test_unpaced_timestamps_are_ideal() {
        let mut clock = FrameClock::new(50.0, false).unwrap();
        let stamps: Vec<f64> = (0..4).map(|_| clock.next_timestamp()).collect();
        assert_eq!(stamps[0], 0.0);
        assert!((stamps[1] - 0.02).abs() < 1e-12);
        assert!((stamps[3] - 0.06).abs() < 1e-12);
        assert_eq!(clock.frame_count(), 4);
    }

    #[test]
    fn test_paced_timestamps_are_monotonic() {
        let mut clock = FrameClock::new(1000.0, true).unwrap();
        let mut previous = clock.next_timestamp();
        for _ in 0..5 {
            let now = clock.next_timestamp();
            assert!(now >= previous, "{now} < {previous}");
            previous = now;
        }
        assert!(previous >= 0.005 - 1e-9);
    }
}
