//! Simulation clock: time of day, day of year and advance rate.

use skylight_config::TimeConfig;

/// Number of distinct day values before the day counter wraps to 0.
pub const DAYS_PER_CYCLE: u32 = 366;

/// Clock state mutated by the scheduler.
///
/// `day_of_year` cycles through `0..=365`. Day 0 lands on the same Fourier
/// phase as day 365, so the ephemeris treats it as the last day of the
/// previous year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeState {
    /// Fraction of the day in `[0, 1)`.
    pub time_of_day: f64,
    /// Day of year, `0..=365`.
    pub day_of_year: u32,
    /// Days advanced per second of wall-clock time.
    pub time_speed: f64,
}

/// Outcome of [`TimeState::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// `time_speed` is zero; nothing moved.
    Static,
    /// Time moved within the same day.
    Moved,
    /// Time crossed midnight and the day counter stepped.
    DayWrapped,
}

impl TimeState {
    pub fn from_config(config: &TimeConfig) -> Self {
        Self {
            time_of_day: config.time_of_day,
            day_of_year: config.day_of_year,
            time_speed: config.time_speed,
        }
    }

    /// Whether ticks move the clock.
    pub fn is_advancing(&self) -> bool {
        self.time_speed > 0.0
    }

    /// Advance the clock by `delta_seconds` of wall-clock time.
    ///
    /// At most one midnight is crossed per call, matching a per-frame driver
    /// where `delta_seconds * time_speed` stays well below a day.
    pub fn advance(&mut self, delta_seconds: f64) -> Advance {
        if !self.is_advancing() {
            return Advance::Static;
        }

        self.time_of_day += delta_seconds * self.time_speed;
        if self.time_of_day > 1.0 {
            self.time_of_day -= 1.0;
            self.day_of_year = next_day(self.day_of_year);
            return Advance::DayWrapped;
        }
        Advance::Moved
    }
}

/// Day counter after one midnight. Out-of-cycle inputs are folded back in
/// first.
pub fn next_day(day_of_year: u32) -> u32 {
    (day_of_year % DAYS_PER_CYCLE + 1) % DAYS_PER_CYCLE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(time_of_day: f64, day_of_year: u32, time_speed: f64) -> TimeState {
        TimeState {
            time_of_day,
            day_of_year,
            time_speed,
        }
    }

    #[test]
    fn test_static_clock_does_not_move() {
        let mut t = state(0.4, 242, 0.0);
        assert_eq!(t.advance(10.0), Advance::Static);
        assert_eq!(t, state(0.4, 242, 0.0));
    }

    #[test]
    fn test_advance_within_day() {
        let mut t = state(0.25, 100, 0.5);
        assert_eq!(t.advance(0.1), Advance::Moved);
        assert!((t.time_of_day - 0.3).abs() < 1e-12);
        assert_eq!(t.day_of_year, 100);
    }

    #[test]
    fn test_wrap_at_year_end_goes_to_day_zero() {
        let mut t = state(0.995, 365, 1.0);
        assert_eq!(t.advance(0.02), Advance::DayWrapped);
        assert!((t.time_of_day - 0.015).abs() < 1e-9, "got {}", t.time_of_day);
        assert_eq!(t.day_of_year, 0);
    }

    #[test]
    fn test_next_day_folds_out_of_cycle_days() {
        assert_eq!(next_day(0), 1);
        assert_eq!(next_day(365), 0);
        assert_eq!(next_day(366), 1);
        assert_eq!(
            next_day(u32::MAX),
            (u32::MAX % DAYS_PER_CYCLE + 1) % DAYS_PER_CYCLE
        );

        let mut t = state(0.999, u32::MAX, 1.0);
        assert_eq!(t.advance(0.01), Advance::DayWrapped);
        assert!(t.day_of_year < DAYS_PER_CYCLE);
    }

    #[test]
    fn test_wrap_mid_year_increments_day() {
        let mut t = state(0.99, 242, 1.0);
        assert_eq!(t.advance(0.02), Advance::DayWrapped);
        assert_eq!(t.day_of_year, 243);
    }

    #[test]
    fn test_exactly_one_is_not_a_wrap() {
        let mut t = state(0.5, 10, 1.0);
        assert_eq!(t.advance(0.5), Advance::Moved);
        assert_eq!(t.time_of_day, 1.0);
        assert_eq!(t.day_of_year, 10);
    }

    #[test]
    fn test_next_day_cycle() {
        assert_eq!(next_day(0), 1);
        assert_eq!(next_day(364), 365);
        assert_eq!(next_day(365), 0);
    }

    #[test]
    fn test_from_config() {
        let t = TimeState::from_config(&TimeConfig::default());
        assert_eq!(t, state(0.4, 242, 0.0));
        assert!(!t.is_advancing());
    }
}
