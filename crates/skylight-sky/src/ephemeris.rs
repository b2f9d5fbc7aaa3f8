//! Low-order solar ephemeris.
//!
//! Converts an observer location and a day-of-year / time-of-day pair into the
//! sun's altitude, azimuth and a unit direction vector. Declination and the
//! equation of time come from short Fourier fits in the fractional-year angle
//! (roughly 0.25 degrees of declination error), which is plenty for lighting
//! but is not an astronomical ephemeris: no refraction, no perturbations.
//!
//! Output frame: right-handed, Y up, Z north, X east. Azimuth is clockwise in
//! `[0, 2pi)` with east at pi/2, so the morning sun always has positive X and
//! the evening sun negative X.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::time::TimeState;

/// Minutes in a day.
const MINUTES_PER_DAY: f64 = 1440.0;

/// Clock minutes per degree of longitude.
const MINUTES_PER_DEGREE: f64 = 4.0;

/// Observer position on the globe, in degrees.
///
/// Not validated: latitudes beyond the poles still produce a defined (if
/// physically meaningless) sun position because every trig input downstream
/// is clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    /// Whether the coordinates lie on the globe.
    pub fn is_on_globe(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude_deg)
            && (-180.0..=180.0).contains(&self.longitude_deg)
    }
}

/// Sun position for one instant. Always recomputed as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunState {
    /// Unit-scaled sun position on the sky sphere.
    pub position: DVec3,
    /// Normalized direction towards the sun.
    pub direction: DVec3,
    /// Elevation above the horizon in radians, `[-pi/2, pi/2]`.
    pub altitude: f64,
    /// Clockwise-from-north azimuth in radians, `[0, 2pi)`.
    pub azimuth: f64,
}

impl SunState {
    /// Whether the sun is above the geometric horizon.
    pub fn is_up(&self) -> bool {
        self.altitude > 0.0
    }
}

/// Fractional-year angle in radians for a day of year.
pub fn fractional_year(day_of_year: u32) -> f64 {
    TAU * (f64::from(day_of_year) - 1.0) / 365.0
}

/// Solar declination in radians (Cooper-style six-term fit).
pub fn declination(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Equation of time in minutes.
pub fn equation_of_time(gamma: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// True solar time as a fraction of the day, wrapped into `[0, 1)`.
pub fn true_solar_time(time_of_day: f64, eq_time_minutes: f64, longitude_deg: f64) -> f64 {
    let tst = (time_of_day * MINUTES_PER_DAY
        + eq_time_minutes
        + MINUTES_PER_DEGREE * longitude_deg)
        / MINUTES_PER_DAY;
    tst.rem_euclid(1.0)
}

/// Hour angle in radians: zero at local solar noon, growing westward.
pub fn hour_angle(true_solar_time: f64) -> f64 {
    TAU * (true_solar_time - 0.5)
}

/// Compute the sun's position for the given clock and observer.
pub fn compute_sun_position(time: &TimeState, geo: &GeoLocation) -> SunState {
    let lat = geo.latitude_deg.to_radians();

    let gamma = fractional_year(time.day_of_year);
    let dec = declination(gamma);
    let eq_time = equation_of_time(gamma);

    let tst = true_solar_time(time.time_of_day, eq_time, geo.longitude_deg);
    let h = hour_angle(tst);

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    // Half-turn shift moves the atan2 branch cut so the result lands in [0, 2pi).
    let az = h.sin().atan2(-h.cos() * lat.sin() - dec.tan() * lat.cos());
    let azimuth = (az + PI).rem_euclid(TAU);

    let cos_alt = altitude.cos();
    let position = DVec3::new(
        cos_alt * azimuth.sin(),
        altitude.sin(),
        cos_alt * azimuth.cos(),
    );

    SunState {
        position,
        direction: position.normalize(),
        altitude,
        azimuth,
    }
}
