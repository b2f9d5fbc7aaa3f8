//! Altitude-driven scattering parameters for the sky material.
//!
//! Rayleigh strength and Mie anisotropy peak while the sun sits on the
//! horizon (deep sunset colors, strong forward glow), settle to their minimum
//! once the sun clears about 11.5 degrees, and are cut off entirely a little
//! below the horizon so the night sky goes dark.

use skylight_config::AtmosphereConfig;

/// Altitude (radians) below the horizon at which scattering is fully cut off.
pub const DEFAULT_NEGATIVE_CUTOFF: f64 = 0.08;

/// Altitude (radians) above which the minimum value applies. The day blend
/// runs over `[0, BLEND_END)`, i.e. `t = 5x`.
pub const BLEND_END: f64 = 0.2;

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Piecewise-linear response with a hard night cutoff.
///
/// `x` is clamped to `[-1, 1]` first. Then, first match wins:
///
/// | range | result |
/// |---|---|
/// | `x <= -negative_cutoff` | `0` |
/// | `-negative_cutoff < x < 0` | ramp `0 -> max_val` |
/// | `0 <= x < 0.2` | ramp `max_val -> min_val` |
/// | `x >= 0.2` | `min_val` |
pub fn asymmetric_cutoff(x: f64, max_val: f64, min_val: f64, negative_cutoff: f64) -> f64 {
    let x = x.clamp(-1.0, 1.0);

    if x <= -negative_cutoff {
        0.0
    } else if x < 0.0 {
        lerp(0.0, max_val, (x + negative_cutoff) / negative_cutoff)
    } else if x < BLEND_END {
        lerp(max_val, min_val, x * 5.0)
    } else {
        min_val
    }
}

/// Scattering coefficients handed to the sky material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereParams {
    pub turbidity: f64,
    pub rayleigh: f64,
    pub mie_coefficient: f64,
    pub mie_directional_g: f64,
}

impl AtmosphereParams {
    /// Derive the coefficients for a sun at `altitude` radians.
    ///
    /// Turbidity and the Mie coefficient are passed through untouched.
    pub fn from_altitude(altitude: f64, config: &AtmosphereConfig) -> Self {
        Self {
            turbidity: config.turbidity,
            rayleigh: asymmetric_cutoff(
                altitude,
                config.rayleigh_max,
                config.rayleigh_min,
                DEFAULT_NEGATIVE_CUTOFF,
            ),
            mie_coefficient: config.mie_coefficient,
            mie_directional_g: asymmetric_cutoff(
                altitude,
                config.mie_directional_g_max,
                config.mie_directional_g_min,
                DEFAULT_NEGATIVE_CUTOFF,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f64 = 4.0;
    const MIN: f64 = 0.1;

    fn cutoff(x: f64) -> f64 {
        asymmetric_cutoff(x, MAX, MIN, DEFAULT_NEGATIVE_CUTOFF)
    }

    #[test]
    fn test_horizon_returns_max() {
        assert_eq!(cutoff(0.0), MAX);
    }

    #[test]
    fn test_night_is_exactly_zero() {
        for x in [-0.08, -0.1, -0.5, -1.0, -3.0, f64::NEG_INFINITY] {
            assert_eq!(cutoff(x), 0.0, "x = {x}");
        }
    }

    #[test]
    fn test_high_sun_is_exactly_min() {
        for x in [0.2, 0.5, 1.0, 1.5, 10.0] {
            assert_eq!(cutoff(x), MIN, "x = {x}");
        }
    }

    #[test]
    fn test_twilight_ramp() {
        let mid = cutoff(-0.04);
        assert!((mid - MAX * 0.5).abs() < 1e-12, "got {mid}");
        assert!(cutoff(-0.07) < cutoff(-0.01));
    }

    #[test]
    fn test_day_blend() {
        let mid = cutoff(0.1);
        assert!((mid - (MAX + MIN) * 0.5).abs() < 1e-12, "got {mid}");
    }

    #[test]
    fn test_continuity_at_breakpoints() {
        let eps = 1e-9;
        assert!((cutoff(-eps) - cutoff(0.0)).abs() < 1e-6);
        assert!((cutoff(BLEND_END - eps) - cutoff(BLEND_END)).abs() < 1e-6);
        assert!(cutoff(-DEFAULT_NEGATIVE_CUTOFF + eps).abs() < 1e-6);
    }

    #[test]
    fn test_custom_negative_cutoff() {
        assert!((asymmetric_cutoff(-0.15, 1.0, 0.5, 0.3) - 0.5).abs() < 1e-12);
        assert_eq!(asymmetric_cutoff(-0.3, 1.0, 0.5, 0.3), 0.0);
    }

    #[test]
    fn test_params_pass_through_and_map() {
        let config = AtmosphereConfig::default();
        let noon = AtmosphereParams::from_altitude(0.9, &config);
        assert_eq!(noon.turbidity, config.turbidity);
        assert_eq!(noon.mie_coefficient, config.mie_coefficient);
        assert_eq!(noon.rayleigh, config.rayleigh_min);
        assert_eq!(noon.mie_directional_g, config.mie_directional_g_min);

        let sunset = AtmosphereParams::from_altitude(0.0, &config);
        assert_eq!(sunset.rayleigh, config.rayleigh_max);
        assert_eq!(sunset.mie_directional_g, config.mie_directional_g_max);

        let night = AtmosphereParams::from_altitude(-0.3, &config);
        assert_eq!(night.rayleigh, 0.0);
        assert_eq!(night.mie_directional_g, 0.0);
        assert_eq!(night.turbidity, config.turbidity);
    }
}
