//! Illustrative comparisons for the results page. Pure display derivations.

use crate::models::estimate::{GamificationResult, OffWorldEstimate};

/// Daily yield per kW for the comparisons. Independent of the site insolation.
pub const REFERENCE_YIELD_KWH_PER_KW_DAY: f64 = 4.5;
/// Perseverance rover daily energy budget (kWh).
pub const ROVER_KWH_PER_DAY: f64 = 2.5;
/// ISS array output (kW).
pub const ISS_POWER_KW: f64 = 120.0;

const MARS_SIZE_FACTOR: f64 = 2.3;
const MOON_SIZE_FACTOR: f64 = 1.1;
const BATTERY_KWH_PER_KW: f64 = 10.0;
const MARS_STORAGE_DAYS: f64 = 5.0;
const MOON_STORAGE_DAYS: f64 = 20.0;

pub fn compare(required_kw: f64) -> GamificationResult {
    let annual_kwh = required_kw * REFERENCE_YIELD_KWH_PER_KW_DAY * 365.0;
    GamificationResult {
        annual_kwh,
        rover_equivalent_days: annual_kwh / ROVER_KWH_PER_DAY,
        iss_equivalent_seconds: (required_kw / ISS_POWER_KW) * 3600.0,
        mars: OffWorldEstimate {
            system_kw: required_kw * MARS_SIZE_FACTOR,
            battery_kwh: required_kw * BATTERY_KWH_PER_KW * MARS_STORAGE_DAYS,
        },
        moon: OffWorldEstimate {
            system_kw: required_kw * MOON_SIZE_FACTOR,
            battery_kwh: required_kw * BATTERY_KWH_PER_KW * MOON_STORAGE_DAYS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rover_and_iss_equivalents() {
        let g = compare(2.5);
        assert!((g.annual_kwh - 4106.25).abs() < 1e-9);
        assert!((g.rover_equivalent_days - 1642.5).abs() < 1e-9);
        assert!((g.iss_equivalent_seconds - 75.0).abs() < 1e-9);
    }

    #[test]
    fn off_world_multipliers() {
        let g = compare(2.0);
        assert!((g.mars.system_kw - 4.6).abs() < 1e-12);
        assert_eq!(g.mars.battery_kwh, 100.0);
        assert!((g.moon.system_kw - 2.2).abs() < 1e-12);
        assert_eq!(g.moon.battery_kwh, 400.0);
    }

    #[test]
    fn uses_fixed_yield_not_site_insolation() {
        // Same kW always gives the same annual figure, whatever the site.
        assert_eq!(compare(1.0).annual_kwh, 4.5 * 365.0);
    }
}
