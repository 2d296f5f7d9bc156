use crate::models::estimate::{AqiCategory, AqiReading, EnvironmentalResult, PollutionEstimate};

/// Tonnes of CO₂ avoided per year per installed kW.
pub const CO2_TONS_PER_KW_YEAR: f64 = 1.5;
/// Trees needed to absorb one tonne of CO₂ per year.
pub const TREES_PER_TON_CO2: f64 = 45.0;
/// AQI points attributed to each tonne of CO₂ avoided (display estimate only).
pub const AQI_POINTS_PER_TON_CO2: f64 = 5.0;

pub fn assess(required_kw: f64) -> EnvironmentalResult {
    let co2_tons_per_year = required_kw * CO2_TONS_PER_KW_YEAR;
    let trees = (co2_tons_per_year * TREES_PER_TON_CO2).round().max(0.0);
    EnvironmentalResult {
        co2_tons_per_year,
        trees_equivalent: trees as u64,
    }
}

pub fn aqi_category(aqi: f64) -> AqiCategory {
    if aqi <= 50.0 {
        AqiCategory::Good
    } else if aqi <= 100.0 {
        AqiCategory::Moderate
    } else {
        AqiCategory::Unhealthy
    }
}

pub fn pollution_estimate(reading: &AqiReading, co2_tons_per_year: f64) -> PollutionEstimate {
    let reduction = co2_tons_per_year * AQI_POINTS_PER_TON_CO2;
    PollutionEstimate {
        original_aqi: reading.aqi,
        category: aqi_category(reading.aqi),
        reduction,
        remaining_aqi: (reading.aqi - reduction).max(0.0),
    }
}
