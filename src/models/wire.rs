//! JSON shapes returned by the external lookups.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::estimate::{AqiReading, Coordinates};

// ─── NASA POWER (daily point) ────────────────────────────────────────────────

/// POWER marks missing days with this value.
pub const POWER_FILL_VALUE: f64 = -999.0;

#[derive(Debug, Deserialize)]
pub struct PowerDailyResponse {
    pub properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
pub struct PowerProperties {
    pub parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
pub struct PowerParameters {
    /// All-sky surface shortwave downward irradiance, keyed by `YYYYMMDD` (kWh/m²/day)
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    pub allsky_sfc_sw_dwn: BTreeMap<String, f64>,
}

impl PowerDailyResponse {
    /// Mean of the valid daily values, `None` when no day carries data.
    pub fn mean_daily_insolation(&self) -> Option<f64> {
        let valid: Vec<f64> = self
            .properties
            .parameter
            .allsky_sfc_sw_dwn
            .values()
            .copied()
            .filter(|v| v.is_finite() && *v != POWER_FILL_VALUE && *v >= 0.0)
            .collect();
        if valid.is_empty() {
            return None;
        }
        Some(valid.iter().sum::<f64>() / valid.len() as f64)
    }
}

// ─── WAQI feed ───────────────────────────────────────────────────────────────

/// `data` is an object on success and an error string otherwise, and `aqi`
/// may be `"-"` when the station has no reading, so it stays loosely typed.
#[derive(Debug, Deserialize)]
pub struct WaqiFeedResponse {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WaqiFeedResponse {
    pub fn reading(&self) -> Option<AqiReading> {
        if self.status != "ok" {
            return None;
        }
        let aqi = self.data.get("aqi")?.as_f64().filter(|v| *v >= 0.0)?;
        let city_name = self
            .data
            .get("city")
            .and_then(|c| c.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        Some(AqiReading { aqi, city_name })
    }
}

// ─── Nominatim search ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl NominatimPlace {
    pub fn coordinates(&self) -> Option<Coordinates> {
        let coords = Coordinates {
            lat: self.lat.trim().parse().ok()?,
            lon: self.lon.trim().parse().ok()?,
        };
        coords.is_valid().then_some(coords)
    }
}
