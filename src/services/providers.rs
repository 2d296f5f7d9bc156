use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{EstimatorError, ProviderError};
use crate::models::estimate::{AqiReading, Coordinates, IrradianceReading};
use crate::models::wire::{NominatimPlace, PowerDailyResponse, WaqiFeedResponse};

// ─── Seams ───────────────────────────────────────────────────────────────────

/// Turns a free-text address into coordinates. Failure aborts the calculation.
pub trait LocationResolver: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Coordinates, EstimatorError>> + Send;
}

pub trait IrradianceProvider: Send + Sync {
    fn average_insolation(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = Result<IrradianceReading, ProviderError>> + Send;
}

/// `Ok(None)` means the station answered but has no usable reading.
pub trait AirQualityProvider: Send + Sync {
    fn current_aqi(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = Result<Option<AqiReading>, ProviderError>> + Send;
}

// ─── HTTP implementations ────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NasaPowerClient {
    client: reqwest::Client,
    base_url: String,
    reference_year: i32,
    offline: Arc<AtomicBool>,
}

#[derive(Clone, Debug)]
pub struct WaqiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    offline: Arc<AtomicBool>,
}

#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    offline: Arc<AtomicBool>,
}

/// The three live lookups sharing one HTTP client and the offline switch.
#[derive(Clone, Debug)]
pub struct Providers {
    pub geocoder: NominatimGeocoder,
    pub irradiance: NasaPowerClient,
    pub air_quality: WaqiClient,
}

impl Providers {
    pub fn new(cfg: &ProviderConfig, offline: Arc<AtomicBool>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            geocoder: NominatimGeocoder {
                client: client.clone(),
                base_url: cfg.geocoder_url.trim_end_matches('/').to_string(),
                offline: offline.clone(),
            },
            irradiance: NasaPowerClient {
                client: client.clone(),
                base_url: cfg.irradiance_url.trim_end_matches('/').to_string(),
                reference_year: cfg.reference_year,
                offline: offline.clone(),
            },
            air_quality: WaqiClient {
                client,
                base_url: cfg.air_quality_url.trim_end_matches('/').to_string(),
                token: cfg.air_quality_token.clone(),
                offline,
            },
        })
    }
}

impl NasaPowerClient {
    fn url(&self, at: Coordinates) -> String {
        format!(
            "{}/api/temporal/daily/point?parameters=ALLSKY_SFC_SW_DWN&community=RE&longitude={}&latitude={}&format=JSON&start={year}0101&end={year}1231",
            self.base_url,
            at.lon,
            at.lat,
            year = self.reference_year
        )
    }
}

impl IrradianceProvider for NasaPowerClient {
    async fn average_insolation(&self, at: Coordinates) -> Result<IrradianceReading, ProviderError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(ProviderError::Offline);
        }

        let response = self.client.get(self.url(at)).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let body = response.json::<PowerDailyResponse>().await?;

        match body.mean_daily_insolation() {
            Some(mean) if mean > 0.0 => {
                debug!("NASA POWER mean insolation at {:.4},{:.4}: {:.3}", at.lat, at.lon, mean);
                Ok(IrradianceReading {
                    avg_insolation_kwh_m2_day: mean,
                })
            }
            Some(mean) => Err(ProviderError::InvalidPayload(format!(
                "non-positive mean insolation {mean}"
            ))),
            None => Err(ProviderError::InvalidPayload("no valid daily values".into())),
        }
    }
}

impl AirQualityProvider for WaqiClient {
    async fn current_aqi(&self, at: Coordinates) -> Result<Option<AqiReading>, ProviderError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(ProviderError::Offline);
        }

        let url = format!("{}/feed/geo:{};{}/", self.base_url, at.lat, at.lon);
        let response = self
            .client
            .get(url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let body = response.json::<WaqiFeedResponse>().await?;
        Ok(body.reading())
    }
}

impl LocationResolver for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, EstimatorError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(EstimatorError::LocationUnresolved("no address given".into()));
        }
        if self.offline.load(Ordering::Relaxed) {
            return Err(EstimatorError::LocationUnresolved(
                "address lookup is disabled in offline mode".into(),
            ));
        }

        let unresolved = |reason: String| EstimatorError::LocationUnresolved(reason);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("limit", "1"), ("q", address)])
            .send()
            .await
            .map_err(|e| unresolved(format!("geocoder request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(unresolved(format!("geocoder returned status {}", response.status())));
        }
        let places = response
            .json::<Vec<NominatimPlace>>()
            .await
            .map_err(|e| unresolved(format!("geocoder payload unreadable: {e}")))?;

        let place = places
            .first()
            .ok_or_else(|| unresolved(format!("no match for '{address}'")))?;
        debug!("Geocoded '{}' to {}", address, place.display_name);
        place
            .coordinates()
            .ok_or_else(|| unresolved(format!("geocoder returned unusable coordinates for '{address}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn providers(offline: bool) -> Providers {
        let cfg: ProviderConfig = serde_json::from_str("{}").unwrap();
        Providers::new(&cfg, Arc::new(AtomicBool::new(offline))).unwrap()
    }

    #[test]
    fn power_url_covers_reference_year() {
        let p = providers(false);
        let url = p.irradiance.url(Coordinates { lat: 22.06, lon: 78.94 });
        assert!(url.starts_with("https://power.larc.nasa.gov/api/temporal/daily/point?"));
        assert!(url.contains("longitude=78.94&latitude=22.06"));
        assert!(url.contains("start=20240101&end=20241231"));
    }

    #[tokio::test]
    async fn offline_mode_skips_network() {
        let p = providers(true);
        let at = Coordinates { lat: 22.06, lon: 78.94 };
        assert!(matches!(
            p.irradiance.average_insolation(at).await,
            Err(ProviderError::Offline)
        ));
        assert!(matches!(p.air_quality.current_aqi(at).await, Err(ProviderError::Offline)));
        assert!(matches!(
            p.geocoder.geocode("Chhindwara").await,
            Err(EstimatorError::LocationUnresolved(_))
        ));
    }

    #[tokio::test]
    async fn blank_address_is_unresolved() {
        let p = providers(false);
        assert!(matches!(
            p.geocoder.geocode("   ").await,
            Err(EstimatorError::LocationUnresolved(_))
        ));
    }

    #[test]
    fn offline_flag_is_shared() {
        let flag = Arc::new(AtomicBool::new(false));
        let cfg: ProviderConfig = serde_json::from_str("{}").unwrap();
        let p = Providers::new(&cfg, flag.clone()).unwrap();
        flag.store(true, Ordering::Relaxed);
        assert!(p.irradiance.offline.load(Ordering::Relaxed));
        assert!(p.geocoder.offline.load(Ordering::Relaxed));
    }
}
