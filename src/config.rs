use serde::Deserialize;

use crate::error::ConfigError;

fn default_offline_mode() -> bool { false }
fn default_irradiance_url() -> String { "https://power.larc.nasa.gov".to_string() }
fn default_reference_year() -> i32 { 2024 }
fn default_fallback_insolation() -> f64 { 4.5 }
fn default_air_quality_url() -> String { "https://api.waqi.info".to_string() }
fn default_air_quality_token() -> String { "demo".to_string() }
fn default_geocoder_url() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { format!("solar-estimator/{}", env!("CARGO_PKG_VERSION")) }
fn default_timeout_secs() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default = "default_offline_mode")]
    pub offline_mode: bool,
    #[serde(default)]
    pub providers: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// External lookups. Every field has a default, so `{}` is a valid section.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_irradiance_url")]
    pub irradiance_url: String,
    /// Year whose daily values are averaged
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,
    /// Insolation used when the lookup fails (kWh/m²/day)
    #[serde(default = "default_fallback_insolation")]
    pub fallback_insolation: f64,
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    #[serde(default = "default_air_quality_token")]
    pub air_quality_token: String,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    /// Nominatim rejects requests without an identifying agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            irradiance_url: default_irradiance_url(),
            reference_year: default_reference_year(),
            fallback_insolation: default_fallback_insolation(),
            air_quality_url: default_air_quality_url(),
            air_quality_token: default_air_quality_token(),
            geocoder_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if !(self.providers.fallback_insolation.is_finite() && self.providers.fallback_insolation > 0.0) {
            return Err(ConfigError::Invalid(
                "providers.fallback_insolation must be a positive number".into(),
            ));
        }
        if self.providers.timeout_secs == 0 {
            return Err(ConfigError::Invalid("providers.timeout_secs must be non-zero".into()));
        }
        Ok(())
    }
}
