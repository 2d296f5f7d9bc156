use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use axum::extract::FromRef;
use tracing::info;

use crate::config::Config;
use crate::models::estimate::{CalculationResult, CommunitySummary, Coordinates, StoredEstimate};
use crate::services::providers::Providers;

/// Running totals over every estimate served since startup.
#[derive(Debug, Default, Clone)]
pub struct CommunityTally {
    pub total_co2_tons_per_year: f64,
    pub total_trees: u64,
    pub total_users: usize,
    pub latest: Option<Coordinates>,
}

impl CommunityTally {
    pub fn record(&mut self, result: &CalculationResult) {
        self.total_co2_tons_per_year += result.co2_tons_per_year;
        self.total_trees += result.trees_equivalent;
        self.total_users += 1;
        self.latest = Some(result.coordinates);
    }

    pub fn summary(&self) -> CommunitySummary {
        CommunitySummary {
            total_co2_tons_per_year: self.total_co2_tons_per_year,
            total_trees: self.total_trees,
            total_users: self.total_users,
            latest: self.latest,
        }
    }
}

/// Everything a successful run publishes. One lock, so the last estimate and
/// the tally always describe the same set of runs.
#[derive(Debug, Default)]
pub struct Published {
    /// Replaced whole, never patched.
    pub last: Option<StoredEstimate>,
    pub tally: CommunityTally,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub published: Arc<RwLock<Published>>,
    /// Offline mode flag, shared with every provider
    pub offline_mode: Arc<AtomicBool>,
    pub providers: Arc<Providers>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let offline_mode = Arc::new(AtomicBool::new(config.offline_mode));
        let providers = Providers::new(&config.providers, offline_mode.clone())?;
        Ok(Self {
            published: Arc::new(RwLock::new(Published::default())),
            offline_mode,
            providers: Arc::new(providers),
        })
    }

    pub fn is_offline(&self) -> bool {
        self.offline_mode.load(Ordering::Relaxed)
    }

    pub fn set_offline(&self, value: bool) {
        self.offline_mode.store(value, Ordering::Relaxed);
        info!("Offline mode {}", if value { "enabled" } else { "disabled" });
    }

    /// Stores `estimate` as the latest and adds it to the community totals.
    pub fn publish(&self, estimate: &StoredEstimate) {
        if let Ok(mut published) = self.published.write() {
            published.tally.record(&estimate.result);
            published.last = Some(estimate.clone());
        }
    }

    pub fn last_estimate(&self) -> Option<StoredEstimate> {
        self.published.read().ok().and_then(|p| p.last.clone())
    }

    pub fn community_summary(&self) -> CommunitySummary {
        self.published
            .read()
            .map(|p| p.tally.summary())
            .unwrap_or_else(|_| CommunityTally::default().summary())
    }
}

/// Router state. Handlers pull out whichever half they need.
#[derive(Clone, Debug)]
pub struct SharedState {
    pub app: AppState,
    pub config: Config,
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> Self {
        shared.app.clone()
    }
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Self {
        shared.config.clone()
    }
}
