use axum::{routing::{get, post}, Router};
use crate::controllers::estimate_controller::{
    // Estimates
    create_estimate, get_last_estimate, get_community_summary,
    // Policy tables
    list_subsidy_policies, list_lenders,
    // Settings
    get_offline_mode, set_offline_mode,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract `State<AppState>` and/or `State<Config>` via
/// `FromRef<SharedState>`, so a single `.with_state(shared)` covers both.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/estimate",                post(create_estimate))
        .route("/estimate/last",           get(get_last_estimate))
        .route("/community",               get(get_community_summary))
        .route("/policies/subsidy",        get(list_subsidy_policies))
        .route("/policies/lenders",        get(list_lenders))
        .route("/settings/offline-mode",   get(get_offline_mode).post(set_offline_mode))
        .with_state(shared)
}
