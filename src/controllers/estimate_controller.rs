use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::config::Config;
use crate::error::EstimatorError;
use crate::models::estimate::{
    CommunitySummary, EstimateRequest, EstimateResponse, OfflineModeStatus, StoredEstimate,
};
use crate::services::formatting::LanguageQuery;
use crate::services::loan::{self, LenderOffer};
use crate::services::pipeline;
use crate::services::subsidy::{self, SubsidyPolicyView};
use crate::shared_state::AppState;

/// POST /api/estimate
/// Run a full estimate for one household
///
/// Resolves the location, looks up irradiance and air quality, then runs
/// sizing, savings, environmental, subsidy, loan and comparison engines.
/// The result becomes the "last estimate" and is added to the community tally.
#[utoipa::path(
    post,
    path = "/api/estimate",
    params(LanguageQuery),
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Estimate computed", body = EstimateResponse),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Location could not be resolved")
    )
)]
pub async fn create_estimate(
    State(state): State<AppState>,
    State(config): State<Config>,
    Query(query): Query<LanguageQuery>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, EstimatorError> {
    let providers = &state.providers;
    let result = pipeline::estimate(
        request,
        &providers.geocoder,
        &providers.irradiance,
        &providers.air_quality,
        config.providers.fallback_insolation,
    )
    .await?;

    let stored = StoredEstimate::new(result);
    state.publish(&stored);
    Ok(Json(EstimateResponse::render(&stored, query.lang)))
}

/// GET /api/estimate/last
/// Re-render the most recent estimate
#[utoipa::path(
    get,
    path = "/api/estimate/last",
    params(LanguageQuery),
    responses(
        (status = 200, description = "Most recent estimate", body = EstimateResponse),
        (status = 404, description = "No estimate computed yet")
    )
)]
pub async fn get_last_estimate(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> impl IntoResponse {
    match state.last_estimate() {
        Some(stored) => (StatusCode::OK, Json(EstimateResponse::render(&stored, query.lang))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No estimate computed yet"})),
        )
            .into_response(),
    }
}

/// GET /api/community
/// Aggregate impact of every estimate served
#[utoipa::path(
    get,
    path = "/api/community",
    responses(
        (status = 200, description = "Community totals", body = CommunitySummary)
    )
)]
pub async fn get_community_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.community_summary())
}

/// GET /api/policies/subsidy
/// Per-state subsidy tiers
#[utoipa::path(
    get,
    path = "/api/policies/subsidy",
    responses(
        (status = 200, description = "Subsidy table", body = Vec<SubsidyPolicyView>)
    )
)]
pub async fn list_subsidy_policies() -> impl IntoResponse {
    Json(subsidy::policies())
}

/// GET /api/policies/lenders
/// Lender rates and loan term
#[utoipa::path(
    get,
    path = "/api/policies/lenders",
    responses(
        (status = 200, description = "Lender table", body = Vec<LenderOffer>)
    )
)]
pub async fn list_lenders() -> impl IntoResponse {
    Json(loan::offers())
}

/// GET /api/settings/offline-mode
#[utoipa::path(
    get,
    path = "/api/settings/offline-mode",
    responses(
        (status = 200, description = "Current offline mode", body = OfflineModeStatus)
    )
)]
pub async fn get_offline_mode(State(state): State<AppState>) -> impl IntoResponse {
    Json(OfflineModeStatus {
        offline_mode: state.is_offline(),
    })
}

/// POST /api/settings/offline-mode
/// Toggle offline mode
///
/// While offline, irradiance and air-quality lookups are skipped (the
/// fallback insolation is used) and only device coordinates can be located.
#[utoipa::path(
    post,
    path = "/api/settings/offline-mode",
    request_body = OfflineModeStatus,
    responses(
        (status = 200, description = "Offline mode updated", body = OfflineModeStatus)
    )
)]
pub async fn set_offline_mode(
    State(state): State<AppState>,
    Json(body): Json<OfflineModeStatus>,
) -> impl IntoResponse {
    state.set_offline(body.offline_mode);
    Json(OfflineModeStatus {
        offline_mode: state.is_offline(),
    })
}
