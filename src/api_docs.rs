use utoipa::OpenApi;
use crate::controllers::estimate_controller;
use crate::models::estimate;
use crate::services::{formatting, loan, subsidy};

#[derive(OpenApi)]
#[openapi(
    paths(
        estimate_controller::create_estimate,
        estimate_controller::get_last_estimate,
        estimate_controller::get_community_summary,
        estimate_controller::list_subsidy_policies,
        estimate_controller::list_lenders,
        estimate_controller::get_offline_mode,
        estimate_controller::set_offline_mode
    ),
    components(
        schemas(
            estimate::EstimateRequest,
            estimate::LocationQuery,
            estimate::EstimateResponse,
            estimate::CalculationResult,
            estimate::QuickInstallment,
            estimate::CommunitySummary,
            estimate::OfflineModeStatus,
            formatting::DisplaySummary,
            formatting::QuickEmiLine,
            formatting::Language,
            subsidy::SubsidyPolicyView,
            loan::LenderOffer
        )
    ),
    tags(
        (name = "solar-estimator", description = "Residential rooftop solar estimator API")
    )
)]
pub struct ApiDoc;
