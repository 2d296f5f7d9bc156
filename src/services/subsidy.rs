//! Subsidy eligibility.
//!
//! Rules are data: each state owns an ordered list of tiers and the first
//! tier whose income/size window matches decides the amount. Every window
//! bound is inclusive on its upper end, so exact boundary values (3 kW,
//! 10 kW, ₹25,000) fall into the lower tier.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::estimate::{IndianState, Scheme, SubsidyResult};

/// Bills below this (₹/month) are not worth subsidising.
pub const MIN_ELIGIBLE_BILL: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SubsidyTier {
    pub scheme: Scheme,
    /// Highest monthly income admitted (₹), inclusive
    pub max_income: Option<f64>,
    /// System size must be strictly above this (kW)
    pub min_kw_exclusive: Option<f64>,
    /// System size must be at most this (kW)
    pub max_kw: Option<f64>,
    /// Fixed ceiling on the subsidy (₹)
    pub cap: f64,
    /// Ceiling as a share of install cost
    pub cost_fraction: f64,
}

impl SubsidyTier {
    pub fn applies(&self, monthly_income: f64, required_kw: f64) -> bool {
        self.max_income.is_none_or(|max| monthly_income <= max)
            && self.min_kw_exclusive.is_none_or(|min| required_kw > min)
            && self.max_kw.is_none_or(|max| required_kw <= max)
    }

    pub fn amount(&self, install_cost: f64) -> f64 {
        self.cap.min(self.cost_fraction * install_cost).max(0.0)
    }
}

#[derive(Debug)]
pub struct StatePolicy {
    pub state: IndianState,
    pub tiers: &'static [SubsidyTier],
}

const fn tier(
    scheme: Scheme,
    max_income: Option<f64>,
    min_kw_exclusive: Option<f64>,
    max_kw: Option<f64>,
    cap: f64,
    cost_fraction: f64,
) -> SubsidyTier {
    SubsidyTier {
        scheme,
        max_income,
        min_kw_exclusive,
        max_kw,
        cap,
        cost_fraction,
    }
}

pub const SUBSIDY_POLICIES: &[StatePolicy] = &[
    StatePolicy {
        state: IndianState::MadhyaPradesh,
        tiers: &[
            tier(Scheme::PmSuryaGharMadhyaPradesh, Some(25000.0), None, Some(3.0), 60000.0, 0.4),
            // No income test above 3 kW; nothing at all above 10 kW.
            tier(Scheme::PmSuryaGharMadhyaPradesh, None, Some(3.0), Some(10.0), 78000.0, 0.3),
        ],
    },
    StatePolicy {
        state: IndianState::UttarPradesh,
        tiers: &[tier(Scheme::UpSolarRooftop, Some(20000.0), None, None, 50000.0, 0.35)],
    },
    StatePolicy {
        state: IndianState::Gujarat,
        tiers: &[tier(Scheme::GujaratSolar, None, None, Some(3.0), 80000.0, 0.5)],
    },
];

/// Owned copy of one state's rules, for the policy endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubsidyPolicyView {
    pub state: IndianState,
    pub minimum_monthly_bill: f64,
    pub tiers: Vec<SubsidyTier>,
}

pub fn policies() -> Vec<SubsidyPolicyView> {
    SUBSIDY_POLICIES
        .iter()
        .map(|p| SubsidyPolicyView {
            state: p.state,
            minimum_monthly_bill: MIN_ELIGIBLE_BILL,
            tiers: p.tiers.to_vec(),
        })
        .collect()
}

pub fn policy_for(state: IndianState) -> Option<&'static StatePolicy> {
    SUBSIDY_POLICIES.iter().find(|p| p.state == state)
}

fn result(is_eligible: bool, scheme: Scheme, subsidy_amount: f64) -> SubsidyResult {
    SubsidyResult {
        is_eligible,
        scheme,
        scheme_name: scheme.english_name().to_string(),
        subsidy_amount,
    }
}

pub fn evaluate(
    state: IndianState,
    monthly_income: f64,
    monthly_bill: f64,
    required_kw: f64,
    install_cost: f64,
) -> SubsidyResult {
    if monthly_bill < MIN_ELIGIBLE_BILL {
        return result(false, Scheme::NoneFound, 0.0);
    }

    let matched = policy_for(state)
        .and_then(|policy| policy.tiers.iter().find(|t| t.applies(monthly_income, required_kw)));

    match matched {
        Some(t) => result(true, t.scheme, t.amount(install_cost)),
        None => result(true, Scheme::NoneFound, 0.0),
    }
}
