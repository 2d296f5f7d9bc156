use crate::models::estimate::{FinancialResult, Payback};

/// Share of the bill the panels are assumed to offset.
pub const SELF_CONSUMPTION_FACTOR: f64 = 0.9;

pub fn assess(units_consumed: f64, tariff_per_unit: f64, install_cost: f64) -> FinancialResult {
    let monthly_savings = units_consumed * tariff_per_unit * SELF_CONSUMPTION_FACTOR;
    let payback = if monthly_savings > 0.0 {
        Payback::Years(install_cost / (monthly_savings * 12.0))
    } else {
        Payback::NotApplicable
    };
    FinancialResult {
        monthly_savings,
        payback,
    }
}
