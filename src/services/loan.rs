use serde::Serialize;
use utoipa::ToSchema;

use crate::models::estimate::{Bank, LoanResult, QuickInstallment};

pub const LOAN_TERM_YEARS: u32 = 5;

/// Terms offered for the interest-free quick plan (months).
pub const QUICK_PLAN_MONTHS: [u32; 3] = [12, 24, 36];

#[derive(Debug, Clone, Copy)]
pub struct LenderRate {
    pub code: &'static str,
    /// Annual rate in percent (8.5 = 8.5%)
    pub annual_rate_percent: f64,
}

pub const LENDER_RATES: &[LenderRate] = &[
    LenderRate { code: "SBI", annual_rate_percent: 8.5 },
    LenderRate { code: "HDFC", annual_rate_percent: 9.2 },
    LenderRate { code: "PNB", annual_rate_percent: 8.8 },
];

/// Public view of one row of the rate table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LenderOffer {
    pub bank: Bank,
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

pub fn offers() -> Vec<LenderOffer> {
    LENDER_RATES
        .iter()
        .map(|l| LenderOffer {
            bank: Bank::from(l.code.to_string()),
            annual_rate_percent: l.annual_rate_percent,
            term_years: LOAN_TERM_YEARS,
        })
        .collect()
}

/// Rate for a lender; anything outside the table is financed at 0%.
pub fn annual_rate_for(bank: &Bank) -> f64 {
    LENDER_RATES
        .iter()
        .find(|l| l.code == bank.code())
        .map(|l| l.annual_rate_percent)
        .unwrap_or(0.0)
}

/// Fixed-rate amortized installment.
///
/// EMI = P × r × (1+r)^n / ((1+r)^n − 1), with r the monthly rate and n the
/// number of months. A zero principal gives 0; a zero rate spreads the
/// principal evenly over the term.
pub fn monthly_installment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    let months = term_years * 12;
    if principal <= 0.0 || months == 0 {
        return 0.0;
    }
    let monthly_rate = annual_rate_percent / 12.0 / 100.0;
    if monthly_rate <= 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

pub fn plan(bank: &Bank, cost_after_subsidy: f64) -> LoanResult {
    if *bank == Bank::None {
        return LoanResult {
            lender: Bank::None,
            lender_name: "none".to_string(),
            annual_rate_percent: 0.0,
            principal: 0.0,
            term_years: 0,
            monthly_installment: 0.0,
        };
    }

    let principal = cost_after_subsidy.max(0.0);
    let annual_rate_percent = annual_rate_for(bank);
    LoanResult {
        lender: bank.clone(),
        lender_name: bank.code().to_string(),
        annual_rate_percent,
        principal,
        term_years: LOAN_TERM_YEARS,
        monthly_installment: monthly_installment(principal, annual_rate_percent, LOAN_TERM_YEARS),
    }
}

/// Cost after subsidy divided evenly over each quick-plan term.
pub fn quick_plan(cost_after_subsidy: f64) -> Vec<QuickInstallment> {
    let cost = cost_after_subsidy.max(0.0);
    QUICK_PLAN_MONTHS
        .iter()
        .map(|&months| QuickInstallment {
            months,
            monthly_amount: cost / months as f64,
        })
        .collect()
}
