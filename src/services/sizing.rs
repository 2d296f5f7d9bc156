/// ============================================================
///  System Sizing Engine
///
///  Pipeline:
///   1. Monthly units   – bill / tariff
///   2. Demand sizing   – units / (insolation × 30 days)
///   3. Roof cap        – area / sq ft per kW (panel dependent)
///   4. Budget cap      – budget / cost per kW
///
///  Caps only ever shrink the system, and the roof cap is always
///  applied before the budget cap.
/// ============================================================

use crate::models::estimate::{CalculationInput, PanelType, SizingResult};

pub const DAYS_PER_BILLING_MONTH: f64 = 30.0;

/// Roof area one installed kW occupies (sq ft).
pub fn sq_ft_per_kw(panel: PanelType) -> f64 {
    match panel {
        PanelType::Mono => 80.0,
        PanelType::Poly => 100.0,
    }
}

/// `avg_insolation` (kWh/m²/day) doubles as the daily yield per installed kW.
pub fn size_system(input: &CalculationInput, avg_insolation: f64) -> SizingResult {
    let units_consumed = input.monthly_bill / input.tariff_per_unit;
    let mut required_kw = units_consumed / (avg_insolation * DAYS_PER_BILLING_MONTH);

    let mut was_roof_capped = false;
    if let Some(area) = input.roof_area_sq_ft.filter(|a| *a > 0.0) {
        let max_kw_from_roof = area / sq_ft_per_kw(input.panel_type);
        if required_kw > max_kw_from_roof {
            required_kw = max_kw_from_roof;
            was_roof_capped = true;
        }
    }

    let mut install_cost = required_kw * input.cost_per_kw;
    let mut was_budget_capped = false;
    if let Some(budget) = input.budget_cap {
        if install_cost > budget {
            required_kw = budget / input.cost_per_kw;
            install_cost = budget;
            was_budget_capped = true;
        }
    }

    SizingResult {
        units_consumed,
        required_kw,
        install_cost,
        was_roof_capped,
        was_budget_capped,
    }
}
