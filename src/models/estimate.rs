use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::EstimatorError;
use crate::services::formatting::{DisplaySummary, Language};

// ─── Closed input sets ───────────────────────────────────────────────────────

/// States with a known subsidy scheme. Anything else lands in `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IndianState {
    #[serde(rename = "MP")]
    MadhyaPradesh,
    #[serde(rename = "UP")]
    UttarPradesh,
    #[serde(rename = "GUJ")]
    Gujarat,
    #[default]
    #[serde(rename = "OTHER")]
    #[serde(other)]
    Other,
}

/// Lender code as sent by the client (`NONE`, `SBI`, `HDFC`, `PNB`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bank {
    #[default]
    None,
    Sbi,
    Hdfc,
    Pnb,
    /// Lender outside the rate table, financed at 0%. Keeps the code as given.
    Other(String),
}

impl Bank {
    pub fn code(&self) -> &str {
        match self {
            Bank::None => "NONE",
            Bank::Sbi => "SBI",
            Bank::Hdfc => "HDFC",
            Bank::Pnb => "PNB",
            Bank::Other(code) => code,
        }
    }
}

impl From<String> for Bank {
    fn from(code: String) -> Self {
        let trimmed = code.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" | "NONE" => Bank::None,
            "SBI" => Bank::Sbi,
            "HDFC" => Bank::Hdfc,
            "PNB" => Bank::Pnb,
            _ => Bank::Other(trimmed.to_string()),
        }
    }
}

impl From<Bank> for String {
    fn from(bank: Bank) -> Self {
        bank.code().to_string()
    }
}

// Documented as the plain lender code it travels as.
impl utoipa::PartialSchema for Bank {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        <String as utoipa::PartialSchema>::schema()
    }
}

impl ToSchema for Bank {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Bank")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelType {
    #[default]
    Mono,
    Poly,
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Where the household is: a free-text address to geocode, or coordinates
/// reported by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    Address(String),
    Coordinates(Coordinates),
}

// ─── Request / validated input ───────────────────────────────────────────────

/// Body of `POST /api/estimate`, as typed by the user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EstimateRequest {
    /// Monthly electricity bill (₹)
    pub monthly_bill: f64,
    /// Grid tariff per unit (₹/kWh)
    pub tariff_per_unit: f64,
    /// Installed cost per kW (₹/kW)
    pub cost_per_kw: f64,
    /// Spending cap (₹). Absent or 0 means no cap.
    #[serde(default)]
    pub budget_cap: Option<f64>,
    /// Usable roof area (sq ft). Absent or ≤ 0 means no cap.
    #[serde(default)]
    pub roof_area_sq_ft: Option<f64>,
    /// Monthly household income (₹). Absent means 0.
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub state: IndianState,
    #[serde(default)]
    pub bank: Bank,
    #[serde(default)]
    pub panel_type: PanelType,
    pub location: LocationQuery,
}

/// Validated snapshot every engine runs against.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CalculationInput {
    pub monthly_bill: f64,
    pub tariff_per_unit: f64,
    pub cost_per_kw: f64,
    pub budget_cap: Option<f64>,
    pub roof_area_sq_ft: Option<f64>,
    pub monthly_income: f64,
    pub state: IndianState,
    pub bank: Bank,
    pub panel_type: PanelType,
    pub location: LocationQuery,
}

fn require_positive(field: &str, value: f64) -> Result<f64, EstimatorError> {
    if !value.is_finite() {
        return Err(EstimatorError::invalid(field, "must be a number"));
    }
    if value <= 0.0 {
        return Err(EstimatorError::invalid(field, "must be greater than zero"));
    }
    Ok(value)
}

fn optional_finite(field: &str, value: Option<f64>) -> Result<Option<f64>, EstimatorError> {
    match value {
        Some(v) if !v.is_finite() => Err(EstimatorError::invalid(field, "must be a number")),
        other => Ok(other),
    }
}

impl TryFrom<EstimateRequest> for CalculationInput {
    type Error = EstimatorError;

    fn try_from(req: EstimateRequest) -> Result<Self, Self::Error> {
        let monthly_bill = require_positive("monthly_bill", req.monthly_bill)?;
        let tariff_per_unit = require_positive("tariff_per_unit", req.tariff_per_unit)?;
        let cost_per_kw = require_positive("cost_per_kw", req.cost_per_kw)?;

        let budget_cap = match optional_finite("budget_cap", req.budget_cap)? {
            Some(b) if b < 0.0 => {
                return Err(EstimatorError::invalid("budget_cap", "must not be negative"));
            }
            Some(b) if b == 0.0 => None,
            other => other,
        };

        let roof_area_sq_ft = optional_finite("roof_area_sq_ft", req.roof_area_sq_ft)?
            .filter(|area| *area > 0.0);

        let monthly_income = optional_finite("monthly_income", req.monthly_income)?.unwrap_or(0.0);
        if monthly_income < 0.0 {
            return Err(EstimatorError::invalid("monthly_income", "must not be negative"));
        }

        Ok(Self {
            monthly_bill,
            tariff_per_unit,
            cost_per_kw,
            budget_cap,
            roof_area_sq_ft,
            monthly_income,
            state: req.state,
            bank: req.bank,
            panel_type: req.panel_type,
            location: req.location,
        })
    }
}

// ─── External readings ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct IrradianceReading {
    /// Average daily insolation over the reference year (kWh/m²/day)
    pub avg_insolation_kwh_m2_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AqiReading {
    pub aqi: f64,
    pub city_name: String,
}

// ─── Engine outputs ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SizingResult {
    /// Bill divided by tariff (kWh/month)
    pub units_consumed: f64,
    pub required_kw: f64,
    pub install_cost: f64,
    pub was_roof_capped: bool,
    pub was_budget_capped: bool,
}

/// Years to recover the install cost. `NotApplicable` when there are no savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Years(f64),
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct FinancialResult {
    pub monthly_savings: f64,
    pub payback: Payback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct EnvironmentalResult {
    pub co2_tons_per_year: f64,
    pub trees_equivalent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AqiCategory {
    Good,
    Moderate,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PollutionEstimate {
    pub original_aqi: f64,
    pub category: AqiCategory,
    pub reduction: f64,
    pub remaining_aqi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scheme {
    PmSuryaGharMadhyaPradesh,
    UpSolarRooftop,
    GujaratSolar,
    NoneFound,
}

impl Scheme {
    pub fn english_name(self) -> &'static str {
        match self {
            Scheme::PmSuryaGharMadhyaPradesh => "PM Surya Ghar (Madhya Pradesh)",
            Scheme::UpSolarRooftop => "UP Solar Rooftop Subsidy Scheme",
            Scheme::GujaratSolar => "Gujarat Solar Subsidy Scheme",
            Scheme::NoneFound => "No specific scheme found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubsidyResult {
    pub is_eligible: bool,
    pub scheme: Scheme,
    pub scheme_name: String,
    pub subsidy_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LoanResult {
    pub lender: Bank,
    /// `"none"` when no loan was requested
    pub lender_name: String,
    pub annual_rate_percent: f64,
    pub principal: f64,
    pub term_years: u32,
    pub monthly_installment: f64,
}

/// Interest-free split of the post-subsidy cost over a short term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct QuickInstallment {
    pub months: u32,
    pub monthly_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct OffWorldEstimate {
    pub system_kw: f64,
    pub battery_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GamificationResult {
    pub annual_kwh: f64,
    pub rover_equivalent_days: f64,
    pub iss_equivalent_seconds: f64,
    pub mars: OffWorldEstimate,
    pub moon: OffWorldEstimate,
}

/// Non-fatal notes for the result consumer, kept in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advisory {
    IrradianceFallback,
    AirQualityUnavailable,
    RoofCapped,
    BudgetCapped,
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Everything one pipeline run produces. Full precision; formatting is the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CalculationResult {
    pub bill: f64,
    pub coordinates: Coordinates,
    /// Insolation actually used for sizing (kWh/m²/day)
    pub avg_insolation: f64,
    pub units_consumed: f64,
    pub required_kw: f64,
    pub install_cost: f64,
    pub was_roof_capped: bool,
    pub was_budget_capped: bool,
    pub monthly_savings: f64,
    pub payback: Payback,
    pub co2_tons_per_year: f64,
    pub trees_equivalent: u64,
    pub aqi_reading: Option<AqiReading>,
    pub pollution: Option<PollutionEstimate>,
    pub subsidy: SubsidyResult,
    pub loan: LoanResult,
    /// 12, 24 and 36 month splits of `final_cost_after_subsidy`
    pub quick_emi: Vec<QuickInstallment>,
    pub final_cost_after_subsidy: f64,
    pub gamification: GamificationResult,
    pub advisories: Vec<Advisory>,
}

// ─── REST API response types ─────────────────────────────────────────────────

/// A served estimate as kept in memory: the result plus its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEstimate {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub result: CalculationResult,
}

impl StoredEstimate {
    pub fn new(result: CalculationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            result,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub result: CalculationResult,
    pub display: DisplaySummary,
}

impl EstimateResponse {
    pub fn render(stored: &StoredEstimate, lang: Language) -> Self {
        Self {
            id: stored.id,
            timestamp: stored.timestamp,
            result: stored.result.clone(),
            display: DisplaySummary::render(&stored.result, lang),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommunitySummary {
    pub total_co2_tons_per_year: f64,
    pub total_trees: u64,
    pub total_users: usize,
    pub latest: Option<Coordinates>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OfflineModeStatus {
    pub offline_mode: bool,
}
