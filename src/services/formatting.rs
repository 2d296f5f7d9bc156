//! Presentation formatting: fixed decimal places and a per-language string
//! bundle. Engines never round; this is the only place numbers become text.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::estimate::{Advisory, AqiCategory, CalculationResult, Payback, Scheme};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageQuery {
    /// `en` (default) or `hi`
    #[serde(default)]
    pub lang: Language,
}

pub struct StringBundle {
    pub not_applicable: &'static str,
    pub no_loan: &'static str,
    pub eligible: &'static str,
    pub not_eligible: &'static str,
    pub scheme_pm_surya_ghar_mp: &'static str,
    pub scheme_up: &'static str,
    pub scheme_gujarat: &'static str,
    pub scheme_none: &'static str,
    pub aqi_good: &'static str,
    pub aqi_moderate: &'static str,
    pub aqi_unhealthy: &'static str,
    /// `{kwh}` is replaced with the insolation actually used
    pub advisory_irradiance_fallback: &'static str,
    pub advisory_air_quality_unavailable: &'static str,
    pub advisory_roof_capped: &'static str,
    pub advisory_budget_capped: &'static str,
    /// Placeholders: `{bill}` `{kw}` `{cost}` `{savings}` `{payback}` `{co2}` `{trees}`
    pub explainer: &'static str,
}

pub const EN: StringBundle = StringBundle {
    not_applicable: "N/A",
    no_loan: "No Loan",
    eligible: "Eligible",
    not_eligible: "Not Eligible for Subsidy",
    scheme_pm_surya_ghar_mp: "PM Surya Ghar (Madhya Pradesh)",
    scheme_up: "UP Solar Rooftop Subsidy Scheme",
    scheme_gujarat: "Gujarat Solar Subsidy Scheme",
    scheme_none: "No specific scheme found",
    aqi_good: "Good",
    aqi_moderate: "Moderate",
    aqi_unhealthy: "Unhealthy",
    advisory_irradiance_fallback: "NASA data unavailable. Using estimate ({kwh} kWh).",
    advisory_air_quality_unavailable: "Air quality data unavailable for this location.",
    advisory_roof_capped: "System size adjusted to fit your roof area.",
    advisory_budget_capped: "System size adjusted to fit your budget.",
    explainer: "Hello! Based on your bill of ₹{bill}, you'll need an approximate {kw} kilowatt solar system. \
The estimated cost will be ₹{cost}. You'll save around ₹{savings} per month, and the payback period is {payback} years. \
This is equivalent to saving {co2} tons of carbon dioxide, which is like planting {trees} trees.",
};

pub const HI: StringBundle = StringBundle {
    not_applicable: "लागू नहीं",
    no_loan: "कोई ऋण नहीं",
    eligible: "पात्र",
    not_eligible: "सब्सिडी के लिए पात्र नहीं",
    scheme_pm_surya_ghar_mp: "पीएम सूर्य घर (मध्य प्रदेश)",
    scheme_up: "यूपी सोलर रूफटॉप सब्सिडी योजना",
    scheme_gujarat: "गुजरात सोलर सब्सिडी योजना",
    scheme_none: "कोई विशेष योजना नहीं मिली",
    aqi_good: "अच्छा",
    aqi_moderate: "मध्यम",
    aqi_unhealthy: "अस्वास्थ्यकर",
    advisory_irradiance_fallback: "नासा डेटा उपलब्ध नहीं है। अनुमान ({kwh} kWh) का उपयोग किया जा रहा है।",
    advisory_air_quality_unavailable: "इस स्थान के लिए वायु गुणवत्ता डेटा उपलब्ध नहीं है।",
    advisory_roof_capped: "सिस्टम का आकार आपकी छत के क्षेत्रफल के अनुसार समायोजित किया गया।",
    advisory_budget_capped: "सिस्टम का आकार आपके बजट के अनुसार समायोजित किया गया।",
    explainer: "नमस्ते! आपके ₹{bill} के बिल के आधार पर, आपको लगभग {kw} किलोवाट का सोलर सिस्टम चाहिए। \
इसका अनुमानित खर्च ₹{cost} होगा। आप हर महीने लगभग ₹{savings} बचाएंगे \
और आपका पैसा {payback} साल में वसूल हो जाएगा। \
यह {co2} टन कार्बन डाइऑक्साइड बचाने के बराबर है, जो {trees} पेड़ लगाने जैसा है।",
};

pub fn bundle(lang: Language) -> &'static StringBundle {
    match lang {
        Language::En => &EN,
        Language::Hi => &HI,
    }
}

impl StringBundle {
    pub fn scheme(&self, scheme: Scheme) -> &'static str {
        match scheme {
            Scheme::PmSuryaGharMadhyaPradesh => self.scheme_pm_surya_ghar_mp,
            Scheme::UpSolarRooftop => self.scheme_up,
            Scheme::GujaratSolar => self.scheme_gujarat,
            Scheme::NoneFound => self.scheme_none,
        }
    }

    pub fn aqi(&self, category: AqiCategory) -> &'static str {
        match category {
            AqiCategory::Good => self.aqi_good,
            AqiCategory::Moderate => self.aqi_moderate,
            AqiCategory::Unhealthy => self.aqi_unhealthy,
        }
    }

    pub fn advisory(&self, advisory: Advisory, avg_insolation: f64) -> String {
        match advisory {
            Advisory::IrradianceFallback => self
                .advisory_irradiance_fallback
                .replace("{kwh}", &format!("{:.1}", avg_insolation)),
            Advisory::AirQualityUnavailable => self.advisory_air_quality_unavailable.to_string(),
            Advisory::RoofCapped => self.advisory_roof_capped.to_string(),
            Advisory::BudgetCapped => self.advisory_budget_capped.to_string(),
        }
    }
}

/// One bar of the quick EMI plan.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuickEmiLine {
    /// e.g. `12 EMI`
    pub label: String,
    pub monthly_amount: String,
}

/// Result rendered for display. Every field is ready-to-print text.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplaySummary {
    pub language: Language,
    pub required_kw: String,
    pub install_cost: String,
    pub monthly_savings: String,
    pub payback_years: String,
    pub co2_tons_per_year: String,
    pub trees_equivalent: String,
    pub subsidy_status: String,
    pub scheme_name: String,
    pub subsidy_amount: String,
    pub final_cost_after_subsidy: String,
    pub lender_name: String,
    pub monthly_installment: String,
    pub quick_emi: Vec<QuickEmiLine>,
    pub aqi_city: Option<String>,
    pub aqi_category: Option<String>,
    pub rover_days: String,
    pub iss_seconds: String,
    pub mars_kw: String,
    pub mars_battery_kwh: String,
    pub moon_kw: String,
    pub moon_battery_kwh: String,
    pub advisories: Vec<String>,
    /// Short spoken-style summary of the headline numbers
    pub explainer: String,
}

impl DisplaySummary {
    pub fn render(result: &CalculationResult, lang: Language) -> Self {
        let text = bundle(lang);
        let payback_years = match result.payback {
            Payback::Years(years) => format!("{:.1}", years),
            Payback::NotApplicable => text.not_applicable.to_string(),
        };
        let lender_name = if result.loan.principal > 0.0 || result.loan.term_years > 0 {
            result.loan.lender_name.clone()
        } else {
            text.no_loan.to_string()
        };
        let g = &result.gamification;
        let required_kw = format!("{:.2}", result.required_kw);
        let install_cost = format!("{:.0}", result.install_cost);
        let monthly_savings = format!("{:.0}", result.monthly_savings);
        let co2_tons_per_year = format!("{:.1}", result.co2_tons_per_year);
        let trees_equivalent = result.trees_equivalent.to_string();
        let explainer = text
            .explainer
            .replace("{bill}", &result.bill.to_string())
            .replace("{kw}", &required_kw)
            .replace("{cost}", &install_cost)
            .replace("{savings}", &monthly_savings)
            .replace("{payback}", &payback_years)
            .replace("{co2}", &co2_tons_per_year)
            .replace("{trees}", &trees_equivalent);

        Self {
            language: lang,
            required_kw,
            install_cost,
            monthly_savings,
            payback_years,
            co2_tons_per_year,
            trees_equivalent,
            subsidy_status: if result.subsidy.is_eligible {
                text.eligible.to_string()
            } else {
                text.not_eligible.to_string()
            },
            scheme_name: text.scheme(result.subsidy.scheme).to_string(),
            subsidy_amount: format!("{:.0}", result.subsidy.subsidy_amount),
            final_cost_after_subsidy: format!("{:.0}", result.final_cost_after_subsidy),
            lender_name,
            monthly_installment: format!("{:.0}", result.loan.monthly_installment),
            quick_emi: result
                .quick_emi
                .iter()
                .map(|q| QuickEmiLine {
                    label: format!("{} EMI", q.months),
                    monthly_amount: format!("{:.0}", q.monthly_amount),
                })
                .collect(),
            aqi_city: result
                .aqi_reading
                .as_ref()
                .map(|r| r.city_name.split(',').next().unwrap_or_default().trim().to_string()),
            aqi_category: result.pollution.map(|p| text.aqi(p.category).to_string()),
            rover_days: format!("{:.0}", g.rover_equivalent_days),
            iss_seconds: format!("{:.0}", g.iss_equivalent_seconds),
            mars_kw: format!("{:.2}", g.mars.system_kw),
            mars_battery_kwh: format!("{:.1}", g.mars.battery_kwh),
            moon_kw: format!("{:.2}", g.moon.system_kw),
            moon_battery_kwh: format!("{:.1}", g.moon.battery_kwh),
            advisories: result
                .advisories
                .iter()
                .map(|a| text.advisory(*a, result.avg_insolation))
                .collect(),
            explainer,
        }
    }
}
