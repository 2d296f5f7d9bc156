/// ============================================================
///  Estimate pipeline
///
///   1. Validate      – reject bad bill / tariff / cost up front
///   2. Locate        – address or device coordinates (hard fail)
///   3. Lookups       – irradiance + AQI issued concurrently
///                      irradiance failure → fallback constant
///                      AQI failure        → reading absent
///   4. Engines       – sizing → financial & environmental
///                      → subsidy → loan → gamification
///                      (starts once irradiance settles, AQI may
///                      still be in flight)
///   5. Air quality   – reading + pollution estimate attached last
///
///  Steps 4-5 (`compute`) are pure: same input and readings, same result.
/// ============================================================

use tracing::{debug, info, warn};

use crate::error::{EstimatorError, ProviderError};
use crate::models::estimate::{
    Advisory, AqiReading, CalculationInput, CalculationResult, Coordinates, EstimateRequest,
    IrradianceReading, LocationQuery,
};
use crate::services::providers::{AirQualityProvider, IrradianceProvider, LocationResolver};
use crate::services::{environmental, financial, gamification, loan, sizing, subsidy};

/// What the outside world told us about the site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReadings {
    pub coordinates: Coordinates,
    /// Insolation to size with (kWh/m²/day)
    pub avg_insolation: f64,
    /// `avg_insolation` is the fallback constant, not a measurement
    pub irradiance_fallback: bool,
    pub aqi: Option<AqiReading>,
}

pub async fn resolve_location<L: LocationResolver>(
    query: &LocationQuery,
    resolver: &L,
) -> Result<Coordinates, EstimatorError> {
    match query {
        LocationQuery::Coordinates(c) if c.is_valid() => Ok(*c),
        LocationQuery::Coordinates(c) => Err(EstimatorError::LocationUnresolved(format!(
            "device coordinates out of range ({}, {})",
            c.lat, c.lon
        ))),
        LocationQuery::Address(address) => resolver.geocode(address).await,
    }
}

/// Insolation to size with and whether it is the fallback.
pub fn settle_irradiance(
    lookup: Result<IrradianceReading, ProviderError>,
    fallback_insolation: f64,
) -> (f64, bool) {
    match lookup {
        Ok(reading) if reading.avg_insolation_kwh_m2_day > 0.0 => (reading.avg_insolation_kwh_m2_day, false),
        Ok(reading) => {
            warn!(
                "Irradiance lookup returned {} kWh/m²/day, using fallback {}",
                reading.avg_insolation_kwh_m2_day, fallback_insolation
            );
            (fallback_insolation, true)
        }
        Err(e) => {
            warn!("Irradiance lookup failed ({}), using fallback {}", e, fallback_insolation);
            (fallback_insolation, true)
        }
    }
}

pub fn settle_air_quality(lookup: Result<Option<AqiReading>, ProviderError>) -> Option<AqiReading> {
    lookup.unwrap_or_else(|e| {
        warn!("Air quality lookup failed: {}", e);
        None
    })
}

/// Validate, locate, look up, compute.
pub async fn estimate<L, I, A>(
    request: EstimateRequest,
    resolver: &L,
    irradiance: &I,
    air_quality: &A,
    fallback_insolation: f64,
) -> Result<CalculationResult, EstimatorError>
where
    L: LocationResolver,
    I: IrradianceProvider,
    A: AirQualityProvider,
{
    let input = CalculationInput::try_from(request)?;
    let coordinates = resolve_location(&input.location, resolver).await?;
    debug!("Location resolved to {:.4},{:.4}", coordinates.lat, coordinates.lon);

    let engines = async {
        let lookup = irradiance.average_insolation(coordinates).await;
        let (avg_insolation, irradiance_fallback) = settle_irradiance(lookup, fallback_insolation);
        compute_core(&input, coordinates, avg_insolation, irradiance_fallback)
    };
    let air = async { settle_air_quality(air_quality.current_aqi(coordinates).await) };
    let (mut result, aqi) = tokio::join!(engines, air);
    attach_air_quality(&mut result, aqi);

    info!(
        "Estimate: {:.2} kW | cost ₹{:.0} | savings ₹{:.0}/month | subsidy ₹{:.0} | EMI ₹{:.0}",
        result.required_kw,
        result.install_cost,
        result.monthly_savings,
        result.subsidy.subsidy_amount,
        result.loan.monthly_installment
    );
    Ok(result)
}

/// The engine chain over one consistent snapshot.
pub fn compute(input: &CalculationInput, site: &SiteReadings) -> CalculationResult {
    let mut result = compute_core(input, site.coordinates, site.avg_insolation, site.irradiance_fallback);
    attach_air_quality(&mut result, site.aqi.clone());
    result
}

/// Every engine that depends only on the input and the insolation. The
/// air-quality fields are left empty.
pub fn compute_core(
    input: &CalculationInput,
    coordinates: Coordinates,
    avg_insolation: f64,
    irradiance_fallback: bool,
) -> CalculationResult {
    let sizing = sizing::size_system(input, avg_insolation);
    if sizing.was_roof_capped {
        info!("System size capped by roof area at {:.2} kW", sizing.required_kw);
    }
    if sizing.was_budget_capped {
        info!("System size capped by budget at {:.2} kW", sizing.required_kw);
    }

    let finance = financial::assess(sizing.units_consumed, input.tariff_per_unit, sizing.install_cost);
    let environment = environmental::assess(sizing.required_kw);

    let subsidy = subsidy::evaluate(
        input.state,
        input.monthly_income,
        input.monthly_bill,
        sizing.required_kw,
        sizing.install_cost,
    );
    let final_cost_after_subsidy = sizing.install_cost - subsidy.subsidy_amount;
    let loan = loan::plan(&input.bank, final_cost_after_subsidy);
    let quick_emi = loan::quick_plan(final_cost_after_subsidy);
    let gamification = gamification::compare(sizing.required_kw);

    #[cfg(feature = "verbose_log")]
    debug!(?sizing, ?finance, ?environment, ?subsidy, ?loan, "engine outputs");

    let mut advisories = Vec::new();
    if irradiance_fallback {
        advisories.push(Advisory::IrradianceFallback);
    }
    if sizing.was_roof_capped {
        advisories.push(Advisory::RoofCapped);
    }
    if sizing.was_budget_capped {
        advisories.push(Advisory::BudgetCapped);
    }

    CalculationResult {
        bill: input.monthly_bill,
        coordinates,
        avg_insolation,
        units_consumed: sizing.units_consumed,
        required_kw: sizing.required_kw,
        install_cost: sizing.install_cost,
        was_roof_capped: sizing.was_roof_capped,
        was_budget_capped: sizing.was_budget_capped,
        monthly_savings: finance.monthly_savings,
        payback: finance.payback,
        co2_tons_per_year: environment.co2_tons_per_year,
        trees_equivalent: environment.trees_equivalent,
        aqi_reading: None,
        pollution: None,
        subsidy,
        loan,
        quick_emi,
        final_cost_after_subsidy,
        gamification,
        advisories,
    }
}

/// Adds the reading and its pollution estimate, or the unavailable advisory.
pub fn attach_air_quality(result: &mut CalculationResult, aqi: Option<AqiReading>) {
    match aqi {
        Some(reading) => {
            result.pollution = Some(environmental::pollution_estimate(&reading, result.co2_tons_per_year));
            result.aqi_reading = Some(reading);
        }
        None => {
            result.pollution = None;
            result.aqi_reading = None;
            if !result.advisories.contains(&Advisory::AirQualityUnavailable) {
                result.advisories.push(Advisory::AirQualityUnavailable);
                result.advisories.sort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::estimate::{Bank, IndianState, Payback, QuickInstallment, Scheme};
    use crate::services::sizing::tests::base_input;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    const CHHINDWARA: Coordinates = Coordinates { lat: 22.0574, lon: 78.9382 };

    struct FakeGeocoder {
        hit: Option<Coordinates>,
    }

    impl LocationResolver for FakeGeocoder {
        async fn geocode(&self, address: &str) -> Result<Coordinates, EstimatorError> {
            self.hit
                .ok_or_else(|| EstimatorError::LocationUnresolved(format!("no match for '{address}'")))
        }
    }

    #[derive(Default)]
    struct FakeIrradiance {
        value: Option<f64>,
        calls: AtomicUsize,
    }

    impl IrradianceProvider for FakeIrradiance {
        async fn average_insolation(&self, _at: Coordinates) -> Result<IrradianceReading, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
                .map(|v| IrradianceReading { avg_insolation_kwh_m2_day: v })
                .ok_or(ProviderError::Status(503))
        }
    }

    #[derive(Default)]
    struct FakeAqi {
        reading: Option<AqiReading>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl AirQualityProvider for FakeAqi {
        async fn current_aqi(&self, _at: Coordinates) -> Result<Option<AqiReading>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::InvalidPayload("bad json".into()));
            }
            Ok(self.reading.clone())
        }
    }

    fn request(location: LocationQuery) -> EstimateRequest {
        serde_json::from_value(serde_json::json!({
            "monthly_bill": 2000.0,
            "tariff_per_unit": 8.0,
            "cost_per_kw": 50000.0,
            "monthly_income": 20000.0,
            "state": "MP",
            "bank": "SBI",
            "location": location,
        }))
        .unwrap()
    }

    fn site(avg_insolation: f64) -> SiteReadings {
        SiteReadings {
            coordinates: CHHINDWARA,
            avg_insolation,
            irradiance_fallback: false,
            aqi: None,
        }
    }

    #[test]
    fn reference_scenario_end_to_end() {
        let r = compute(&base_input(), &site(4.5));
        assert_eq!(r.units_consumed, 250.0);
        assert!((r.required_kw - 1.8519).abs() < 1e-4);
        assert!((r.install_cost - 92592.59).abs() < 0.01);
        assert_eq!(r.monthly_savings, 1800.0);
        match r.payback {
            Payback::Years(y) => assert!((y - 4.29).abs() < 0.01),
            Payback::NotApplicable => panic!("expected a payback period"),
        }
        // 0.4 × cost is under the ₹60,000 cap
        assert_eq!(r.subsidy.scheme, Scheme::PmSuryaGharMadhyaPradesh);
        assert!((r.subsidy.subsidy_amount - 0.4 * r.install_cost).abs() < 1e-9);
        assert_eq!(r.final_cost_after_subsidy, r.install_cost - r.subsidy.subsidy_amount);
        assert_eq!(r.loan.lender_name, "none");
        assert_eq!(r.advisories, vec![Advisory::AirQualityUnavailable]);
    }

    #[test]
    fn loan_finances_cost_after_subsidy() {
        let mut input = base_input();
        input.bank = Bank::Hdfc;
        let r = compute(&input, &site(4.5));
        assert_eq!(r.loan.principal, r.final_cost_after_subsidy);
        assert_eq!(r.loan.annual_rate_percent, 9.2);
        assert!(r.loan.monthly_installment > 0.0);
    }

    #[test]
    fn compute_is_idempotent() {
        let mut input = base_input();
        input.roof_area_sq_ft = Some(130.0);
        input.budget_cap = Some(70000.0);
        input.bank = Bank::Pnb;
        let mut readings = site(5.37);
        readings.aqi = Some(AqiReading { aqi: 88.0, city_name: "Nagpur".into() });

        let a = compute(&input, &readings);
        let b = compute(&input, &readings);
        assert_eq!(a, b);
        assert_eq!(a.required_kw.to_bits(), b.required_kw.to_bits());
        assert_eq!(a.loan.monthly_installment.to_bits(), b.loan.monthly_installment.to_bits());
    }

    #[test]
    fn roof_then_budget_advisories() {
        let mut input = base_input();
        input.roof_area_sq_ft = Some(120.0);
        input.budget_cap = Some(60000.0);
        let r = compute(&input, &site(4.5));
        assert_eq!(r.required_kw, 1.2);
        assert_eq!(
            r.advisories,
            vec![Advisory::AirQualityUnavailable, Advisory::RoofCapped, Advisory::BudgetCapped]
        );
    }

    #[test]
    fn pollution_only_with_reading() {
        let mut readings = site(4.5);
        assert!(compute(&base_input(), &readings).pollution.is_none());
        readings.aqi = Some(AqiReading { aqi: 150.0, city_name: "Indore".into() });
        let r = compute(&base_input(), &readings);
        let p = r.pollution.unwrap();
        assert!((p.reduction - r.co2_tons_per_year * 5.0).abs() < 1e-12);
        assert!(!r.advisories.contains(&Advisory::AirQualityUnavailable));
    }

    #[test]
    fn low_bill_not_eligible_in_pipeline() {
        let mut input = base_input();
        input.monthly_bill = 400.0;
        input.state = IndianState::Gujarat;
        let r = compute(&input, &site(4.5));
        assert!(!r.subsidy.is_eligible);
        assert_eq!(r.subsidy.subsidy_amount, 0.0);
        assert_eq!(r.final_cost_after_subsidy, r.install_cost);
    }

    #[tokio::test]
    async fn estimate_with_device_coordinates() {
        let geocoder = FakeGeocoder { hit: None };
        let irradiance = FakeIrradiance { value: Some(5.0), ..Default::default() };
        let aqi = FakeAqi {
            reading: Some(AqiReading { aqi: 60.0, city_name: "Chhindwara".into() }),
            ..Default::default()
        };
        let r = estimate(
            request(LocationQuery::Coordinates(CHHINDWARA)),
            &geocoder,
            &irradiance,
            &aqi,
            4.5,
        )
        .await
        .unwrap();
        assert_eq!(r.coordinates, CHHINDWARA);
        assert_eq!(r.avg_insolation, 5.0);
        assert!(r.advisories.is_empty());
        assert!((r.required_kw - 250.0 / 150.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn irradiance_failure_uses_fallback() {
        let geocoder = FakeGeocoder { hit: Some(CHHINDWARA) };
        let irradiance = FakeIrradiance::default();
        let aqi = FakeAqi { fail: true, ..Default::default() };
        let r = estimate(
            request(LocationQuery::Address("Chhindwara".into())),
            &geocoder,
            &irradiance,
            &aqi,
            4.5,
        )
        .await
        .unwrap();
        assert_eq!(r.avg_insolation, 4.5);
        assert!(r.aqi_reading.is_none());
        assert_eq!(
            r.advisories,
            vec![Advisory::IrradianceFallback, Advisory::AirQualityUnavailable]
        );
        assert_eq!(irradiance.calls.load(Ordering::SeqCst), 1);
        assert_eq!(aqi.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unresolved_location_runs_nothing() {
        let geocoder = FakeGeocoder { hit: None };
        let irradiance = FakeIrradiance { value: Some(5.0), ..Default::default() };
        let aqi = FakeAqi::default();
        let err = estimate(
            request(LocationQuery::Address("Atlantis".into())),
            &geocoder,
            &irradiance,
            &aqi,
            4.5,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EstimatorError::LocationUnresolved(_)));
        assert_eq!(irradiance.calls.load(Ordering::SeqCst), 0);
        assert_eq!(aqi.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_device_coordinates_are_rejected() {
        let geocoder = FakeGeocoder { hit: Some(CHHINDWARA) };
        let err = resolve_location(
            &LocationQuery::Coordinates(Coordinates { lat: 123.0, lon: 0.0 }),
            &geocoder,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EstimatorError::LocationUnresolved(_)));
    }

    #[tokio::test]
    async fn invalid_input_stops_before_lookup() {
        let geocoder = FakeGeocoder { hit: Some(CHHINDWARA) };
        let irradiance = FakeIrradiance { value: Some(5.0), ..Default::default() };
        let aqi = FakeAqi::default();
        let mut req = request(LocationQuery::Coordinates(CHHINDWARA));
        req.tariff_per_unit = 0.0;
        let err = estimate(req, &geocoder, &irradiance, &aqi, 4.5).await.unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidInput { .. }));
        assert_eq!(irradiance.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_or_failed_reading_falls_back() {
        let zero = Ok(IrradianceReading { avg_insolation_kwh_m2_day: 0.0 });
        assert_eq!(settle_irradiance(zero, 4.5), (4.5, true));
        assert_eq!(settle_irradiance(Err(ProviderError::Offline), 4.5), (4.5, true));
        let measured = Ok(IrradianceReading { avg_insolation_kwh_m2_day: 5.2 });
        assert_eq!(settle_irradiance(measured, 4.5), (5.2, false));
    }

    #[test]
    fn quick_emi_splits_final_cost() {
        let r = compute(&base_input(), &site(4.5));
        let months: Vec<u32> = r.quick_emi.iter().map(|q| q.months).collect();
        assert_eq!(months, vec![12, 24, 36]);
        assert_eq!(
            r.quick_emi[0],
            QuickInstallment { months: 12, monthly_amount: r.final_cost_after_subsidy / 12.0 }
        );
    }

    #[test]
    fn air_quality_only_touches_its_own_fields() {
        let input = base_input();
        let reading = AqiReading { aqi: 120.0, city_name: "Jabalpur".into() };
        let core = compute_core(&input, CHHINDWARA, 4.5, false);
        let mut attached = core.clone();
        attach_air_quality(&mut attached, Some(reading.clone()));

        assert_eq!(attached.aqi_reading, Some(reading.clone()));
        assert!(attached.pollution.is_some());
        attached.aqi_reading = None;
        attached.pollution = None;
        assert_eq!(attached, core);

        let mut readings = site(4.5);
        readings.aqi = Some(reading);
        let mut whole = compute(&input, &readings);
        whole.aqi_reading = None;
        whole.pollution = None;
        assert_eq!(whole, core);
    }

    struct SignallingIrradiance {
        done: Arc<Notify>,
    }

    impl IrradianceProvider for SignallingIrradiance {
        async fn average_insolation(&self, _at: Coordinates) -> Result<IrradianceReading, ProviderError> {
            self.done.notify_one();
            Ok(IrradianceReading { avg_insolation_kwh_m2_day: 5.0 })
        }
    }

    /// Answers only after the irradiance lookup has finished.
    struct TrailingAqi {
        irradiance_done: Arc<Notify>,
    }

    impl AirQualityProvider for TrailingAqi {
        async fn current_aqi(&self, _at: Coordinates) -> Result<Option<AqiReading>, ProviderError> {
            self.irradiance_done.notified().await;
            Ok(Some(AqiReading { aqi: 95.0, city_name: "Betul".into() }))
        }
    }

    #[tokio::test]
    async fn slow_air_quality_does_not_hold_back_irradiance() {
        let done = Arc::new(Notify::new());
        let irradiance = SignallingIrradiance { done: done.clone() };
        let aqi = TrailingAqi { irradiance_done: done };
        let r = tokio::time::timeout(
            Duration::from_secs(5),
            estimate(
                request(LocationQuery::Coordinates(CHHINDWARA)),
                &FakeGeocoder { hit: None },
                &irradiance,
                &aqi,
                4.5,
            ),
        )
        .await
        .expect("lookups must run concurrently")
        .unwrap();
        assert_eq!(r.avg_insolation, 5.0);
        assert_eq!(r.aqi_reading.map(|a| a.aqi), Some(95.0));
        assert!(r.advisories.is_empty());
    }
}
