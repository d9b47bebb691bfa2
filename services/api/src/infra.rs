use metrics_exporter_prometheus::PrometheusHandle;
use premium_rating::error::AppError;
use premium_rating::rating::{
    ConfigKey, ConfigurationService, FactorAdministration, MileageFactorInput, RatingStore,
    RegionFactorInput, VehicleTypeInput, DEFAULT_REGION_STATE,
};
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Factors in hundredths, e.g. `120` is `1.20`.
const REGION_FACTORS: &[(&str, i64)] = &[
    (DEFAULT_REGION_STATE, 100),
    ("Baden-Württemberg", 105),
    ("Bayern", 110),
    ("Berlin", 120),
    ("Brandenburg", 90),
    ("Bremen", 115),
    ("Hamburg", 120),
    ("Hessen", 105),
    ("Mecklenburg-Vorpommern", 85),
    ("Niedersachsen", 95),
    ("Nordrhein-Westfalen", 110),
    ("Rheinland-Pfalz", 95),
    ("Saarland", 100),
    ("Sachsen", 90),
    ("Sachsen-Anhalt", 85),
    ("Schleswig-Holstein", 95),
    ("Thüringen", 85),
];

const VEHICLE_FACTORS: &[(&str, i64)] = &[
    ("Kleinwagen", 80),
    ("Kompaktklasse", 100),
    ("Mittelklasse", 120),
    ("Oberklasse", 150),
    ("SUV", 130),
    ("Sportwagen", 180),
    ("Van", 110),
];

/// Contiguous, non-overlapping partition starting at zero.
const MILEAGE_FACTORS: &[(u32, Option<u32>, i64)] = &[
    (0, Some(5_000), 50),
    (5_001, Some(10_000), 100),
    (10_001, Some(20_000), 150),
    (20_001, None, 200),
];

const DEFAULT_BASE_PREMIUM_CENTS: i64 = 50_000;

fn hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) region_factors: usize,
    pub(crate) vehicle_types: usize,
    pub(crate) mileage_factors: usize,
    pub(crate) configurations: usize,
}

/// Fills empty factor tables with the reference tariff. Tables that already hold rows are
/// left untouched, so admin edits survive a restart against a persistent store.
pub(crate) fn seed_reference_data<S>(store: Arc<S>) -> Result<SeedSummary, AppError>
where
    S: RatingStore + ?Sized,
{
    let admin = FactorAdministration::new(Arc::clone(&store));
    let settings = ConfigurationService::new(store);
    let mut summary = SeedSummary::default();

    if admin.region_factors()?.is_empty() {
        for (state, factor) in REGION_FACTORS {
            admin.create_region_factor(RegionFactorInput {
                federal_state: (*state).to_string(),
                factor: hundredths(*factor),
            })?;
            summary.region_factors += 1;
        }
    }

    if admin.vehicle_types()?.is_empty() {
        for (name, factor) in VEHICLE_FACTORS {
            admin.create_vehicle_type(VehicleTypeInput {
                name: (*name).to_string(),
                factor: hundredths(*factor),
            })?;
            summary.vehicle_types += 1;
        }
    }

    if admin.mileage_factors()?.is_empty() {
        for (min_mileage, max_mileage, factor) in MILEAGE_FACTORS {
            admin.create_mileage_factor(MileageFactorInput {
                min_mileage: *min_mileage,
                max_mileage: *max_mileage,
                factor: hundredths(*factor),
            })?;
            summary.mileage_factors += 1;
        }
    }

    if settings.get(ConfigKey::BasePremium)?.is_none() {
        settings.set_base_premium(Decimal::new(DEFAULT_BASE_PREMIUM_CENTS, 2))?;
        summary.configurations += 1;
    }

    info!(
        region_factors = summary.region_factors,
        vehicle_types = summary.vehicle_types,
        mileage_factors = summary.mileage_factors,
        configurations = summary.configurations,
        "seeded reference data"
    );
    Ok(summary)
}
