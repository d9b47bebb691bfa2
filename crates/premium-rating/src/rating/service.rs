use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use super::calculator::{CalculationResult, PremiumCalculator, PremiumRequest};
use super::resolver::ResolutionError;
use super::settings::ConfigurationService;
use super::store::{RatingStore, RepositoryError};
use super::views::{FactorCatalog, FactorView, PostcodeView};

/// Public entry point for premium calculation and the read-only factor catalog.
///
/// Wraps [`PremiumCalculator`] with a tracing span and timing so instrumentation stays
/// out of the arithmetic.
pub struct PremiumService<S: ?Sized> {
    store: Arc<S>,
    calculator: PremiumCalculator<S>,
    settings: ConfigurationService<S>,
}

impl<S> PremiumService<S>
where
    S: RatingStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            calculator: PremiumCalculator::new(Arc::clone(&store)),
            settings: ConfigurationService::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn calculator(&self) -> &PremiumCalculator<S> {
        &self.calculator
    }

    pub fn settings(&self) -> &ConfigurationService<S> {
        &self.settings
    }

    pub fn calculate(&self, request: &PremiumRequest) -> Result<CalculationResult, ResolutionError> {
        let span = info_span!(
            "calculate_premium",
            postal_code = %request.postal_code,
            vehicle_type = %request.vehicle_type,
            annual_mileage = request.annual_mileage,
        );
        let _entered = span.enter();

        let started = Instant::now();
        let outcome = self.calculator.calculate(request);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(result) => info!(
                premium = %result.premium,
                base_premium = %result.base_premium,
                region_factor = %result.region_factor,
                vehicle_type_factor = %result.vehicle_type_factor,
                mileage_factor = %result.mileage_factor,
                elapsed_ms,
                "calculated premium"
            ),
            Err(err) => warn!(error = %err, elapsed_ms, "premium calculation rejected"),
        }

        outcome
    }

    pub fn all_factors(&self) -> Result<FactorCatalog, RepositoryError> {
        Ok(FactorCatalog {
            region_factors: self.region_factor_catalog()?,
            vehicle_type_factors: self.vehicle_factor_catalog()?,
            mileage_factors: self.mileage_factor_catalog()?,
        })
    }

    /// Only factors that at least one loaded region points at, ordered by state.
    pub fn region_factor_catalog(&self) -> Result<Vec<FactorView>, RepositoryError> {
        let mut factors = Vec::new();
        for id in self.store.referenced_region_factor_ids()? {
            if let Some(factor) = self.store.region_factor(id)? {
                factors.push(factor);
            }
        }
        factors.sort_by(|left, right| left.federal_state.cmp(&right.federal_state));
        Ok(factors.iter().map(FactorView::from).collect())
    }

    pub fn vehicle_factor_catalog(&self) -> Result<Vec<FactorView>, RepositoryError> {
        Ok(self
            .store
            .vehicle_types()?
            .iter()
            .map(FactorView::from)
            .collect())
    }

    pub fn mileage_factor_catalog(&self) -> Result<Vec<FactorView>, RepositoryError> {
        Ok(self
            .store
            .mileage_factors_ascending()?
            .iter()
            .map(FactorView::from)
            .collect())
    }

    pub fn find_postcodes_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<PostcodeView>, RepositoryError> {
        let regions = self.store.regions_by_postal_code_prefix(prefix)?;
        debug!(%prefix, matches = regions.len(), "postcode prefix search");
        Ok(regions.into_iter().map(PostcodeView::from).collect())
    }

    pub fn find_postcodes_by_locality(
        &self,
        term: &str,
    ) -> Result<Vec<PostcodeView>, RepositoryError> {
        let regions = self.store.regions_by_locality(term)?;
        debug!(%term, matches = regions.len(), "postcode locality search");
        Ok(regions.into_iter().map(PostcodeView::from).collect())
    }
}
