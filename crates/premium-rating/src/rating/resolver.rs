use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::domain::{EntityId, MileageFactor, RegionFactor};
use super::settings::SettingsError;
use super::store::{
    MileageFactorRepository, RegionFactorRepository, RegionRepository, RepositoryError,
    VehicleTypeRepository,
};

/// Why a postal code could not be mapped to a single region factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionRejection {
    NoRegion,
    SpansStates(Vec<String>),
    MissingFactor(EntityId),
}

impl fmt::Display for RegionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionRejection::NoRegion => write!(f, "no region is registered for it"),
            RegionRejection::SpansStates(states) => {
                write!(f, "it spans several federal states ({})", states.join(", "))
            }
            RegionRejection::MissingFactor(id) => write!(f, "region factor {id} is missing"),
        }
    }
}

/// Rejection reasons surfaced to calculation callers.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("No region factor found for postal code: {postal_code} ({reason})")]
    UnresolvableRegion {
        postal_code: String,
        reason: RegionRejection,
    },
    #[error("Unknown vehicle type: {name}")]
    UnknownVehicleType { name: String },
    #[error("No mileage factor found for mileage: {mileage}")]
    UnresolvableMileage { mileage: u32 },
    #[error("premium does not fit the decimal range")]
    PremiumOverflow,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Maps raw request fields to stored factors.
pub struct RateResolver<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for RateResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RateResolver<S>
where
    S: RegionRepository
        + RegionFactorRepository
        + VehicleTypeRepository
        + MileageFactorRepository
        + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn resolve_region_factor(&self, postal_code: &str) -> Result<Decimal, ResolutionError> {
        self.resolve_region(postal_code).map(|factor| factor.factor)
    }

    /// A postal code resolves when all of its regions belong to one federal state; the
    /// first region's factor is used. Codes straddling a state border are rejected.
    pub fn resolve_region(&self, postal_code: &str) -> Result<RegionFactor, ResolutionError> {
        debug!(%postal_code, "resolving region factor");
        let regions = self.store.regions_by_postal_code(postal_code)?;

        let reject = |reason: RegionRejection| {
            warn!(%postal_code, %reason, "region factor not found");
            ResolutionError::UnresolvableRegion {
                postal_code: postal_code.to_string(),
                reason,
            }
        };

        let Some(first) = regions.iter().min_by_key(|region| region.id) else {
            return Err(reject(RegionRejection::NoRegion));
        };

        let states: BTreeSet<&str> = regions
            .iter()
            .map(|region| region.federal_state.as_str())
            .collect();
        if states.len() > 1 {
            let states = states.into_iter().map(str::to_string).collect();
            return Err(reject(RegionRejection::SpansStates(states)));
        }

        let factor = self
            .store
            .region_factor(first.region_factor_id)?
            .ok_or_else(|| reject(RegionRejection::MissingFactor(first.region_factor_id)))?;

        debug!(
            %postal_code,
            state = %first.federal_state,
            factor = %factor.factor,
            "found region factor"
        );
        Ok(factor)
    }

    /// Exact, case-sensitive name match.
    pub fn resolve_vehicle_factor(&self, name: &str) -> Result<Decimal, ResolutionError> {
        debug!(vehicle_type = %name, "resolving vehicle factor");
        match self.store.vehicle_type_by_name(name)? {
            Some(vehicle) => {
                debug!(vehicle_type = %name, factor = %vehicle.factor, "found vehicle factor");
                Ok(vehicle.factor)
            }
            None => {
                warn!(vehicle_type = %name, "vehicle type not found");
                Err(ResolutionError::UnknownVehicleType {
                    name: name.to_string(),
                })
            }
        }
    }

    pub fn resolve_mileage_factor(&self, mileage: u32) -> Result<Decimal, ResolutionError> {
        self.resolve_mileage_range(mileage).map(|range| range.factor)
    }

    /// Overlapping ranges are tolerated: the covering range with the highest minimum
    /// mileage wins.
    pub fn resolve_mileage_range(&self, mileage: u32) -> Result<MileageFactor, ResolutionError> {
        debug!(annual_mileage = mileage, "resolving mileage factor");
        let candidates = self.store.mileage_factors_covering(mileage)?;

        if candidates.len() > 1 {
            debug!(
                annual_mileage = mileage,
                matches = candidates.len(),
                "overlapping mileage ranges, taking highest minimum"
            );
        }

        match candidates.into_iter().next() {
            Some(range) => {
                debug!(
                    annual_mileage = mileage,
                    factor = %range.factor,
                    range = %range.range_label(),
                    "found mileage factor"
                );
                Ok(range)
            }
            None => {
                warn!(annual_mileage = mileage, "mileage factor not found");
                Err(ResolutionError::UnresolvableMileage { mileage })
            }
        }
    }
}
