//! Premium rating: factor tables, rate resolution, calculation and region import.
//!
//! A premium is `base × region × vehicle × mileage`, rounded once to cents. The factors
//! come from a [`RatingStore`]; [`PremiumService`] is the entry point callers use.

pub mod admin;
pub mod calculator;
pub mod domain;
pub mod loader;
pub mod memory;
pub mod resolver;
pub mod router;
pub mod service;
pub mod settings;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use admin::{AdminError, FactorAdministration, FactorKind};
pub use calculator::{premium_for, CalculationResult, PremiumCalculator, PremiumRequest};
pub use domain::{
    EntityId, MileageFactor, MileageFactorInput, NewRegion, Region, RegionFactor,
    RegionFactorInput, RegionKey, VehicleType, VehicleTypeInput, DEFAULT_REGION_STATE,
};
pub use loader::{
    bootstrap_regions, RegionDataLoader, RegionLoadError, RegionLoadOutcome, RegionLoadReport,
};
pub use memory::InMemoryRatingStore;
pub use resolver::{RateResolver, RegionRejection, ResolutionError};
pub use router::{rating_router, RatingServices};
pub use service::PremiumService;
pub use settings::{ConfigKey, ConfigurationEntry, ConfigurationService, SettingsError};
pub use store::{
    ConfigurationRepository, MileageFactorRepository, RatingStore, RegionBulkWriter,
    RegionFactorRepository, RegionRepository, RepositoryError, VehicleTypeRepository,
};
pub use views::{FactorCatalog, FactorView, PostcodeView};
