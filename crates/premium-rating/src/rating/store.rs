//! Storage seams for the rating tables.
//!
//! Each table gets its own trait so the resolver, loader and admin service only see the
//! operations they need. Method names are unique across traits so a single backend can
//! implement all of them; [`RatingStore`] bundles them for the services.

use super::domain::{
    EntityId, MileageFactor, MileageFactorInput, NewRegion, Region, RegionFactor,
    RegionFactorInput, VehicleType, VehicleTypeInput,
};
use super::settings::{ConfigKey, ConfigurationEntry};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("constraint violated: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub trait RegionRepository: Send + Sync {
    /// Exact postal-code match; order is unspecified.
    fn regions_by_postal_code(&self, postal_code: &str) -> Result<Vec<Region>, RepositoryError>;
    fn regions_by_postal_code_prefix(&self, prefix: &str)
        -> Result<Vec<Region>, RepositoryError>;
    /// Case-insensitive substring match on area, city or district.
    fn regions_by_locality(&self, term: &str) -> Result<Vec<Region>, RepositoryError>;
    /// Distinct region-factor ids referenced by at least one region.
    fn referenced_region_factor_ids(&self) -> Result<Vec<EntityId>, RepositoryError>;
    fn region_count(&self) -> Result<usize, RepositoryError>;
}

/// High-throughput write path used only by the region loader.
pub trait RegionBulkWriter: Send + Sync {
    /// Inserts the whole batch or nothing. A failing batch leaves previously
    /// committed batches untouched.
    fn insert_region_batch(&self, batch: &[NewRegion]) -> Result<usize, RepositoryError>;
}

pub trait RegionFactorRepository: Send + Sync {
    fn region_factors(&self) -> Result<Vec<RegionFactor>, RepositoryError>;
    fn region_factor(&self, id: EntityId) -> Result<Option<RegionFactor>, RepositoryError>;
    fn region_factor_by_state(
        &self,
        federal_state: &str,
    ) -> Result<Option<RegionFactor>, RepositoryError>;
    fn insert_region_factor(
        &self,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError>;
    fn update_region_factor(
        &self,
        id: EntityId,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError>;
    fn delete_region_factor(&self, id: EntityId) -> Result<(), RepositoryError>;
}

pub trait VehicleTypeRepository: Send + Sync {
    fn vehicle_types(&self) -> Result<Vec<VehicleType>, RepositoryError>;
    fn vehicle_type(&self, id: EntityId) -> Result<Option<VehicleType>, RepositoryError>;
    /// Case-sensitive exact match.
    fn vehicle_type_by_name(&self, name: &str) -> Result<Option<VehicleType>, RepositoryError>;
    fn insert_vehicle_type(&self, input: VehicleTypeInput)
        -> Result<VehicleType, RepositoryError>;
    fn update_vehicle_type(
        &self,
        id: EntityId,
        input: VehicleTypeInput,
    ) -> Result<VehicleType, RepositoryError>;
    fn delete_vehicle_type(&self, id: EntityId) -> Result<(), RepositoryError>;
}

pub trait MileageFactorRepository: Send + Sync {
    /// Every range sorted by minimum mileage ascending.
    fn mileage_factors_ascending(&self) -> Result<Vec<MileageFactor>, RepositoryError>;
    fn mileage_factor(&self, id: EntityId) -> Result<Option<MileageFactor>, RepositoryError>;
    /// Ranges containing `mileage`, ordered by minimum mileage descending. Ranges sharing
    /// a minimum keep id order.
    fn mileage_factors_covering(&self, mileage: u32)
        -> Result<Vec<MileageFactor>, RepositoryError>;
    fn insert_mileage_factor(
        &self,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, RepositoryError>;
    fn update_mileage_factor(
        &self,
        id: EntityId,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, RepositoryError>;
    fn delete_mileage_factor(&self, id: EntityId) -> Result<(), RepositoryError>;
}

/// Key/value configuration table.
pub trait ConfigurationRepository: Send + Sync {
    fn configuration(&self, key: ConfigKey) -> Result<Option<ConfigurationEntry>, RepositoryError>;
    fn configurations(&self) -> Result<Vec<ConfigurationEntry>, RepositoryError>;
    fn save_configuration(
        &self,
        entry: ConfigurationEntry,
    ) -> Result<ConfigurationEntry, RepositoryError>;
}

/// Every table the rating engine touches.
pub trait RatingStore:
    RegionRepository
    + RegionBulkWriter
    + RegionFactorRepository
    + VehicleTypeRepository
    + MileageFactorRepository
    + ConfigurationRepository
{
}

impl<T> RatingStore for T where
    T: RegionRepository
        + RegionBulkWriter
        + RegionFactorRepository
        + VehicleTypeRepository
        + MileageFactorRepository
        + ConfigurationRepository
{
}
