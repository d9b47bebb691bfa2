use std::sync::Arc;

use tracing::info;

use super::domain::{
    EntityId, MileageFactor, MileageFactorInput, RegionFactor, RegionFactorInput, VehicleType,
    VehicleTypeInput,
};
use super::store::{
    MileageFactorRepository, RegionFactorRepository, RepositoryError, VehicleTypeRepository,
};

/// Which factor table an administrative call addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    Region,
    VehicleType,
    Mileage,
}

impl FactorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Region => "Region factor",
            Self::VehicleType => "Vehicle type",
            Self::Mileage => "Mileage factor",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Minimum mileage must be less than maximum mileage (min {min}, max {max})")]
    InvalidFactorRange { min: u32, max: u32 },
    #[error("{} not found with ID: {id}", .kind.label())]
    NotFound { kind: FactorKind, id: EntityId },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl AdminError {
    fn from_repository(kind: FactorKind, id: Option<EntityId>, err: RepositoryError) -> Self {
        match (err, id) {
            (RepositoryError::NotFound, Some(id)) => Self::NotFound { kind, id },
            (RepositoryError::Conflict(reason), _) => Self::Conflict(reason),
            (other, _) => Self::Repository(other),
        }
    }
}

fn validate_range(input: &MileageFactorInput) -> Result<(), AdminError> {
    match input.max_mileage {
        Some(max) if input.min_mileage >= max => Err(AdminError::InvalidFactorRange {
            min: input.min_mileage,
            max,
        }),
        _ => Ok(()),
    }
}

/// Create/read/update/delete for the three factor tables.
///
/// The only business rule is `min < max` on bounded mileage ranges. Overlaps and gaps
/// between ranges are accepted; the resolver's tie-break handles them.
pub struct FactorAdministration<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for FactorAdministration<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> FactorAdministration<S>
where
    S: RegionFactorRepository + VehicleTypeRepository + MileageFactorRepository + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn region_factors(&self) -> Result<Vec<RegionFactor>, AdminError> {
        self.store.region_factors().map_err(AdminError::Repository)
    }

    pub fn region_factor(&self, id: EntityId) -> Result<RegionFactor, AdminError> {
        let kind = FactorKind::Region;
        self.store
            .region_factor(id)
            .map_err(|err| AdminError::from_repository(kind, Some(id), err))?
            .ok_or(AdminError::NotFound { kind, id })
    }

    pub fn create_region_factor(
        &self,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, AdminError> {
        let created = self
            .store
            .insert_region_factor(input)
            .map_err(|err| AdminError::from_repository(FactorKind::Region, None, err))?;
        info!(id = %created.id, state = %created.federal_state, factor = %created.factor, "created region factor");
        Ok(created)
    }

    pub fn update_region_factor(
        &self,
        id: EntityId,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, AdminError> {
        let updated = self
            .store
            .update_region_factor(id, input)
            .map_err(|err| AdminError::from_repository(FactorKind::Region, Some(id), err))?;
        info!(%id, state = %updated.federal_state, factor = %updated.factor, "updated region factor");
        Ok(updated)
    }

    pub fn delete_region_factor(&self, id: EntityId) -> Result<(), AdminError> {
        self.store
            .delete_region_factor(id)
            .map_err(|err| AdminError::from_repository(FactorKind::Region, Some(id), err))?;
        info!(%id, "deleted region factor");
        Ok(())
    }

    pub fn vehicle_types(&self) -> Result<Vec<VehicleType>, AdminError> {
        self.store.vehicle_types().map_err(AdminError::Repository)
    }

    pub fn vehicle_type(&self, id: EntityId) -> Result<VehicleType, AdminError> {
        let kind = FactorKind::VehicleType;
        self.store
            .vehicle_type(id)
            .map_err(|err| AdminError::from_repository(kind, Some(id), err))?
            .ok_or(AdminError::NotFound { kind, id })
    }

    pub fn create_vehicle_type(&self, input: VehicleTypeInput) -> Result<VehicleType, AdminError> {
        let created = self
            .store
            .insert_vehicle_type(input)
            .map_err(|err| AdminError::from_repository(FactorKind::VehicleType, None, err))?;
        info!(id = %created.id, name = %created.name, factor = %created.factor, "created vehicle type");
        Ok(created)
    }

    pub fn update_vehicle_type(
        &self,
        id: EntityId,
        input: VehicleTypeInput,
    ) -> Result<VehicleType, AdminError> {
        let updated = self
            .store
            .update_vehicle_type(id, input)
            .map_err(|err| AdminError::from_repository(FactorKind::VehicleType, Some(id), err))?;
        info!(%id, name = %updated.name, factor = %updated.factor, "updated vehicle type");
        Ok(updated)
    }

    pub fn delete_vehicle_type(&self, id: EntityId) -> Result<(), AdminError> {
        self.store
            .delete_vehicle_type(id)
            .map_err(|err| AdminError::from_repository(FactorKind::VehicleType, Some(id), err))?;
        info!(%id, "deleted vehicle type");
        Ok(())
    }

    /// Sorted by minimum mileage ascending.
    pub fn mileage_factors(&self) -> Result<Vec<MileageFactor>, AdminError> {
        self.store
            .mileage_factors_ascending()
            .map_err(AdminError::Repository)
    }

    pub fn mileage_factor(&self, id: EntityId) -> Result<MileageFactor, AdminError> {
        let kind = FactorKind::Mileage;
        self.store
            .mileage_factor(id)
            .map_err(|err| AdminError::from_repository(kind, Some(id), err))?
            .ok_or(AdminError::NotFound { kind, id })
    }

    pub fn create_mileage_factor(
        &self,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, AdminError> {
        validate_range(&input)?;
        let created = self
            .store
            .insert_mileage_factor(input)
            .map_err(|err| AdminError::from_repository(FactorKind::Mileage, None, err))?;
        info!(id = %created.id, range = %created.range_label(), factor = %created.factor, "created mileage factor");
        Ok(created)
    }

    pub fn update_mileage_factor(
        &self,
        id: EntityId,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, AdminError> {
        validate_range(&input)?;
        let updated = self
            .store
            .update_mileage_factor(id, input)
            .map_err(|err| AdminError::from_repository(FactorKind::Mileage, Some(id), err))?;
        info!(%id, range = %updated.range_label(), factor = %updated.factor, "updated mileage factor");
        Ok(updated)
    }

    pub fn delete_mileage_factor(&self, id: EntityId) -> Result<(), AdminError> {
        self.store
            .delete_mileage_factor(id)
            .map_err(|err| AdminError::from_repository(FactorKind::Mileage, Some(id), err))?;
        info!(%id, "deleted mileage factor");
        Ok(())
    }
}
