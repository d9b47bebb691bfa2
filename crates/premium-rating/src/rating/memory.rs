use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::domain::{
    EntityId, MileageFactor, MileageFactorInput, NewRegion, Region, RegionFactor,
    RegionFactorInput, RegionKey, VehicleType, VehicleTypeInput,
};
use super::settings::{ConfigKey, ConfigurationEntry};
use super::store::{
    ConfigurationRepository, MileageFactorRepository, RegionBulkWriter, RegionFactorRepository,
    RegionRepository, RepositoryError, VehicleTypeRepository,
};

/// Process-local backend for every rating table.
///
/// All reads of one call happen under a single read guard, so a lookup never observes a
/// half-applied admin edit or region batch.
#[derive(Default)]
pub struct InMemoryRatingStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    sequence: u64,
    regions: Vec<Region>,
    region_keys: HashSet<RegionKey>,
    /// Postal code to positions in `regions`. Regions are append-only, so positions stay valid.
    postal_index: HashMap<String, Vec<usize>>,
    region_factors: BTreeMap<EntityId, RegionFactor>,
    vehicle_types: BTreeMap<EntityId, VehicleType>,
    mileage_factors: BTreeMap<EntityId, MileageFactor>,
    configurations: BTreeMap<ConfigKey, ConfigurationEntry>,
}

impl Tables {
    fn next_id(&mut self) -> EntityId {
        self.sequence += 1;
        EntityId(self.sequence)
    }

    fn state_taken(&self, federal_state: &str, except: Option<EntityId>) -> bool {
        self.region_factors
            .values()
            .any(|factor| factor.federal_state == federal_state && Some(factor.id) != except)
    }

    fn vehicle_name_taken(&self, name: &str, except: Option<EntityId>) -> bool {
        self.vehicle_types
            .values()
            .any(|vehicle| vehicle.name == name && Some(vehicle.id) != except)
    }
}

impl InMemoryRatingStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("rating store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("rating store lock poisoned".to_string()))
    }
}

impl RegionRepository for InMemoryRatingStore {
    fn regions_by_postal_code(&self, postal_code: &str) -> Result<Vec<Region>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .postal_index
            .get(postal_code)
            .into_iter()
            .flatten()
            .filter_map(|position| tables.regions.get(*position))
            .cloned()
            .collect())
    }

    fn regions_by_postal_code_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<Region>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .regions
            .iter()
            .filter(|region| region.postal_code.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn regions_by_locality(&self, term: &str) -> Result<Vec<Region>, RepositoryError> {
        let needle = term.to_lowercase();
        let tables = self.read()?;
        Ok(tables
            .regions
            .iter()
            .filter(|region| {
                region.area.to_lowercase().contains(&needle)
                    || region.city.to_lowercase().contains(&needle)
                    || region.district.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn referenced_region_factor_ids(&self) -> Result<Vec<EntityId>, RepositoryError> {
        let tables = self.read()?;
        let ids: BTreeSet<EntityId> = tables
            .regions
            .iter()
            .map(|region| region.region_factor_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    fn region_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.regions.len())
    }
}

impl RegionBulkWriter for InMemoryRatingStore {
    fn insert_region_batch(&self, batch: &[NewRegion]) -> Result<usize, RepositoryError> {
        let mut tables = self.write()?;

        let mut staged_keys = HashSet::with_capacity(batch.len());
        for row in batch {
            if !tables.region_factors.contains_key(&row.region_factor_id) {
                return Err(RepositoryError::Conflict(format!(
                    "region factor {} does not exist",
                    row.region_factor_id
                )));
            }
            let key = row.key();
            if tables.region_keys.contains(&key) || !staged_keys.insert(key) {
                return Err(RepositoryError::Conflict(format!(
                    "region {} / {} / {} already exists",
                    row.federal_state, row.postal_code, row.district
                )));
            }
        }

        for row in batch {
            let id = tables.next_id();
            tables.region_keys.insert(row.key());
            let position = tables.regions.len();
            tables
                .postal_index
                .entry(row.postal_code.clone())
                .or_default()
                .push(position);
            tables.regions.push(Region {
                id,
                federal_state: row.federal_state.clone(),
                country: row.country.clone(),
                area: row.area.clone(),
                city: row.city.clone(),
                postal_code: row.postal_code.clone(),
                district: row.district.clone(),
                region_factor_id: row.region_factor_id,
            });
        }

        Ok(batch.len())
    }
}

impl RegionFactorRepository for InMemoryRatingStore {
    fn region_factors(&self) -> Result<Vec<RegionFactor>, RepositoryError> {
        Ok(self.read()?.region_factors.values().cloned().collect())
    }

    fn region_factor(&self, id: EntityId) -> Result<Option<RegionFactor>, RepositoryError> {
        Ok(self.read()?.region_factors.get(&id).cloned())
    }

    fn region_factor_by_state(
        &self,
        federal_state: &str,
    ) -> Result<Option<RegionFactor>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .region_factors
            .values()
            .find(|factor| factor.federal_state == federal_state)
            .cloned())
    }

    fn insert_region_factor(
        &self,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError> {
        let mut tables = self.write()?;
        if tables.state_taken(&input.federal_state, None) {
            return Err(RepositoryError::Conflict(format!(
                "region factor for '{}' already exists",
                input.federal_state
            )));
        }

        let factor = RegionFactor {
            id: tables.next_id(),
            federal_state: input.federal_state,
            factor: input.factor,
        };
        tables.region_factors.insert(factor.id, factor.clone());
        Ok(factor)
    }

    fn update_region_factor(
        &self,
        id: EntityId,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.region_factors.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.state_taken(&input.federal_state, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "region factor for '{}' already exists",
                input.federal_state
            )));
        }

        let factor = RegionFactor {
            id,
            federal_state: input.federal_state,
            factor: input.factor,
        };
        tables.region_factors.insert(id, factor.clone());
        Ok(factor)
    }

    fn delete_region_factor(&self, id: EntityId) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if !tables.region_factors.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .regions
            .iter()
            .any(|region| region.region_factor_id == id)
        {
            return Err(RepositoryError::Conflict(format!(
                "region factor {id} is still referenced by regions"
            )));
        }
        tables.region_factors.remove(&id);
        Ok(())
    }
}

impl VehicleTypeRepository for InMemoryRatingStore {
    fn vehicle_types(&self) -> Result<Vec<VehicleType>, RepositoryError> {
        Ok(self.read()?.vehicle_types.values().cloned().collect())
    }

    fn vehicle_type(&self, id: EntityId) -> Result<Option<VehicleType>, RepositoryError> {
        Ok(self.read()?.vehicle_types.get(&id).cloned())
    }

    fn vehicle_type_by_name(&self, name: &str) -> Result<Option<VehicleType>, RepositoryError> {
        let tables = self.read()?;
        Ok(tables
            .vehicle_types
            .values()
            .find(|vehicle| vehicle.name == name)
            .cloned())
    }

    fn insert_vehicle_type(
        &self,
        input: VehicleTypeInput,
    ) -> Result<VehicleType, RepositoryError> {
        let mut tables = self.write()?;
        if tables.vehicle_name_taken(&input.name, None) {
            return Err(RepositoryError::Conflict(format!(
                "vehicle type '{}' already exists",
                input.name
            )));
        }

        let vehicle = VehicleType {
            id: tables.next_id(),
            name: input.name,
            factor: input.factor,
        };
        tables.vehicle_types.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    fn update_vehicle_type(
        &self,
        id: EntityId,
        input: VehicleTypeInput,
    ) -> Result<VehicleType, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.vehicle_types.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.vehicle_name_taken(&input.name, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "vehicle type '{}' already exists",
                input.name
            )));
        }

        let vehicle = VehicleType {
            id,
            name: input.name,
            factor: input.factor,
        };
        tables.vehicle_types.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    fn delete_vehicle_type(&self, id: EntityId) -> Result<(), RepositoryError> {
        self.write()?
            .vehicle_types
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl MileageFactorRepository for InMemoryRatingStore {
    fn mileage_factors_ascending(&self) -> Result<Vec<MileageFactor>, RepositoryError> {
        let mut ranges: Vec<MileageFactor> =
            self.read()?.mileage_factors.values().cloned().collect();
        ranges.sort_by_key(|range| (range.min_mileage, range.id));
        Ok(ranges)
    }

    fn mileage_factor(&self, id: EntityId) -> Result<Option<MileageFactor>, RepositoryError> {
        Ok(self.read()?.mileage_factors.get(&id).cloned())
    }

    fn mileage_factors_covering(
        &self,
        mileage: u32,
    ) -> Result<Vec<MileageFactor>, RepositoryError> {
        let mut ranges: Vec<MileageFactor> = self
            .read()?
            .mileage_factors
            .values()
            .filter(|range| range.covers(mileage))
            .cloned()
            .collect();
        ranges.sort_by(|a, b| {
            b.min_mileage
                .cmp(&a.min_mileage)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(ranges)
    }

    fn insert_mileage_factor(
        &self,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, RepositoryError> {
        let mut tables = self.write()?;
        let range = MileageFactor {
            id: tables.next_id(),
            min_mileage: input.min_mileage,
            max_mileage: input.max_mileage,
            factor: input.factor,
        };
        tables.mileage_factors.insert(range.id, range.clone());
        Ok(range)
    }

    fn update_mileage_factor(
        &self,
        id: EntityId,
        input: MileageFactorInput,
    ) -> Result<MileageFactor, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.mileage_factors.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }

        let range = MileageFactor {
            id,
            min_mileage: input.min_mileage,
            max_mileage: input.max_mileage,
            factor: input.factor,
        };
        tables.mileage_factors.insert(id, range.clone());
        Ok(range)
    }

    fn delete_mileage_factor(&self, id: EntityId) -> Result<(), RepositoryError> {
        self.write()?
            .mileage_factors
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl ConfigurationRepository for InMemoryRatingStore {
    fn configuration(&self, key: ConfigKey) -> Result<Option<ConfigurationEntry>, RepositoryError> {
        Ok(self.read()?.configurations.get(&key).cloned())
    }

    fn configurations(&self) -> Result<Vec<ConfigurationEntry>, RepositoryError> {
        Ok(self.read()?.configurations.values().cloned().collect())
    }

    fn save_configuration(
        &self,
        entry: ConfigurationEntry,
    ) -> Result<ConfigurationEntry, RepositoryError> {
        self.write()?
            .configurations
            .insert(entry.key, entry.clone());
        Ok(entry)
    }
}
