use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::rating::{
    EntityId, InMemoryRatingStore, MileageFactor, MileageFactorInput, MileageFactorRepository,
    NewRegion, PremiumService, Region, RegionBulkWriter, RegionFactor, RegionFactorInput,
    RegionFactorRepository, RegionRepository, RepositoryError, VehicleType, VehicleTypeInput,
    VehicleTypeRepository,
};

pub(super) const CSV_HEADER: &str = "REGION1,REGION3,REGION4,ORT,POSTLEITZAHL,AREA1";

pub(super) fn empty_store() -> Arc<InMemoryRatingStore> {
    Arc::new(InMemoryRatingStore::default())
}

pub(super) fn add_region_factor(
    store: &InMemoryRatingStore,
    state: &str,
    factor: Decimal,
) -> RegionFactor {
    store
        .insert_region_factor(RegionFactorInput {
            federal_state: state.to_string(),
            factor,
        })
        .expect("region factor stored")
}

pub(super) fn add_vehicle(store: &InMemoryRatingStore, name: &str, factor: Decimal) -> VehicleType {
    store
        .insert_vehicle_type(VehicleTypeInput {
            name: name.to_string(),
            factor,
        })
        .expect("vehicle type stored")
}

pub(super) fn add_mileage(
    store: &InMemoryRatingStore,
    min: u32,
    max: Option<u32>,
    factor: Decimal,
) -> MileageFactor {
    store
        .insert_mileage_factor(MileageFactorInput {
            min_mileage: min,
            max_mileage: max,
            factor,
        })
        .expect("mileage factor stored")
}

pub(super) fn new_region(
    state: &str,
    city: &str,
    postal_code: &str,
    district: &str,
    factor: EntityId,
) -> NewRegion {
    NewRegion {
        federal_state: state.to_string(),
        country: "Deutschland".to_string(),
        area: city.to_string(),
        city: city.to_string(),
        postal_code: postal_code.to_string(),
        district: district.to_string(),
        region_factor_id: factor,
    }
}

pub(super) fn add_regions(store: &InMemoryRatingStore, rows: &[NewRegion]) {
    store.insert_region_batch(rows).expect("regions stored");
}

/// DEFAULT 1.0, Berlin 1.2, Bayern 1.1 and Thüringen 0.9; regions for Berlin-Mitte
/// (10115), two Berlin districts sharing 10117, and 07919 straddling Bayern and
/// Thüringen. Vehicles `Kompaktklasse` 1.0 and `SUV` 1.5. Mileage partition
/// 0-5000 0.8, 5001-15000 1.0, 15001-30000 1.2, 30001+ 1.5.
pub(super) fn standard_store() -> Arc<InMemoryRatingStore> {
    let store = empty_store();
    add_region_factor(&store, "DEFAULT", dec!(1.0));
    let berlin = add_region_factor(&store, "Berlin", dec!(1.2));
    let bayern = add_region_factor(&store, "Bayern", dec!(1.1));
    let thueringen = add_region_factor(&store, "Thüringen", dec!(0.9));

    add_regions(
        &store,
        &[
            new_region("Berlin", "Berlin", "10115", "Mitte", berlin.id),
            new_region("Berlin", "Berlin", "10117", "Mitte", berlin.id),
            new_region("Berlin", "Berlin", "10117", "Tiergarten", berlin.id),
            new_region("Bayern", "Hof", "07919", "Hof", bayern.id),
            new_region("Thüringen", "Pausa", "07919", "Pausa", thueringen.id),
        ],
    );

    add_vehicle(&store, "Kompaktklasse", dec!(1.0));
    add_vehicle(&store, "SUV", dec!(1.5));

    add_mileage(&store, 0, Some(5000), dec!(0.8));
    add_mileage(&store, 5001, Some(15000), dec!(1.0));
    add_mileage(&store, 15001, Some(30000), dec!(1.2));
    add_mileage(&store, 30001, None, dec!(1.5));

    store
}

pub(super) fn standard_service() -> (Arc<InMemoryRatingStore>, PremiumService<InMemoryRatingStore>) {
    let store = standard_store();
    let service = PremiumService::new(store.clone());
    (store, service)
}

pub(super) fn csv(rows: &[&str]) -> String {
    let mut data = String::from(CSV_HEADER);
    for row in rows {
        data.push('\n');
        data.push_str(row);
    }
    data.push('\n');
    data
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Delegates to an in-memory store but rejects the n-th region batch.
pub(super) struct FailingBatchStore {
    pub(super) inner: InMemoryRatingStore,
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingBatchStore {
    pub(super) fn failing_on(batch: usize) -> Self {
        Self {
            inner: InMemoryRatingStore::default(),
            fail_on: batch,
            calls: AtomicUsize::new(0),
        }
    }
}

impl RegionRepository for FailingBatchStore {
    fn regions_by_postal_code(&self, postal_code: &str) -> Result<Vec<Region>, RepositoryError> {
        self.inner.regions_by_postal_code(postal_code)
    }

    fn regions_by_postal_code_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<Region>, RepositoryError> {
        self.inner.regions_by_postal_code_prefix(prefix)
    }

    fn regions_by_locality(&self, term: &str) -> Result<Vec<Region>, RepositoryError> {
        self.inner.regions_by_locality(term)
    }

    fn referenced_region_factor_ids(&self) -> Result<Vec<EntityId>, RepositoryError> {
        self.inner.referenced_region_factor_ids()
    }

    fn region_count(&self) -> Result<usize, RepositoryError> {
        self.inner.region_count()
    }
}

impl RegionBulkWriter for FailingBatchStore {
    fn insert_region_batch(&self, batch: &[NewRegion]) -> Result<usize, RepositoryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.insert_region_batch(batch)
    }
}

impl RegionFactorRepository for FailingBatchStore {
    fn region_factors(&self) -> Result<Vec<RegionFactor>, RepositoryError> {
        self.inner.region_factors()
    }

    fn region_factor(&self, id: EntityId) -> Result<Option<RegionFactor>, RepositoryError> {
        self.inner.region_factor(id)
    }

    fn region_factor_by_state(
        &self,
        federal_state: &str,
    ) -> Result<Option<RegionFactor>, RepositoryError> {
        self.inner.region_factor_by_state(federal_state)
    }

    fn insert_region_factor(
        &self,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError> {
        self.inner.insert_region_factor(input)
    }

    fn update_region_factor(
        &self,
        id: EntityId,
        input: RegionFactorInput,
    ) -> Result<RegionFactor, RepositoryError> {
        self.inner.update_region_factor(id, input)
    }

    fn delete_region_factor(&self, id: EntityId) -> Result<(), RepositoryError> {
        self.inner.delete_region_factor(id)
    }
}
