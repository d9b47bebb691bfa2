use std::sync::Arc;

use axum::response::Response;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationService, ApplicationStatus,
    InMemoryApplicationRepository, NewApplication,
};
use crate::rating::{
    InMemoryRatingStore, MileageFactorInput, MileageFactorRepository, NewRegion, PremiumRequest,
    PremiumService, RegionBulkWriter, RegionFactorInput, RegionFactorRepository, RepositoryError,
    VehicleTypeInput, VehicleTypeRepository,
};

pub(super) type MemoryService = ApplicationService<InMemoryRatingStore, InMemoryApplicationRepository>;

/// Hamburg 1.1, vehicle `Kombi` 1.2, single open mileage range 1.0.
pub(super) fn rating_store() -> Arc<InMemoryRatingStore> {
    let store = Arc::new(InMemoryRatingStore::default());
    let hamburg = store
        .insert_region_factor(RegionFactorInput {
            federal_state: "Hamburg".to_string(),
            factor: dec!(1.1),
        })
        .expect("factor");
    store
        .insert_region_batch(&[NewRegion {
            federal_state: "Hamburg".to_string(),
            country: "Deutschland".to_string(),
            area: "Hamburg".to_string(),
            city: "Hamburg".to_string(),
            postal_code: "20095".to_string(),
            district: "Altstadt".to_string(),
            region_factor_id: hamburg.id,
        }])
        .expect("region");
    store
        .insert_vehicle_type(VehicleTypeInput {
            name: "Kombi".to_string(),
            factor: dec!(1.2),
        })
        .expect("vehicle");
    store
        .insert_mileage_factor(MileageFactorInput {
            min_mileage: 0,
            max_mileage: None,
            factor: dec!(1.0),
        })
        .expect("mileage");
    store
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryApplicationRepository>) {
    let premiums = Arc::new(PremiumService::new(rating_store()));
    let repository = Arc::new(InMemoryApplicationRepository::default());
    (ApplicationService::new(premiums, repository.clone()), repository)
}

pub(super) fn quote() -> PremiumRequest {
    PremiumRequest::new("20095", "Kombi", 12_000)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert_application(&self, _draft: NewApplication) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn application(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications_by_status(
        &self,
        _status: ApplicationStatus,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_application_status(
        &self,
        _id: ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_application(&self, _id: ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
