use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
use super::repository::ApplicationRepository;
use crate::rating::{PremiumRequest, PremiumService, RatingStore, RepositoryError, ResolutionError};

/// Turns calculations into stored applications and tracks their review status.
pub struct ApplicationService<S: ?Sized, R> {
    premiums: Arc<PremiumService<S>>,
    repository: Arc<R>,
}

impl<S, R> ApplicationService<S, R>
where
    S: RatingStore + ?Sized,
    R: ApplicationRepository,
{
    pub fn new(premiums: Arc<PremiumService<S>>, repository: Arc<R>) -> Self {
        Self {
            premiums,
            repository,
        }
    }

    /// Calculates the premium and stores the quote with status `NEW`.
    pub fn create(&self, request: &PremiumRequest) -> Result<Application, ApplicationServiceError> {
        let result = self.premiums.calculate(request)?;
        let stored = self
            .repository
            .insert_application(NewApplication::from_calculation(result, Utc::now()))?;

        info!(
            id = %stored.id,
            premium = %stored.calculated_premium,
            postal_code = %stored.postal_code,
            vehicle_type = %stored.vehicle_type,
            annual_mileage = stored.annual_mileage,
            "created application"
        );
        Ok(stored)
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, ApplicationServiceError> {
        self.repository
            .application(id)?
            .ok_or(ApplicationServiceError::NotFound(id))
    }

    pub fn list(&self) -> Result<Vec<Application>, ApplicationServiceError> {
        let applications = self.repository.applications()?;
        debug!(count = applications.len(), "retrieved applications");
        Ok(applications)
    }

    pub fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        let applications = self.repository.applications_by_status(status)?;
        debug!(%status, count = applications.len(), "retrieved applications");
        Ok(applications)
    }

    pub fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ApplicationServiceError> {
        let updated = self
            .repository
            .set_application_status(id, status)
            .map_err(|err| not_found_or(id, err))?;
        info!(%id, %status, "updated application status");
        Ok(updated)
    }

    pub fn delete(&self, id: ApplicationId) -> Result<(), ApplicationServiceError> {
        self.repository
            .delete_application(id)
            .map_err(|err| not_found_or(id, err))?;
        info!(%id, "deleted application");
        Ok(())
    }
}

fn not_found_or(id: ApplicationId, err: RepositoryError) -> ApplicationServiceError {
    match err {
        RepositoryError::NotFound => ApplicationServiceError::NotFound(id),
        other => ApplicationServiceError::Repository(other),
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Calculation(#[from] ResolutionError),
    #[error("Application not found with ID: {0}")]
    NotFound(ApplicationId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
