use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{Application, ApplicationId, ApplicationStatus, NewApplication};
use crate::rating::RepositoryError;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(&self, draft: NewApplication) -> Result<Application, RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Every application, oldest first.
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryApplicationRepository {
    inner: Mutex<ApplicationTable>,
}

#[derive(Default)]
struct ApplicationTable {
    sequence: u64,
    rows: BTreeMap<ApplicationId, Application>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, ApplicationTable>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Unavailable("application store lock poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert_application(&self, draft: NewApplication) -> Result<Application, RepositoryError> {
        let mut table = self.lock()?;
        table.sequence += 1;
        let application = draft.with_id(ApplicationId(table.sequence));
        table.rows.insert(application.id, application.clone());
        Ok(application)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    fn applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .lock()?
            .rows
            .values()
            .filter(|application| application.status == status)
            .cloned()
            .collect())
    }

    fn set_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut table = self.lock()?;
        let application = table.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        application.status = status;
        Ok(application.clone())
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.lock()?
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
