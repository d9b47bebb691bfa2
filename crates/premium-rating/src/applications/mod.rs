//! Insurance applications: a calculated quote persisted for review.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Application, ApplicationId, ApplicationStatus, NewApplication, UnknownStatus};
pub use repository::{ApplicationRepository, InMemoryApplicationRepository};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
