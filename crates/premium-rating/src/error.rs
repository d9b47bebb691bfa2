use crate::applications::ApplicationServiceError;
use crate::config::ConfigError;
use crate::rating::{AdminError, RegionLoadError, RepositoryError, ResolutionError, SettingsError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    BadRequest(String),
    NotFound(String),
    Resolution(ResolutionError),
    Admin(AdminError),
    Settings(SettingsError),
    Repository(RepositoryError),
    RegionLoad(RegionLoadError),
    Application(ApplicationServiceError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Resolution(err) => resolution_status(err),
            AppError::Admin(err) => match err {
                AdminError::InvalidFactorRange { .. } => StatusCode::BAD_REQUEST,
                AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
                AdminError::Conflict(_) => StatusCode::CONFLICT,
                AdminError::Repository(inner) => repository_status(inner),
            },
            AppError::Settings(err) => settings_status(err),
            AppError::Repository(err) => repository_status(err),
            AppError::Application(err) => match err {
                ApplicationServiceError::Calculation(inner) => resolution_status(inner),
                ApplicationServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ApplicationServiceError::Repository(inner) => repository_status(inner),
            },
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::RegionLoad(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn settings_status(err: &SettingsError) -> StatusCode {
    match err {
        SettingsError::KeyNotAllowed(_) | SettingsError::InvalidValue { .. } => {
            StatusCode::BAD_REQUEST
        }
        SettingsError::Repository(inner) => repository_status(inner),
    }
}

fn resolution_status(err: &ResolutionError) -> StatusCode {
    match err {
        ResolutionError::UnresolvableRegion { .. }
        | ResolutionError::UnknownVehicleType { .. }
        | ResolutionError::UnresolvableMileage { .. }
        | ResolutionError::PremiumOverflow => StatusCode::BAD_REQUEST,
        ResolutionError::Settings(inner) => settings_status(inner),
        ResolutionError::Repository(inner) => repository_status(inner),
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::RegionLoad(err) => write!(f, "region import error: {}", err),
            AppError::BadRequest(message) | AppError::NotFound(message) => f.write_str(message),
            AppError::Resolution(err) => write!(f, "{}", err),
            AppError::Admin(err) => write!(f, "{}", err),
            AppError::Settings(err) => write!(f, "{}", err),
            AppError::Repository(err) => write!(f, "{}", err),
            AppError::Application(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::RegionLoad(err) => Some(err),
            AppError::Resolution(err) => Some(err),
            AppError::Admin(err) => Some(err),
            AppError::Settings(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::BadRequest(_) | AppError::NotFound(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RegionLoadError> for AppError {
    fn from(value: RegionLoadError) -> Self {
        Self::RegionLoad(value)
    }
}

impl From<ResolutionError> for AppError {
    fn from(value: ResolutionError) -> Self {
        Self::Resolution(value)
    }
}

impl From<AdminError> for AppError {
    fn from(value: AdminError) -> Self {
        Self::Admin(value)
    }
}

impl From<SettingsError> for AppError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}
