use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use super::domain::{ApplicationId, ApplicationStatus};
use super::repository::ApplicationRepository;
use super::service::ApplicationService;
use crate::error::AppError;
use crate::rating::{PremiumRequest, RatingStore};

type SharedService<S, R> = Arc<ApplicationService<S, R>>;

/// Routes for creating applications from a quote and moving them through review.
pub fn application_router<S, R>(service: SharedService<S, R>) -> Router
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_handler::<S, R>).post(create_handler::<S, R>),
        )
        .route(
            "/api/applications/:id",
            get(get_handler::<S, R>).delete(delete_handler::<S, R>),
        )
        .route(
            "/api/applications/status/:status",
            get(by_status_handler::<S, R>),
        )
        .route(
            "/api/applications/:id/status/:status",
            put(update_status_handler::<S, R>),
        )
        .with_state(service)
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    raw.parse::<ApplicationStatus>()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

pub(crate) async fn create_handler<S, R>(
    State(service): State<SharedService<S, R>>,
    Json(request): Json<PremiumRequest>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    let application = service.create(&request)?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

pub(crate) async fn get_handler<S, R>(
    State(service): State<SharedService<S, R>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    let application = service.get(ApplicationId(id))?;
    Ok(Json(application).into_response())
}

pub(crate) async fn list_handler<S, R>(
    State(service): State<SharedService<S, R>>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    Ok(Json(service.list()?).into_response())
}

pub(crate) async fn by_status_handler<S, R>(
    State(service): State<SharedService<S, R>>,
    Path(status): Path<String>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    let status = parse_status(&status)?;
    Ok(Json(service.list_by_status(status)?).into_response())
}

pub(crate) async fn update_status_handler<S, R>(
    State(service): State<SharedService<S, R>>,
    Path((id, status)): Path<(u64, String)>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    let status = parse_status(&status)?;
    let application = service.update_status(ApplicationId(id), status)?;
    Ok(Json(application).into_response())
}

pub(crate) async fn delete_handler<S, R>(
    State(service): State<SharedService<S, R>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    service.delete(ApplicationId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
