use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::admin::FactorAdministration;
use super::calculator::PremiumRequest;
use super::domain::{EntityId, MileageFactorInput, RegionFactorInput, VehicleTypeInput};
use super::service::PremiumService;
use super::settings::{ConfigKey, ConfigurationService};
use super::store::RatingStore;
use crate::error::AppError;

/// Every rating-facing service over one shared store.
pub struct RatingServices<S: ?Sized> {
    pub premiums: Arc<PremiumService<S>>,
    pub factors: FactorAdministration<S>,
    pub settings: ConfigurationService<S>,
}

impl<S> RatingServices<S>
where
    S: RatingStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            premiums: Arc::new(PremiumService::new(Arc::clone(&store))),
            factors: FactorAdministration::new(Arc::clone(&store)),
            settings: ConfigurationService::new(store),
        }
    }
}

type Shared<S> = Arc<RatingServices<S>>;

/// Public calculation/catalog routes plus the factor and configuration admin routes.
pub fn rating_router<S>(services: Shared<S>) -> Router
where
    S: RatingStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/premium/calculate", post(calculate_handler::<S>))
        .route("/api/premium/factors", get(all_factors_handler::<S>))
        .route("/api/premium/factors/region", get(region_factors_handler::<S>))
        .route("/api/premium/factors/vehicle", get(vehicle_factors_handler::<S>))
        .route("/api/premium/factors/mileage", get(mileage_factors_handler::<S>))
        .route(
            "/api/premium/postcodes/search/:prefix",
            get(postcode_prefix_handler::<S>),
        )
        .route("/api/premium/postcodes", get(postcode_locality_handler::<S>))
        .route(
            "/api/admin/premium/management/regions",
            get(list_regions::<S>).post(create_region::<S>),
        )
        .route(
            "/api/admin/premium/management/regions/:id",
            get(get_region::<S>)
                .put(update_region::<S>)
                .delete(delete_region::<S>),
        )
        .route(
            "/api/admin/premium/management/vehicles",
            get(list_vehicles::<S>).post(create_vehicle::<S>),
        )
        .route(
            "/api/admin/premium/management/vehicles/:id",
            get(get_vehicle::<S>)
                .put(update_vehicle::<S>)
                .delete(delete_vehicle::<S>),
        )
        .route(
            "/api/admin/premium/management/mileages",
            get(list_mileages::<S>).post(create_mileage::<S>),
        )
        .route(
            "/api/admin/premium/management/mileages/:id",
            get(get_mileage::<S>)
                .put(update_mileage::<S>)
                .delete(delete_mileage::<S>),
        )
        .route("/api/admin/configurations", get(list_configurations::<S>))
        .route(
            "/api/admin/configurations/:key",
            get(get_configuration::<S>).put(put_configuration::<S>),
        )
        .with_state(services)
}

pub(crate) async fn calculate_handler<S>(
    State(services): State<Shared<S>>,
    Json(request): Json<PremiumRequest>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let result = services.premiums.calculate(&request)?;
    Ok(Json(result).into_response())
}

async fn all_factors_handler<S>(State(services): State<Shared<S>>) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.premiums.all_factors()?).into_response())
}

async fn region_factors_handler<S>(
    State(services): State<Shared<S>>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.premiums.region_factor_catalog()?).into_response())
}

async fn vehicle_factors_handler<S>(
    State(services): State<Shared<S>>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.premiums.vehicle_factor_catalog()?).into_response())
}

async fn mileage_factors_handler<S>(
    State(services): State<Shared<S>>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.premiums.mileage_factor_catalog()?).into_response())
}

async fn postcode_prefix_handler<S>(
    State(services): State<Shared<S>>,
    Path(prefix): Path<String>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.premiums.find_postcodes_by_prefix(&prefix)?).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocalityQuery {
    #[serde(default)]
    q: String,
}

async fn postcode_locality_handler<S>(
    State(services): State<Shared<S>>,
    Query(query): Query<LocalityQuery>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let term = query.q.trim();
    if term.is_empty() {
        return Ok(Json(Vec::<()>::new()).into_response());
    }
    Ok(Json(services.premiums.find_postcodes_by_locality(term)?).into_response())
}

async fn list_regions<S>(State(services): State<Shared<S>>) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.region_factors()?).into_response())
}

async fn get_region<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.region_factor(EntityId(id))?).into_response())
}

async fn create_region<S>(
    State(services): State<Shared<S>>,
    Json(input): Json<RegionFactorInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let created = services.factors.create_region_factor(input)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn update_region<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
    Json(input): Json<RegionFactorInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.update_region_factor(EntityId(id), input)?).into_response())
}

async fn delete_region<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    services.factors.delete_region_factor(EntityId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_vehicles<S>(State(services): State<Shared<S>>) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.vehicle_types()?).into_response())
}

async fn get_vehicle<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.vehicle_type(EntityId(id))?).into_response())
}

async fn create_vehicle<S>(
    State(services): State<Shared<S>>,
    Json(input): Json<VehicleTypeInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let created = services.factors.create_vehicle_type(input)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn update_vehicle<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
    Json(input): Json<VehicleTypeInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.update_vehicle_type(EntityId(id), input)?).into_response())
}

async fn delete_vehicle<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    services.factors.delete_vehicle_type(EntityId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_mileages<S>(State(services): State<Shared<S>>) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.mileage_factors()?).into_response())
}

async fn get_mileage<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.mileage_factor(EntityId(id))?).into_response())
}

pub(crate) async fn create_mileage<S>(
    State(services): State<Shared<S>>,
    Json(input): Json<MileageFactorInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let created = services.factors.create_mileage_factor(input)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn update_mileage<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
    Json(input): Json<MileageFactorInput>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.factors.update_mileage_factor(EntityId(id), input)?).into_response())
}

async fn delete_mileage<S>(
    State(services): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    services.factors.delete_mileage_factor(EntityId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_configurations<S>(State(services): State<Shared<S>>) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    Ok(Json(services.settings.list()?).into_response())
}

async fn get_configuration<S>(
    State(services): State<Shared<S>>,
    Path(key): Path<String>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    let key: ConfigKey = key.parse()?;
    match services.settings.get(key)? {
        Some(entry) => Ok(Json(entry).into_response()),
        None => Err(AppError::NotFound(format!("configuration {key} is not set"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigurationUpdate {
    #[serde(default)]
    key: Option<String>,
    value: String,
    #[serde(default)]
    description: Option<String>,
}

pub(crate) async fn put_configuration<S>(
    State(services): State<Shared<S>>,
    Path(key): Path<String>,
    Json(update): Json<ConfigurationUpdate>,
) -> Result<Response, AppError>
where
    S: RatingStore + ?Sized + 'static,
{
    if let Some(body_key) = update.key.as_deref() {
        if body_key != key {
            return Err(AppError::BadRequest(format!(
                "configuration key in path ({key}) and body ({body_key}) differ"
            )));
        }
    }

    let key: ConfigKey = key.parse()?;
    let entry = services
        .settings
        .set_value(key, &update.value, update.description.as_deref())?;
    Ok(Json(entry).into_response())
}
