use crate::infra::AppState;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use premium_rating::applications::{
    application_router, ApplicationRepository, ApplicationService,
};
use premium_rating::rating::{rating_router, RatingServices, RatingStore};
use serde_json::json;
use std::sync::Arc;

/// Rating, admin and application routes plus the operational endpoints. The API routes answer
/// 503 until region bootstrap has finished; the operational endpoints are always served.
pub(crate) fn app_router<S, R>(
    services: Arc<RatingServices<S>>,
    applications: Arc<ApplicationService<S, R>>,
    state: AppState,
) -> Router
where
    S: RatingStore + ?Sized + 'static,
    R: ApplicationRepository + 'static,
{
    rating_router(services)
        .merge(application_router(applications))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_ready))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(state))
}

async fn require_ready(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.readiness.load(std::sync::atomic::Ordering::Acquire) {
        return next.run(request).await;
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "region data is still loading" })),
    )
        .into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "loading regions" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
