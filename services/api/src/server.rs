use crate::cli::ServeArgs;
use crate::infra::{seed_reference_data, AppState};
use crate::routes::app_router;
use axum_prometheus::PrometheusMetricLayer;
use premium_rating::applications::{ApplicationService, InMemoryApplicationRepository};
use premium_rating::config::AppConfig;
use premium_rating::error::AppError;
use premium_rating::rating::{bootstrap_regions, InMemoryRatingStore, RatingServices};
use premium_rating::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let store = Arc::new(InMemoryRatingStore::default());
    seed_reference_data(Arc::clone(&store))?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = Arc::new(RatingServices::new(Arc::clone(&store)));
    let applications = Arc::new(ApplicationService::new(
        Arc::clone(&services.premiums),
        Arc::new(InMemoryApplicationRepository::default()),
    ));

    let app = app_router(services, applications, app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let regions = config.regions.clone();
    tokio::spawn(async move {
        let outcome =
            tokio::task::spawn_blocking(move || bootstrap_regions(store, &regions)).await;
        match outcome {
            Ok(Some(outcome)) => info!(inserted = outcome.inserted(), "region bootstrap finished"),
            Ok(None) => warn!("region bootstrap failed, serving without postal regions"),
            Err(err) => error!(error = %err, "region bootstrap task aborted"),
        }
        readiness_flag.store(true, Ordering::Release);
    });

    info!(?config.environment, %addr, "premium service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
