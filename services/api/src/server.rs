use crate::cli::ServeArgs;
use crate::infra::{default_rule_catalog, seed_repository, AppState};
use crate::routes::with_pricing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use freight_pricing::config::AppConfig;
use freight_pricing::error::AppError;
use freight_pricing::pricing::{
    Clock, InMemoryCalculationStore, InMemoryRuleRepository, PricingService, PricingServiceError,
    SystemClock,
};
use freight_pricing::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let clock = Arc::new(SystemClock);
    let rules = Arc::new(InMemoryRuleRepository::default());
    if !args.no_seed {
        let seeded = seed_repository(&rules, default_rule_catalog(), clock.now())
            .map_err(PricingServiceError::from)?;
        info!(rules = seeded, "seeded pricing rule catalog");
    }

    let pricing_service = Arc::new(PricingService::new(
        rules,
        Arc::new(InMemoryCalculationStore::default()),
        clock,
        config.pricing.clone(),
    ));

    let app = with_pricing_routes(pricing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        missing_distance = ?config.pricing.missing_distance,
        "freight pricing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
