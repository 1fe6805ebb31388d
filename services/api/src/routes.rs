use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use freight_pricing::pricing::{
    pricing_router, CalculationStore, Clock, PricingService, RuleRepository,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_pricing_routes<R, S, C>(service: Arc<PricingService<R, S, C>>) -> axum::Router
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    pricing_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use freight_pricing::pricing::{
        EngineConfig, InMemoryCalculationStore, InMemoryRuleRepository, SystemClock,
    };
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let service = PricingService::new(
            Arc::new(InMemoryRuleRepository::default()),
            Arc::new(InMemoryCalculationStore::default()),
            Arc::new(SystemClock),
            EngineConfig::default(),
        );
        with_pricing_routes(Arc::new(service))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn health_route_is_mounted_next_to_pricing_routes() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pricing/rules")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
