use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::clock::Clock;
use super::domain::{CalculationRequest, RequestId, RuleId};
use super::repository::{CalculationStore, RuleFilter, RuleRepository};
use super::service::{PricingService, PricingServiceError};
use super::validation::{RuleDraft, RulePatch, ValidationError};

type SharedService<R, S, C> = Arc<PricingService<R, S, C>>;

/// Router builder exposing calculation and rule management endpoints.
pub fn pricing_router<R, S, C>(service: SharedService<R, S, C>) -> Router
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/pricing/calculate", post(calculate_handler::<R, S, C>))
        .route(
            "/api/v1/pricing/calculations/:request_id",
            get(calculation_handler::<R, S, C>),
        )
        .route(
            "/api/v1/pricing/rules",
            get(list_rules_handler::<R, S, C>).post(create_rule_handler::<R, S, C>),
        )
        .route(
            "/api/v1/pricing/rules/:rule_id",
            get(get_rule_handler::<R, S, C>)
                .put(update_rule_handler::<R, S, C>)
                .delete(delete_rule_handler::<R, S, C>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: PricingServiceError) -> Response {
    match error {
        PricingServiceError::Validation(error) => {
            let payload = json!({
                "error": "validation failed",
                "errors": error.messages,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        PricingServiceError::RuleNotFound(_) | PricingServiceError::CalculationNotFound(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        PricingServiceError::DuplicateName(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        PricingServiceError::Repository(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Undecodable bodies are reported like any other validation failure.
fn rejected_body(rejection: JsonRejection) -> Response {
    error_response(PricingServiceError::Validation(ValidationError {
        messages: vec![rejection.body_text()],
    }))
}

pub(crate) async fn calculate_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    body: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.calculate(request) {
        Ok(calculation) => (StatusCode::OK, Json(calculation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calculation_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    let Ok(uuid) = Uuid::parse_str(&request_id) else {
        let payload = json!({ "error": format!("'{request_id}' is not a valid request id") });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match service.calculation(&RequestId(uuid)) {
        Ok(calculation) => (StatusCode::OK, Json(calculation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_rules_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    Query(filter): Query<RuleFilter>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    match service.list_rules(&filter) {
        Ok(rules) => (StatusCode::OK, Json(rules)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_rule_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    body: Result<Json<RuleDraft>, JsonRejection>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.create_rule(draft) {
        Ok(rule) => (StatusCode::CREATED, Json(rule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_rule_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    Path(rule_id): Path<u64>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    match service.rule(RuleId(rule_id)) {
        Ok(rule) => (StatusCode::OK, Json(rule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_rule_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    Path(rule_id): Path<u64>,
    body: Result<Json<RulePatch>, JsonRejection>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.update_rule(RuleId(rule_id), patch) {
        Ok(rule) => (StatusCode::OK, Json(rule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_rule_handler<R, S, C>(
    State(service): State<SharedService<R, S, C>>,
    Path(rule_id): Path<u64>,
) -> Response
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    match service.delete_rule(RuleId(rule_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
