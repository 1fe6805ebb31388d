use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::pricing::clock::FixedClock;
use crate::pricing::domain::{
    Adjustment, CalculationRequest, PriceCalculation, PricingRule, RequestId, RuleConditions,
    RuleDefinition, RuleId, RulePricing, ShipmentRequest,
};
use crate::pricing::evaluation::{EngineConfig, PricingEngine};
use crate::pricing::memory::{InMemoryCalculationStore, InMemoryRuleRepository};
use crate::pricing::repository::{CalculationStore, RepositoryError, RuleFilter, RuleRepository};
use crate::pricing::service::PricingService;
use crate::pricing::validation::RuleDraft;

pub(super) type MemoryService =
    PricingService<InMemoryRuleRepository, InMemoryCalculationStore, FixedClock>;

pub(super) fn instant(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn now() -> DateTime<Utc> {
    instant(2025, 6, 1)
}

pub(super) fn shipment() -> ShipmentRequest {
    ShipmentRequest {
        carrier_id: 1,
        service_type: "express".to_string(),
        weight: 5.0,
        distance: None,
        origin_country: "US".to_string(),
        destination_country: "CA".to_string(),
        customer_type: None,
        customer_id: None,
    }
}

pub(super) fn calculation_request() -> CalculationRequest {
    CalculationRequest {
        carrier_id: Some(1),
        service_type: Some("express".to_string()),
        weight: Some(5.0),
        distance: None,
        origin_country: Some("US".to_string()),
        destination_country: Some("CA".to_string()),
        customer_type: None,
        customer_id: Some("cust-42".to_string()),
    }
}

pub(super) fn base_pricing(base_rate: f64, per_kg_rate: Option<f64>) -> RulePricing {
    RulePricing {
        base_rate,
        per_kg_rate,
        ..RulePricing::adjustments_only("USD")
    }
}

pub(super) fn rule(id: u64, priority: u16, pricing: RulePricing) -> PricingRule {
    PricingRule {
        id: RuleId(id),
        name: format!("rule-{id}"),
        description: None,
        is_active: true,
        conditions: RuleConditions::default(),
        pricing,
        priority,
        valid_from: None,
        valid_to: None,
        created_at: instant(2025, 1, 1),
        updated_at: instant(2025, 1, 1),
    }
}

pub(super) fn fuel_rule() -> PricingRule {
    let mut pricing = base_pricing(15.99, Some(2.5));
    pricing.surcharges.push(Adjustment::percent("Fuel", 8.5));
    rule(1, 100, pricing)
}

pub(super) fn premium_discount_rule(id: u64) -> PricingRule {
    let mut pricing = RulePricing::adjustments_only("USD");
    pricing.discounts.push(Adjustment::percent("Premium", 10.0));
    rule(id, 200, pricing)
}

pub(super) fn engine() -> PricingEngine {
    PricingEngine::new(EngineConfig::default())
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn rule_draft(name: &str) -> RuleDraft {
    RuleDraft {
        name: Some(name.to_string()),
        description: Some("Express base rate".to_string()),
        is_active: None,
        conditions: Some(RuleConditions {
            carrier_id: Some(1),
            service_type: Some("express".to_string()),
            ..RuleConditions::default()
        }),
        pricing: Some(base_pricing(20.0, Some(1.5))),
        priority: Some(100),
        valid_from: None,
        valid_to: None,
    }
}

pub(super) fn definition(name: &str, pricing: RulePricing, priority: u16) -> RuleDefinition {
    RuleDefinition {
        name: name.to_string(),
        description: None,
        is_active: true,
        conditions: RuleConditions::default(),
        pricing,
        priority,
        valid_from: None,
        valid_to: None,
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryRuleRepository>,
    Arc<InMemoryCalculationStore>,
) {
    let rules = Arc::new(InMemoryRuleRepository::default());
    let calculations = Arc::new(InMemoryCalculationStore::default());
    let service = PricingService::new(
        rules.clone(),
        calculations.clone(),
        Arc::new(FixedClock(now())),
        EngineConfig::default(),
    );
    (service, rules, calculations)
}

pub(super) struct UnavailableRepository;

impl RuleRepository for UnavailableRepository {
    fn insert(
        &self,
        _definition: RuleDefinition,
        _created_at: DateTime<Utc>,
    ) -> Result<PricingRule, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _rule: PricingRule) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: RuleId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: RuleId) -> Result<Option<PricingRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_name(&self, _name: &str) -> Result<Option<PricingRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &RuleFilter) -> Result<Vec<PricingRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ReadOnlyStore;

impl CalculationStore for ReadOnlyStore {
    fn record(&self, _calculation: PriceCalculation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _request_id: &RequestId) -> Result<Option<PriceCalculation>, RepositoryError> {
        Ok(None)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
