//! Shipment pricing: rule matching, price composition, and the management
//! surface around the rule set.

pub mod clock;
pub mod domain;
pub mod evaluation;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Adjustment, AppliedAdjustment, AppliedRule, CalculationBreakdown, CalculationRequest,
    NumericRange, PriceCalculation, PricingRule, RequestId, RuleConditions, RuleDefinition,
    RuleId, RulePricing, ShipmentRequest,
};
pub use evaluation::{
    compose_price, find_applicable_rules, EngineConfig, MissingDistancePolicy, PricingEngine,
    Quote,
};
pub use memory::{InMemoryCalculationStore, InMemoryRuleRepository};
pub use repository::{CalculationStore, RepositoryError, RuleFilter, RuleRepository};
pub use router::pricing_router;
pub use service::{PricingService, PricingServiceError};
pub use validation::{validate_request, validate_rule, RuleDraft, RulePatch, ValidationError};
