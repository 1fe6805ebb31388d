mod composition;
mod config;
mod matching;

pub use composition::{clamp_total, compose_price, select_base_rule};
pub use config::{EngineConfig, MissingDistancePolicy};
pub use matching::find_applicable_rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AppliedRule, CalculationBreakdown, PriceCalculation, PricingRule, RequestId, ShipmentRequest,
};

/// Stateless evaluator applying the pricing rules to a shipment request.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn applicable_rules<'a>(
        &self,
        rules: &'a [PricingRule],
        request: &ShipmentRequest,
        now: DateTime<Utc>,
    ) -> Vec<&'a PricingRule> {
        find_applicable_rules(rules, request, now, self.config.missing_distance)
    }

    /// Pure evaluation of `(rules, request, now)`.
    pub fn quote(
        &self,
        rules: &[PricingRule],
        request: &ShipmentRequest,
        now: DateTime<Utc>,
    ) -> Quote {
        let applicable = self.applicable_rules(rules, request, now);
        let (calculation, applied_rules) =
            compose_price(&applicable, request, &self.config.default_currency);

        Quote {
            calculation,
            applied_rules,
        }
    }

    /// Evaluates and wraps the result into an audit record.
    pub fn calculate(
        &self,
        rules: &[PricingRule],
        request: ShipmentRequest,
        now: DateTime<Utc>,
    ) -> PriceCalculation {
        let quote = self.quote(rules, &request, now);
        quote.into_calculation(RequestId::generate(), request, now)
    }
}

/// Evaluator output before it is stamped with a request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub calculation: CalculationBreakdown,
    pub applied_rules: Vec<AppliedRule>,
}

impl Quote {
    pub fn into_calculation(
        self,
        request_id: RequestId,
        request: ShipmentRequest,
        calculated_at: DateTime<Utc>,
    ) -> PriceCalculation {
        PriceCalculation {
            request_id,
            request,
            calculation: self.calculation,
            applied_rules: self.applied_rules,
            calculated_at,
        }
    }
}
