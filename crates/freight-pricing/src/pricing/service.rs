use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, info};

use super::clock::Clock;
use super::domain::{CalculationRequest, PriceCalculation, PricingRule, RequestId, RuleId};
use super::evaluation::{EngineConfig, PricingEngine};
use super::repository::{CalculationStore, RepositoryError, RuleFilter, RuleRepository};
use super::validation::{validate_request, validate_rule, RuleDraft, RulePatch, ValidationError};

/// Service composing validation, the evaluator, and the storage seams.
pub struct PricingService<R, S, C> {
    rules: Arc<R>,
    calculations: Arc<S>,
    clock: Arc<C>,
    engine: Arc<PricingEngine>,
}

impl<R, S, C> PricingService<R, S, C>
where
    R: RuleRepository + 'static,
    S: CalculationStore + 'static,
    C: Clock + 'static,
{
    pub fn new(rules: Arc<R>, calculations: Arc<S>, clock: Arc<C>, config: EngineConfig) -> Self {
        Self {
            rules,
            calculations,
            clock,
            engine: Arc::new(PricingEngine::new(config)),
        }
    }

    /// Validate the request, price it against the active rules, and record the result.
    pub fn calculate(
        &self,
        request: CalculationRequest,
    ) -> Result<PriceCalculation, PricingServiceError> {
        let shipment = validate_request(request).map_err(|error| {
            debug!(errors = ?error.messages, "rejected calculation request");
            error
        })?;

        let filter = RuleFilter {
            carrier_id: Some(shipment.carrier_id),
            service_type: Some(shipment.service_type.clone()),
            is_active: Some(true),
        };
        let candidates = self.rules.list(&filter)?;
        let now = self.clock.now();

        let calculation = self.engine.calculate(&candidates, shipment, now);
        self.calculations.record(calculation.clone())?;

        info!(
            request_id = %calculation.request_id,
            candidates = candidates.len(),
            applied = calculation.applied_rules.len(),
            total = calculation.calculation.total,
            currency = %calculation.calculation.currency,
            "price calculated"
        );

        Ok(calculation)
    }

    /// Look up a previously recorded calculation.
    pub fn calculation(
        &self,
        request_id: &RequestId,
    ) -> Result<PriceCalculation, PricingServiceError> {
        self.calculations
            .fetch(request_id)?
            .ok_or(PricingServiceError::CalculationNotFound(*request_id))
    }

    pub fn create_rule(&self, draft: RuleDraft) -> Result<PricingRule, PricingServiceError> {
        let definition = validate_rule(draft)?;

        if self.rules.find_by_name(&definition.name)?.is_some() {
            return Err(PricingServiceError::DuplicateName(definition.name));
        }

        let name = definition.name.clone();
        let rule = self
            .rules
            .insert(definition, self.clock.now())
            .map_err(|error| match error {
                RepositoryError::Conflict => PricingServiceError::DuplicateName(name),
                other => other.into(),
            })?;

        info!(
            rule_id = %rule.id,
            name = %rule.name,
            priority = rule.priority,
            "pricing rule created"
        );
        Ok(rule)
    }

    pub fn rule(&self, id: RuleId) -> Result<PricingRule, PricingServiceError> {
        self.rules
            .fetch(id)?
            .ok_or(PricingServiceError::RuleNotFound(id))
    }

    /// Rules admitted by `filter`, most authoritative first.
    pub fn list_rules(&self, filter: &RuleFilter) -> Result<Vec<PricingRule>, PricingServiceError> {
        let mut rules = self.rules.list(filter)?;
        rules.sort_by_key(|rule| (Reverse(rule.priority), rule.id));
        Ok(rules)
    }

    /// Apply a partial update; the merged rule is validated as a whole.
    pub fn update_rule(
        &self,
        id: RuleId,
        patch: RulePatch,
    ) -> Result<PricingRule, PricingServiceError> {
        let mut rule = self.rule(id)?;
        let merged = RuleDraft::from(rule.definition()).merged_with(patch);
        let definition = validate_rule(merged)?;

        if definition.name != rule.name {
            if let Some(existing) = self.rules.find_by_name(&definition.name)? {
                if existing.id != id {
                    return Err(PricingServiceError::DuplicateName(definition.name));
                }
            }
        }

        rule.apply_definition(definition, self.clock.now());
        self.rules.update(rule.clone()).map_err(|error| match error {
            RepositoryError::NotFound => PricingServiceError::RuleNotFound(id),
            RepositoryError::Conflict => PricingServiceError::DuplicateName(rule.name.clone()),
            other => other.into(),
        })?;

        info!(rule_id = %rule.id, name = %rule.name, "pricing rule updated");
        Ok(rule)
    }

    pub fn delete_rule(&self, id: RuleId) -> Result<(), PricingServiceError> {
        self.rules.delete(id).map_err(|error| match error {
            RepositoryError::NotFound => PricingServiceError::RuleNotFound(id),
            other => other.into(),
        })?;
        info!(rule_id = %id, "pricing rule deleted");
        Ok(())
    }
}

/// Error raised by the pricing service.
#[derive(Debug, thiserror::Error)]
pub enum PricingServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("pricing rule {0} not found")]
    RuleNotFound(RuleId),
    #[error("price calculation {0} not found")]
    CalculationNotFound(RequestId),
    #[error("a pricing rule named '{0}' already exists")]
    DuplicateName(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
