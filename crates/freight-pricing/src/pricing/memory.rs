use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{PriceCalculation, PricingRule, RequestId, RuleDefinition, RuleId};
use super::repository::{CalculationStore, RepositoryError, RuleFilter, RuleRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

/// Process-local rule repository. Ids start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct InMemoryRuleRepository {
    rules: Arc<Mutex<BTreeMap<RuleId, PricingRule>>>,
    sequence: Arc<AtomicU64>,
}

impl Default for InMemoryRuleRepository {
    fn default() -> Self {
        Self {
            rules: Arc::default(),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn insert(
        &self,
        definition: RuleDefinition,
        created_at: DateTime<Utc>,
    ) -> Result<PricingRule, RepositoryError> {
        let mut guard = lock(&self.rules)?;
        if guard.values().any(|rule| rule.name == definition.name) {
            return Err(RepositoryError::Conflict);
        }
        let id = RuleId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let rule = PricingRule::from_definition(id, definition, created_at);
        guard.insert(id, rule.clone());
        Ok(rule)
    }

    fn update(&self, rule: PricingRule) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.rules)?;
        if !guard.contains_key(&rule.id) {
            return Err(RepositoryError::NotFound);
        }
        if guard
            .values()
            .any(|other| other.id != rule.id && other.name == rule.name)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(rule.id, rule);
        Ok(())
    }

    fn delete(&self, id: RuleId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.rules)?;
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn fetch(&self, id: RuleId) -> Result<Option<PricingRule>, RepositoryError> {
        let guard = lock(&self.rules)?;
        Ok(guard.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<PricingRule>, RepositoryError> {
        let guard = lock(&self.rules)?;
        Ok(guard.values().find(|rule| rule.name == name).cloned())
    }

    fn list(&self, filter: &RuleFilter) -> Result<Vec<PricingRule>, RepositoryError> {
        let guard = lock(&self.rules)?;
        Ok(guard
            .values()
            .filter(|rule| filter.admits(rule))
            .cloned()
            .collect())
    }
}

/// Process-local calculation audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalculationStore {
    calculations: Arc<Mutex<HashMap<RequestId, PriceCalculation>>>,
}

impl InMemoryCalculationStore {
    pub fn count(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.calculations)?.len())
    }
}

impl CalculationStore for InMemoryCalculationStore {
    fn record(&self, calculation: PriceCalculation) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.calculations)?;
        if guard.contains_key(&calculation.request_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(calculation.request_id, calculation);
        Ok(())
    }

    fn fetch(&self, request_id: &RequestId) -> Result<Option<PriceCalculation>, RepositoryError> {
        let guard = lock(&self.calculations)?;
        Ok(guard.get(request_id).cloned())
    }
}
