use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{PriceCalculation, PricingRule, RequestId, RuleDefinition, RuleId};

/// Loose filter applied by the repository when listing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFilter {
    #[serde(default)]
    pub carrier_id: Option<i64>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl RuleFilter {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    /// Rules without a carrier or service constraint pass those filters,
    /// since they still apply to the filtered shipments.
    pub fn admits(&self, rule: &PricingRule) -> bool {
        if let Some(active) = self.is_active {
            if rule.is_active != active {
                return false;
            }
        }
        if let (Some(wanted), Some(actual)) = (self.carrier_id, rule.conditions.carrier_id) {
            if wanted != actual {
                return false;
            }
        }
        if let (Some(wanted), Some(actual)) =
            (&self.service_type, &rule.conditions.service_type)
        {
            if wanted != actual {
                return false;
            }
        }
        true
    }
}

/// Storage abstraction for pricing rules.
pub trait RuleRepository: Send + Sync {
    /// Persists a new rule, assigning its id.
    fn insert(
        &self,
        definition: RuleDefinition,
        created_at: DateTime<Utc>,
    ) -> Result<PricingRule, RepositoryError>;
    fn update(&self, rule: PricingRule) -> Result<(), RepositoryError>;
    fn delete(&self, id: RuleId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RuleId) -> Result<Option<PricingRule>, RepositoryError>;
    fn find_by_name(&self, name: &str) -> Result<Option<PricingRule>, RepositoryError>;
    fn list(&self, filter: &RuleFilter) -> Result<Vec<PricingRule>, RepositoryError>;
}

/// Audit sink for completed calculations.
pub trait CalculationStore: Send + Sync {
    fn record(&self, calculation: PriceCalculation) -> Result<(), RepositoryError>;
    fn fetch(&self, request_id: &RequestId) -> Result<Option<PriceCalculation>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
