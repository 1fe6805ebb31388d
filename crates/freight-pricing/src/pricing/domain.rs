use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to a pricing rule by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token identifying a single price calculation for audit lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive numeric bounds; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| min <= value) && self.max.map_or(true, |max| value <= max)
    }
}

/// Sparse match criteria. Absent fields act as wildcards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_range: Option<NumericRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_range: Option<NumericRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
}

/// Named adjustment expressed as a flat amount or a percentage of the subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Adjustment {
    pub fn flat(kind: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: kind.into(),
            amount: Some(amount),
            percentage: None,
        }
    }

    pub fn percent(kind: impl Into<String>, percentage: f64) -> Self {
        Self {
            kind: kind.into(),
            amount: None,
            percentage: Some(percentage),
        }
    }

    /// Resolves the concrete amount; a percentage wins over a flat amount.
    pub fn resolve(&self, subtotal: f64) -> f64 {
        match self.percentage {
            Some(percentage) => subtotal * percentage / 100.0,
            None => self.amount.unwrap_or(0.0),
        }
    }
}

/// Price composition attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePricing {
    pub base_rate: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_kg_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_km_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub surcharges: Vec<Adjustment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Adjustment>,
}

impl RulePricing {
    /// Adjustment-only pricing: no base rate, so it never becomes the base rule.
    pub fn adjustments_only(currency: impl Into<String>) -> Self {
        Self {
            base_rate: 0.0,
            currency: currency.into(),
            per_kg_rate: None,
            per_km_rate: None,
            minimum_charge: None,
            maximum_charge: None,
            surcharges: Vec::new(),
            discounts: Vec::new(),
        }
    }
}

fn default_active() -> bool {
    true
}

/// Validated rule content, prior to the repository assigning an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub pricing: RulePricing,
    #[serde(default)]
    pub priority: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

/// Stored pricing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: RuleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub pricing: RulePricing,
    #[serde(default)]
    pub priority: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingRule {
    pub fn from_definition(id: RuleId, definition: RuleDefinition, at: DateTime<Utc>) -> Self {
        let RuleDefinition {
            name,
            description,
            is_active,
            conditions,
            pricing,
            priority,
            valid_from,
            valid_to,
        } = definition;

        Self {
            id,
            name,
            description,
            is_active,
            conditions,
            pricing,
            priority,
            valid_from,
            valid_to,
            created_at: at,
            updated_at: at,
        }
    }

    /// Replaces the editable content while keeping identity and creation time.
    pub fn apply_definition(&mut self, definition: RuleDefinition, at: DateTime<Utc>) {
        let id = self.id;
        let created_at = self.created_at;
        *self = Self::from_definition(id, definition, created_at);
        self.updated_at = at;
    }

    pub fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            is_active: self.is_active,
            conditions: self.conditions.clone(),
            pricing: self.pricing.clone(),
            priority: self.priority,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }

    /// Inclusive validity window check against `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if matches!(self.valid_from, Some(from) if now < from) {
            return false;
        }
        !matches!(self.valid_to, Some(to) if now > to)
    }

    pub fn applied(&self) -> AppliedRule {
        AppliedRule {
            rule_id: self.id,
            rule_name: self.name.clone(),
            priority: self.priority,
        }
    }
}

/// Inbound calculation request. Every field is optional here so that
/// validation can report all missing values at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    #[serde(default)]
    pub carrier_id: Option<i64>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub destination_country: Option<String>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// Shipment request that passed validation; the evaluator works on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub carrier_id: i64,
    pub service_type: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub origin_country: String,
    pub destination_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Resolved surcharge or discount line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub description: String,
}

/// Price breakdown produced by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationBreakdown {
    pub base_rate: f64,
    pub weight_rate: f64,
    pub distance_rate: f64,
    pub surcharges: Vec<AppliedAdjustment>,
    pub discounts: Vec<AppliedAdjustment>,
    pub subtotal: f64,
    pub total: f64,
    pub currency: String,
}

impl CalculationBreakdown {
    pub fn surcharge_total(&self) -> f64 {
        self.surcharges.iter().map(|line| line.amount).sum()
    }

    pub fn discount_total(&self) -> f64 {
        self.discounts.iter().map(|line| line.amount).sum()
    }
}

/// Audit entry for a rule that contributed to a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub priority: u16,
}

/// Completed calculation, ready to hand to the calculation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCalculation {
    pub request_id: RequestId,
    pub request: ShipmentRequest,
    pub calculation: CalculationBreakdown,
    pub applied_rules: Vec<AppliedRule>,
    pub calculated_at: DateTime<Utc>,
}
