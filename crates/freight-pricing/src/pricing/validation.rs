//! Input guards for calculation requests and rule management payloads.
//!
//! Both guards collect every violation before failing so callers can report
//! the complete list in a single response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    Adjustment, CalculationRequest, NumericRange, RuleConditions, RuleDefinition, RulePricing,
    ShipmentRequest,
};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const PRIORITY_MAX: i64 = 1000;

/// Malformed client input; carries every message found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", .messages.join("; "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    fn from_messages(messages: Vec<String>) -> Result<(), Self> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Self { messages })
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |value| value.trim().is_empty())
}

/// Checks a calculation request and converts it into a [`ShipmentRequest`].
pub fn validate_request(request: CalculationRequest) -> Result<ShipmentRequest, ValidationError> {
    let mut messages = Vec::new();

    if request.carrier_id.unwrap_or(0) == 0 {
        messages.push("Carrier ID is required".to_string());
    }
    if is_blank(&request.service_type) {
        messages.push("Service type is required".to_string());
    }
    if !request
        .weight
        .map_or(false, |weight| weight.is_finite() && weight > 0.0)
    {
        messages.push("Weight must be greater than 0".to_string());
    }
    if let Some(distance) = request.distance {
        if !distance.is_finite() || distance < 0.0 {
            messages.push("Distance cannot be negative".to_string());
        }
    }
    if is_blank(&request.origin_country) {
        messages.push("Origin country is required".to_string());
    }
    if is_blank(&request.destination_country) {
        messages.push("Destination country is required".to_string());
    }

    ValidationError::from_messages(messages)?;

    let CalculationRequest {
        carrier_id,
        service_type,
        weight,
        distance,
        origin_country,
        destination_country,
        customer_type,
        customer_id,
    } = request;

    Ok(ShipmentRequest {
        carrier_id: carrier_id.unwrap_or_default(),
        service_type: service_type.unwrap_or_default(),
        weight: weight.unwrap_or_default(),
        distance,
        origin_country: origin_country.unwrap_or_default(),
        destination_country: destination_country.unwrap_or_default(),
        customer_type,
        customer_id,
    })
}

/// Rule payload as submitted on create. Required parts are optional here so
/// that their absence is reported rather than rejected by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub conditions: Option<RuleConditions>,
    #[serde(default)]
    pub pricing: Option<RulePricing>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
}

/// Partial rule update. Clearable fields distinguish an absent key (keep the
/// stored value) from an explicit `null` (clear it).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub conditions: Option<RuleConditions>,
    #[serde(default)]
    pub pricing: Option<RulePricing>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub valid_from: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub valid_to: Option<Option<DateTime<Utc>>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RuleDraft {
    /// Fields present in `patch` replace ours.
    pub fn merged_with(mut self, patch: RulePatch) -> Self {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if patch.is_active.is_some() {
            self.is_active = patch.is_active;
        }
        if patch.conditions.is_some() {
            self.conditions = patch.conditions;
        }
        if patch.pricing.is_some() {
            self.pricing = patch.pricing;
        }
        if patch.priority.is_some() {
            self.priority = patch.priority;
        }
        if let Some(valid_from) = patch.valid_from {
            self.valid_from = valid_from;
        }
        if let Some(valid_to) = patch.valid_to {
            self.valid_to = valid_to;
        }
        self
    }
}

impl From<RuleDefinition> for RuleDraft {
    fn from(definition: RuleDefinition) -> Self {
        Self {
            name: Some(definition.name),
            description: definition.description,
            is_active: Some(definition.is_active),
            conditions: Some(definition.conditions),
            pricing: Some(definition.pricing),
            priority: Some(i64::from(definition.priority)),
            valid_from: definition.valid_from,
            valid_to: definition.valid_to,
        }
    }
}

/// Checks a rule draft and converts it into a [`RuleDefinition`].
pub fn validate_rule(draft: RuleDraft) -> Result<RuleDefinition, ValidationError> {
    let RuleDraft {
        name,
        description,
        is_active,
        conditions,
        pricing,
        priority,
        valid_from,
        valid_to,
    } = draft;
    let mut messages = Vec::new();

    let name = name.as_deref().map(str::trim).unwrap_or_default().to_string();
    let name_chars = name.chars().count();
    if name.is_empty() {
        messages.push("Name is required".to_string());
    } else if name_chars < NAME_MIN_CHARS {
        messages.push(format!("Name must be at least {NAME_MIN_CHARS} characters long"));
    } else if name_chars > NAME_MAX_CHARS {
        messages.push(format!("Name must not exceed {NAME_MAX_CHARS} characters"));
    }

    if let Some(description) = &description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            messages.push(format!(
                "Description must not exceed {DESCRIPTION_MAX_CHARS} characters"
            ));
        }
    }

    match &conditions {
        Some(conditions) => check_conditions(conditions, &mut messages),
        None => messages.push("Conditions are required".to_string()),
    }

    match &pricing {
        Some(pricing) => check_pricing(pricing, &mut messages),
        None => messages.push("Pricing is required".to_string()),
    }

    if let Some(priority) = priority {
        if !(0..=PRIORITY_MAX).contains(&priority) {
            messages.push(format!("Priority must be between 0 and {PRIORITY_MAX}"));
        }
    }

    if let (Some(from), Some(to)) = (valid_from, valid_to) {
        if from >= to {
            messages.push("Valid from date must be before valid to date".to_string());
        }
    }

    match (conditions, pricing) {
        (Some(conditions), Some(pricing)) if messages.is_empty() => Ok(RuleDefinition {
            name,
            description,
            is_active: is_active.unwrap_or(true),
            conditions,
            pricing,
            priority: priority
                .and_then(|value| u16::try_from(value).ok())
                .unwrap_or(0),
            valid_from,
            valid_to,
        }),
        _ => Err(ValidationError { messages }),
    }
}

fn check_conditions(conditions: &RuleConditions, messages: &mut Vec<String>) {
    check_range("Weight range", conditions.weight_range.as_ref(), messages);
    check_range("Distance range", conditions.distance_range.as_ref(), messages);
}

fn check_range(label: &str, range: Option<&NumericRange>, messages: &mut Vec<String>) {
    let Some(range) = range else {
        return;
    };
    if range.min.is_some_and(|min| !min.is_finite() || min < 0.0)
        || range.max.is_some_and(|max| !max.is_finite() || max < 0.0)
    {
        messages.push(format!("{label} bounds must be non-negative numbers"));
    }
    if let (Some(min), Some(max)) = (range.min, range.max) {
        if min > max {
            messages.push(format!("{label} minimum must not exceed maximum"));
        }
    }
}

fn check_pricing(pricing: &RulePricing, messages: &mut Vec<String>) {
    if !pricing.base_rate.is_finite() || pricing.base_rate < 0.0 {
        messages.push("Base rate must be 0 or greater".to_string());
    }
    if pricing.currency.trim().is_empty() {
        messages.push("Currency is required".to_string());
    }

    let optional_amounts = [
        ("Per kg rate", pricing.per_kg_rate),
        ("Per km rate", pricing.per_km_rate),
        ("Minimum charge", pricing.minimum_charge),
        ("Maximum charge", pricing.maximum_charge),
    ];
    for (label, value) in optional_amounts {
        if value.is_some_and(|value| !value.is_finite() || value < 0.0) {
            messages.push(format!("{label} must be 0 or greater"));
        }
    }

    check_adjustments("Surcharge", &pricing.surcharges, messages);
    check_adjustments("Discount", &pricing.discounts, messages);
}

fn check_adjustments(label: &str, entries: &[Adjustment], messages: &mut Vec<String>) {
    for (index, entry) in entries.iter().enumerate() {
        let position = index + 1;
        if entry.kind.trim().is_empty() {
            messages.push(format!("{label} #{position} requires a type"));
        }
        match (entry.amount, entry.percentage) {
            (None, None) => {
                messages.push(format!("{label} #{position} requires an amount or a percentage"));
            }
            (amount, percentage) => {
                if amount.is_some_and(|value| !value.is_finite() || value < 0.0)
                    || percentage.is_some_and(|value| !value.is_finite() || value < 0.0)
                {
                    messages.push(format!("{label} #{position} must not be negative"));
                }
            }
        }
    }
}
