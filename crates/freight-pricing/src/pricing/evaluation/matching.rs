use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use super::super::domain::{PricingRule, RuleConditions, ShipmentRequest};
use super::config::MissingDistancePolicy;

/// Rules that are active, inside their validity window, and whose conditions
/// match the request, ordered by priority (descending) then id (ascending).
pub fn find_applicable_rules<'a>(
    rules: &'a [PricingRule],
    request: &ShipmentRequest,
    now: DateTime<Utc>,
    policy: MissingDistancePolicy,
) -> Vec<&'a PricingRule> {
    let mut applicable: Vec<&PricingRule> = rules
        .iter()
        .filter(|rule| rule.is_active)
        .filter(|rule| rule.is_valid_at(now))
        .filter(|rule| conditions_match(&rule.conditions, request, policy))
        .collect();

    applicable.sort_by_key(|rule| (Reverse(rule.priority), rule.id));
    applicable
}

pub(crate) fn conditions_match(
    conditions: &RuleConditions,
    request: &ShipmentRequest,
    policy: MissingDistancePolicy,
) -> bool {
    if let Some(carrier_id) = conditions.carrier_id {
        if carrier_id != request.carrier_id {
            return false;
        }
    }

    if !text_matches(&conditions.service_type, &request.service_type) {
        return false;
    }

    if let Some(range) = &conditions.weight_range {
        if !range.contains(request.weight) {
            return false;
        }
    }

    if let Some(range) = &conditions.distance_range {
        match (request.distance, policy) {
            (Some(distance), _) if !range.contains(distance) => return false,
            (Some(_), _) | (None, MissingDistancePolicy::Ignore) => {}
            (None, MissingDistancePolicy::Reject) => return false,
        }
    }

    if !text_matches(&conditions.origin_country, &request.origin_country) {
        return false;
    }

    if !text_matches(&conditions.destination_country, &request.destination_country) {
        return false;
    }

    match (&conditions.customer_type, &request.customer_type) {
        (None, _) => true,
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
    }
}

fn text_matches(expected: &Option<String>, actual: &str) -> bool {
    expected.as_deref().map_or(true, |expected| expected == actual)
}
