use super::common::*;
use crate::pricing::domain::{NumericRange, RuleConditions, RuleId};
use crate::pricing::evaluation::{find_applicable_rules, MissingDistancePolicy};

fn ids(rules: &[&crate::pricing::domain::PricingRule]) -> Vec<RuleId> {
    rules.iter().map(|rule| rule.id).collect()
}

#[test]
fn empty_conditions_match_every_request() {
    let rules = vec![rule(1, 0, base_pricing(10.0, None))];
    let mut request = shipment();
    request.carrier_id = 999;
    request.origin_country = "JP".to_string();

    let applicable = find_applicable_rules(&rules, &request, now(), MissingDistancePolicy::Reject);

    assert_eq!(ids(&applicable), vec![RuleId(1)]);
}

#[test]
fn inactive_rules_are_skipped() {
    let mut inactive = rule(1, 500, base_pricing(10.0, None));
    inactive.is_active = false;
    let rules = vec![inactive, rule(2, 0, base_pricing(5.0, None))];

    let applicable =
        find_applicable_rules(&rules, &shipment(), now(), MissingDistancePolicy::Reject);

    assert_eq!(ids(&applicable), vec![RuleId(2)]);
}

#[test]
fn validity_window_is_inclusive() {
    let mut not_yet = rule(1, 0, base_pricing(10.0, None));
    not_yet.valid_from = Some(instant(2025, 7, 1));
    let mut expired = rule(2, 0, base_pricing(10.0, None));
    expired.valid_to = Some(instant(2025, 5, 1));
    let mut starts_now = rule(3, 0, base_pricing(10.0, None));
    starts_now.valid_from = Some(now());
    let mut ends_now = rule(4, 0, base_pricing(10.0, None));
    ends_now.valid_to = Some(now());
    let rules = vec![not_yet, expired, starts_now, ends_now];

    let applicable =
        find_applicable_rules(&rules, &shipment(), now(), MissingDistancePolicy::Reject);

    assert_eq!(ids(&applicable), vec![RuleId(3), RuleId(4)]);
}

#[test]
fn scalar_conditions_require_exact_equality() {
    let conditions = [
        RuleConditions {
            carrier_id: Some(2),
            ..RuleConditions::default()
        },
        RuleConditions {
            service_type: Some("Express".to_string()),
            ..RuleConditions::default()
        },
        RuleConditions {
            origin_country: Some("MX".to_string()),
            ..RuleConditions::default()
        },
        RuleConditions {
            destination_country: Some("US".to_string()),
            ..RuleConditions::default()
        },
        RuleConditions {
            customer_type: Some("premium".to_string()),
            ..RuleConditions::default()
        },
    ];
    let rules: Vec<_> = conditions
        .into_iter()
        .enumerate()
        .map(|(index, conditions)| {
            let mut candidate = rule(index as u64 + 1, 0, base_pricing(10.0, None));
            candidate.conditions = conditions;
            candidate
        })
        .collect();

    let applicable =
        find_applicable_rules(&rules, &shipment(), now(), MissingDistancePolicy::Reject);

    assert!(applicable.is_empty(), "no rule should match: {applicable:?}");
}

#[test]
fn matching_scalar_conditions_are_accepted() {
    let mut candidate = rule(1, 0, base_pricing(10.0, None));
    candidate.conditions = RuleConditions {
        carrier_id: Some(1),
        service_type: Some("express".to_string()),
        origin_country: Some("US".to_string()),
        destination_country: Some("CA".to_string()),
        customer_type: Some("premium".to_string()),
        ..RuleConditions::default()
    };
    let mut request = shipment();
    request.customer_type = Some("premium".to_string());

    let rules = vec![candidate];
    let applicable = find_applicable_rules(&rules, &request, now(), MissingDistancePolicy::Reject);

    assert_eq!(ids(&applicable), vec![RuleId(1)]);
}

#[test]
fn weight_range_bounds_are_inclusive_and_open_ended() {
    let ranges = [
        NumericRange {
            min: Some(5.0),
            max: Some(10.0),
        },
        NumericRange {
            min: None,
            max: Some(5.0),
        },
        NumericRange {
            min: Some(0.0),
            max: None,
        },
        NumericRange {
            min: Some(5.5),
            max: None,
        },
    ];
    let rules: Vec<_> = ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            let mut candidate = rule(index as u64 + 1, 0, base_pricing(10.0, None));
            candidate.conditions.weight_range = Some(range);
            candidate
        })
        .collect();

    let applicable =
        find_applicable_rules(&rules, &shipment(), now(), MissingDistancePolicy::Reject);

    assert_eq!(ids(&applicable), vec![RuleId(1), RuleId(2), RuleId(3)]);
}

#[test]
fn distance_range_checks_request_distance() {
    let mut candidate = rule(1, 0, base_pricing(10.0, None));
    candidate.conditions.distance_range = Some(NumericRange {
        min: Some(100.0),
        max: Some(500.0),
    });
    let rules = vec![candidate];

    let mut near = shipment();
    near.distance = Some(50.0);
    let mut within = shipment();
    within.distance = Some(500.0);

    assert!(find_applicable_rules(&rules, &near, now(), MissingDistancePolicy::Ignore).is_empty());
    assert_eq!(
        ids(&find_applicable_rules(
            &rules,
            &within,
            now(),
            MissingDistancePolicy::Reject
        )),
        vec![RuleId(1)]
    );
}

#[test]
fn missing_distance_follows_policy() {
    let mut candidate = rule(1, 0, base_pricing(10.0, None));
    candidate.conditions.distance_range = Some(NumericRange {
        min: Some(0.0),
        max: Some(500.0),
    });
    let rules = vec![candidate];
    let request = shipment();
    assert!(request.distance.is_none());

    let rejected = find_applicable_rules(&rules, &request, now(), MissingDistancePolicy::Reject);
    let ignored = find_applicable_rules(&rules, &request, now(), MissingDistancePolicy::Ignore);

    assert!(rejected.is_empty());
    assert_eq!(ids(&ignored), vec![RuleId(1)]);
}

#[test]
fn ordering_is_priority_descending_then_id_ascending() {
    let rules = vec![
        rule(7, 100, base_pricing(1.0, None)),
        rule(3, 100, base_pricing(1.0, None)),
        rule(9, 900, base_pricing(1.0, None)),
        rule(1, 0, base_pricing(1.0, None)),
        rule(5, 100, base_pricing(1.0, None)),
    ];

    let applicable =
        find_applicable_rules(&rules, &shipment(), now(), MissingDistancePolicy::Reject);

    assert_eq!(
        ids(&applicable),
        vec![RuleId(9), RuleId(3), RuleId(5), RuleId(7), RuleId(1)]
    );
}
