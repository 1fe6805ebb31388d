use chrono::{DateTime, Utc};
use freight_pricing::pricing::{
    Adjustment, InMemoryRuleRepository, NumericRange, RepositoryError, RuleConditions,
    RuleDefinition, RulePricing, RuleRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn usd(base_rate: f64) -> RulePricing {
    RulePricing {
        base_rate,
        ..RulePricing::adjustments_only("USD")
    }
}

fn definition(
    name: &str,
    description: &str,
    priority: u16,
    conditions: RuleConditions,
    pricing: RulePricing,
) -> RuleDefinition {
    RuleDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        is_active: true,
        conditions,
        pricing,
        priority,
        valid_from: None,
        valid_to: None,
    }
}

/// Demo catalog loaded at startup so the service prices something out of the box.
pub(crate) fn default_rule_catalog() -> Vec<RuleDefinition> {
    let mut express = usd(15.99);
    express.per_kg_rate = Some(2.5);
    express.minimum_charge = Some(20.0);
    express.surcharges.push(Adjustment::percent("Fuel", 8.5));

    let mut standard = usd(8.5);
    standard.per_kg_rate = Some(1.2);
    standard.per_km_rate = Some(0.02);
    standard.minimum_charge = Some(10.0);
    standard.maximum_charge = Some(750.0);
    standard.surcharges.push(Adjustment::percent("Fuel", 6.0));

    let mut international = usd(45.0);
    international.per_kg_rate = Some(4.75);
    international.surcharges.push(Adjustment::flat("Customs", 12.5));

    let mut oversize = RulePricing::adjustments_only("USD");
    oversize
        .surcharges
        .push(Adjustment::flat("Oversize handling", 35.0));

    let mut premium = RulePricing::adjustments_only("USD");
    premium.discounts.push(Adjustment::percent("Premium", 10.0));

    vec![
        definition(
            "Express domestic",
            "Next-day express within the US",
            100,
            RuleConditions {
                carrier_id: Some(1),
                service_type: Some("express".to_string()),
                origin_country: Some("US".to_string()),
                destination_country: Some("US".to_string()),
                ..RuleConditions::default()
            },
            express,
        ),
        definition(
            "Standard ground",
            "Ground delivery priced by weight and distance",
            50,
            RuleConditions {
                carrier_id: Some(1),
                service_type: Some("standard".to_string()),
                ..RuleConditions::default()
            },
            standard,
        ),
        definition(
            "International express",
            "Cross-border express with customs handling",
            90,
            RuleConditions {
                carrier_id: Some(2),
                service_type: Some("express".to_string()),
                ..RuleConditions::default()
            },
            international,
        ),
        definition(
            "Oversize parcels",
            "Handling fee for parcels of 70 kg and above",
            150,
            RuleConditions {
                weight_range: Some(NumericRange {
                    min: Some(70.0),
                    max: None,
                }),
                ..RuleConditions::default()
            },
            oversize,
        ),
        definition(
            "Premium customers",
            "Loyalty discount for premium accounts",
            200,
            RuleConditions {
                customer_type: Some("premium".to_string()),
                ..RuleConditions::default()
            },
            premium,
        ),
    ]
}

pub(crate) fn seed_repository(
    repository: &InMemoryRuleRepository,
    rules: Vec<RuleDefinition>,
    at: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    let count = rules.len();
    for rule in rules {
        repository.insert(rule, at)?;
    }
    Ok(count)
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
