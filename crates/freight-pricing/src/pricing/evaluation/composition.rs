use super::super::domain::{
    Adjustment, AppliedAdjustment, AppliedRule, CalculationBreakdown, PricingRule, ShipmentRequest,
};

/// Base-rule derived figures feeding the totals.
struct BaseComponents {
    base_rate: f64,
    weight_rate: f64,
    distance_rate: f64,
    minimum_charge: f64,
    maximum_charge: f64,
    currency: String,
}

impl BaseComponents {
    fn from_rule(rule: &PricingRule, request: &ShipmentRequest) -> Self {
        let pricing = &rule.pricing;
        let distance_rate = request
            .distance
            .map(|distance| pricing.per_km_rate.unwrap_or(0.0) * distance)
            .unwrap_or(0.0);

        Self {
            base_rate: pricing.base_rate,
            weight_rate: pricing.per_kg_rate.unwrap_or(0.0) * request.weight,
            distance_rate,
            minimum_charge: pricing.minimum_charge.unwrap_or(0.0),
            maximum_charge: pricing.maximum_charge.unwrap_or(0.0),
            currency: pricing.currency.clone(),
        }
    }

    fn empty(default_currency: &str) -> Self {
        Self {
            base_rate: 0.0,
            weight_rate: 0.0,
            distance_rate: 0.0,
            minimum_charge: 0.0,
            maximum_charge: 0.0,
            currency: default_currency.to_string(),
        }
    }
}

/// First rule in priority order with a positive base rate.
pub fn select_base_rule<'a>(applicable: &[&'a PricingRule]) -> Option<&'a PricingRule> {
    applicable
        .iter()
        .copied()
        .find(|rule| rule.pricing.base_rate > 0.0)
}

/// Composes the breakdown and the audit trail from priority-ordered rules.
pub fn compose_price(
    applicable: &[&PricingRule],
    request: &ShipmentRequest,
    default_currency: &str,
) -> (CalculationBreakdown, Vec<AppliedRule>) {
    let base_rule = select_base_rule(applicable);
    let base = match base_rule {
        Some(rule) => BaseComponents::from_rule(rule, request),
        None => BaseComponents::empty(default_currency),
    };

    let subtotal = base.base_rate + base.weight_rate + base.distance_rate;

    let mut surcharges = Vec::new();
    let mut discounts = Vec::new();
    for rule in applicable {
        surcharges.extend(resolve_lines(&rule.pricing.surcharges, subtotal, "surcharge"));
        discounts.extend(resolve_lines(&rule.pricing.discounts, subtotal, "discount"));
    }

    let mut applied_rules = Vec::with_capacity(applicable.len());
    if let Some(rule) = base_rule {
        applied_rules.push(rule.applied());
    }
    applied_rules.extend(
        applicable
            .iter()
            .filter(|rule| base_rule.map_or(true, |base| base.id != rule.id))
            .map(|rule| rule.applied()),
    );

    let mut breakdown = CalculationBreakdown {
        base_rate: base.base_rate,
        weight_rate: base.weight_rate,
        distance_rate: base.distance_rate,
        surcharges,
        discounts,
        subtotal,
        total: 0.0,
        currency: base.currency,
    };
    breakdown.total = clamp_total(
        subtotal + breakdown.surcharge_total() - breakdown.discount_total(),
        base.minimum_charge,
        base.maximum_charge,
    );

    (breakdown, applied_rules)
}

/// Minimum first, then maximum; a zero clamp is treated as unset.
pub fn clamp_total(total: f64, minimum_charge: f64, maximum_charge: f64) -> f64 {
    let mut total = total;
    if minimum_charge > 0.0 && total < minimum_charge {
        total = minimum_charge;
    }
    if maximum_charge > 0.0 && total > maximum_charge {
        total = maximum_charge;
    }
    total
}

fn resolve_lines<'a>(
    entries: &'a [Adjustment],
    subtotal: f64,
    label: &'a str,
) -> impl Iterator<Item = AppliedAdjustment> + 'a {
    entries.iter().map(move |entry| AppliedAdjustment {
        kind: entry.kind.clone(),
        amount: entry.resolve(subtotal),
        description: format!("{} {label}", entry.kind),
    })
}
