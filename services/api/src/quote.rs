use crate::infra::{default_rule_catalog, parse_instant, seed_repository};
use chrono::{DateTime, Utc};
use clap::Args;
use freight_pricing::config::AppConfig;
use freight_pricing::error::AppError;
use freight_pricing::pricing::{
    validate_rule, CalculationRequest, EngineConfig, FixedClock, InMemoryCalculationStore,
    InMemoryRuleRepository, PriceCalculation, PricingService, PricingServiceError, RuleDefinition,
    RuleDraft,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// JSON file holding an array of rule definitions (defaults to the built-in catalog)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Carrier identifier
    #[arg(long)]
    pub(crate) carrier_id: i64,
    /// Service type, e.g. express or standard
    #[arg(long)]
    pub(crate) service_type: String,
    /// Shipment weight in kilograms
    #[arg(long)]
    pub(crate) weight: f64,
    /// Shipment distance in kilometers
    #[arg(long)]
    pub(crate) distance: Option<f64>,
    /// Origin country code
    #[arg(long)]
    pub(crate) origin: String,
    /// Destination country code
    #[arg(long)]
    pub(crate) destination: String,
    /// Customer type, e.g. premium
    #[arg(long)]
    pub(crate) customer_type: Option<String>,
    /// Evaluation instant (RFC 3339, defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) at: Option<DateTime<Utc>>,
    /// Print the calculation record as JSON instead of a text breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let as_json = args.json;
    let calculation = quote(args, config.pricing)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&calculation)?);
    } else {
        render_quote(&calculation);
    }
    Ok(())
}

pub(crate) fn quote(args: QuoteArgs, config: EngineConfig) -> Result<PriceCalculation, AppError> {
    let at = args.at.unwrap_or_else(Utc::now);
    let rules = match &args.rules {
        Some(path) => load_rules_from_path(path)?,
        None => default_rule_catalog(),
    };

    let repository = Arc::new(InMemoryRuleRepository::default());
    seed_repository(&repository, rules, at).map_err(PricingServiceError::from)?;

    let service = PricingService::new(
        repository,
        Arc::new(InMemoryCalculationStore::default()),
        Arc::new(FixedClock(at)),
        config,
    );

    let request = CalculationRequest {
        carrier_id: Some(args.carrier_id),
        service_type: Some(args.service_type),
        weight: Some(args.weight),
        distance: args.distance,
        origin_country: Some(args.origin),
        destination_country: Some(args.destination),
        customer_type: args.customer_type,
        customer_id: None,
    };

    Ok(service.calculate(request)?)
}

pub(crate) fn load_rules_from_path(path: &Path) -> Result<Vec<RuleDefinition>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let drafts: Vec<RuleDraft> = serde_json::from_str(&raw)?;
    drafts
        .into_iter()
        .map(|draft| {
            validate_rule(draft).map_err(|err| AppError::from(PricingServiceError::from(err)))
        })
        .collect()
}

fn render_quote(calculation: &PriceCalculation) {
    let breakdown = &calculation.calculation;
    let currency = &breakdown.currency;

    println!("Price calculation {}", calculation.request_id);
    println!(
        "Shipment: carrier {} / {} / {:.2} kg, {} -> {}",
        calculation.request.carrier_id,
        calculation.request.service_type,
        calculation.request.weight,
        calculation.request.origin_country,
        calculation.request.destination_country
    );

    println!("\nBase rate      {:>10.2} {currency}", breakdown.base_rate);
    println!("Weight rate    {:>10.2} {currency}", breakdown.weight_rate);
    println!("Distance rate  {:>10.2} {currency}", breakdown.distance_rate);
    println!("Subtotal       {:>10.2} {currency}", breakdown.subtotal);

    for line in &breakdown.surcharges {
        println!("+ {:<20} {:>10.2}", line.description, line.amount);
    }
    for line in &breakdown.discounts {
        println!("- {:<20} {:>10.2}", line.description, line.amount);
    }
    println!("Total          {:>10.2} {currency}", breakdown.total);

    if calculation.applied_rules.is_empty() {
        println!("\nApplied rules: none");
    } else {
        println!("\nApplied rules");
        for rule in &calculation.applied_rules {
            println!(
                "- #{} {} (priority {})",
                rule.rule_id, rule.rule_name, rule.priority
            );
        }
    }
}
