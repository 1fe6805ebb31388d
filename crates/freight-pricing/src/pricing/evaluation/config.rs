use serde::{Deserialize, Serialize};

/// How a `distanceRange` condition treats a request that carries no distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDistancePolicy {
    /// The rule needs distance context it cannot get, so it does not match.
    #[default]
    Reject,
    /// The distance range is skipped and the remaining conditions decide.
    Ignore,
}

/// Knobs for the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub default_currency: String,
    pub missing_distance: MissingDistancePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            missing_distance: MissingDistancePolicy::default(),
        }
    }
}
