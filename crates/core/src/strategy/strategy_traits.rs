use crate::errors::Result;
use crate::strategy::strategy_model::PricingPolicyRule;

/// Read-only source of pricing policy rules.
pub trait RuleDatasetProvider: Send + Sync {
    fn pricing_rules(&self) -> Result<Vec<PricingPolicyRule>>;
}
