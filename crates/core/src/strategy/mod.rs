//! Strategy module - selects the pricing policy rule governing an item.

mod strategy_model;
mod strategy_resolver;
mod strategy_traits;


pub use strategy_model::{
    PricingEffect, PricingPolicyRule, RoundingRule, RuleGroup, StrategyKey,
};
pub use strategy_resolver::StrategyResolver;
pub use strategy_traits::RuleDatasetProvider;
