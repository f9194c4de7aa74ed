//! Pricing strategy domain models.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalogue::{CatalogueItem, ChannelContext};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::{checked, DatasetError, Result};

/// How a computed price is turned into a listing price.
///
/// Every rule rounds up, so a rounded price never drops below the price that
/// satisfies the target margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingRule {
    #[default]
    None,
    /// Up to the next cent
    Cents,
    /// Up to the next whole unit
    Whole,
    /// Up to the next price ending in .99
    Charm99,
}

impl RoundingRule {
    pub fn apply(&self, price: Decimal) -> Result<Decimal> {
        Ok(match self {
            RoundingRule::None => price,
            RoundingRule::Cents => price.round_dp_with_strategy(
                DISPLAY_DECIMAL_PRECISION,
                RoundingStrategy::ToPositiveInfinity,
            ),
            RoundingRule::Whole => price.ceil(),
            RoundingRule::Charm99 => {
                checked(price.checked_add(dec!(0.01)), "rounded price")?.ceil() - dec!(0.01)
            }
        })
    }
}

/// What a matching rule does to the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingEffect {
    /// Target margin as a fraction of price
    pub target_margin: Decimal,
    #[serde(default)]
    pub floor_price: Option<Decimal>,
    #[serde(default)]
    pub rounding: RoundingRule,
}

impl PricingEffect {
    /// Applies the floor, then rounding.
    pub fn finalize_price(&self, price: Decimal) -> Result<Decimal> {
        let floored = match self.floor_price {
            Some(floor) if floor > price => floor,
            _ => price,
        };
        self.rounding.apply(floored)
    }
}

/// A pricing policy rule. Unset predicates are wildcards; a rule with no
/// predicates at all is the default rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicyRule {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
    /// Creation order; earlier rules win ties
    #[serde(default)]
    pub created_seq: u64,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Lower bound on the item's cost, in the item's source currency.
    /// Matched before any price is known, so it is never compared with a
    /// selling-currency price.
    #[serde(default)]
    pub min_price: Option<Decimal>,
    /// Upper bound on the item's cost, in the item's source currency
    #[serde(default)]
    pub max_price: Option<Decimal>,
    pub effect: PricingEffect,
}

impl PricingPolicyRule {
    /// Number of non-wildcard predicates. The price range counts once.
    pub fn specificity(&self) -> usize {
        [
            self.channel.is_some(),
            self.account.is_some(),
            self.category.is_some(),
            self.has_price_range(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn is_default(&self) -> bool {
        self.specificity() == 0
    }

    pub fn has_price_range(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    pub fn matches(&self, key: &StrategyKey) -> bool {
        let channel_ok = self
            .channel
            .as_deref()
            .map_or(true, |c| normalize_label(c) == key.channel);
        let account_ok = self
            .account
            .as_deref()
            .map_or(true, |a| key.account.as_deref() == Some(a));
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| normalize_label(c) == key.category);
        channel_ok && account_ok && category_ok && self.price_in_range(key.price)
    }

    fn price_in_range(&self, price: Decimal) -> bool {
        if !self.has_price_range() {
            return true;
        }
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DatasetError::InvalidValue("pricing rule without id".to_string()).into());
        }
        let margin = self.effect.target_margin;
        if margin < Decimal::ZERO || margin >= Decimal::ONE {
            return Err(DatasetError::InvalidValue(format!(
                "rule '{}' target margin {} is outside [0, 1)",
                self.id, margin
            ))
            .into());
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(DatasetError::InvalidValue(format!(
                    "rule '{}' price range {}..{} is empty",
                    self.id, min, max
                ))
                .into());
            }
        }
        if self.effect.floor_price.is_some_and(|f| f < Decimal::ZERO) {
            return Err(DatasetError::InvalidValue(format!(
                "rule '{}' has a negative floor price",
                self.id
            ))
            .into());
        }
        Ok(())
    }
}

/// Case-folded, trimmed form of a channel or category name. Rule indexing,
/// rule matching and strategy keys all compare labels in this form.
pub(crate) fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The predicate-relevant facts of an item in a channel. Two items with the
/// same key always resolve to the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrategyKey {
    pub channel: String,
    pub account: Option<String>,
    pub category: String,
    /// Matched against rule price ranges, in the item's source currency
    pub price: Decimal,
}

impl StrategyKey {
    /// The item's cost, in its source currency, is the reference price for
    /// price-range predicates.
    pub fn for_item(item: &CatalogueItem, context: &ChannelContext) -> Self {
        Self {
            channel: normalize_label(&context.channel),
            account: context.account.clone(),
            category: normalize_label(&item.category),
            price: item.cost.normalize(),
        }
    }
}

/// Items of a batch grouped by the rule they resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub rule_id: String,
    /// Positions of the items in the input batch
    pub items: Vec<usize>,
}
