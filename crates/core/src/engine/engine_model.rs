//! Engine request and result types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalogue::{CatalogueItem, ChannelContext};
use crate::profit::{CostInputs, ProfitBreakdown, RequiredPrice};
use crate::scoring::{ScoreSignal, SignalInputs};
use crate::shipping::ShippingQuote;
use crate::tariffs::TariffResolution;
use crate::warnings::Warning;

fn one_unit() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffRequest {
    pub origin_country: String,
    #[serde(default)]
    pub classification_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRequest {
    pub weight: Decimal,
    pub item_price: Decimal,
    pub destination_zone: String,
}

/// Forward profit at `price` on `channel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRequest {
    pub channel: String,
    #[serde(flatten)]
    pub costs: CostInputs,
    pub price: Decimal,
    #[serde(default)]
    pub competitor_floor: Option<Decimal>,
}

/// Reverse price for `target_margin` on `channel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredPriceRequest {
    pub channel: String,
    #[serde(flatten)]
    pub costs: CostInputs,
    pub target_margin: Decimal,
    #[serde(default)]
    pub competitor_floor: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRequest {
    pub item: CatalogueItem,
    pub context: ChannelContext,
}

/// A candidate to score, either from a prepared signal or from raw history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringRequest {
    Signal(ScoreSignal),
    History(SignalInputs),
}

/// Full listing quote for one item on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub item: CatalogueItem,
    pub context: ChannelContext,
    /// Source currency to selling currency
    pub fx_rate: Decimal,
    /// Units shipped together and priced as one lot
    #[serde(default = "one_unit")]
    pub units: u32,
    #[serde(default)]
    pub competitor_floor: Option<Decimal>,
}

/// Item-level forward check: margin on `context.channel` when listed at
/// `price`, with duty and shipping resolved for the item at that price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardQuoteRequest {
    pub item: CatalogueItem,
    pub context: ChannelContext,
    pub fx_rate: Decimal,
    #[serde(default = "one_unit")]
    pub units: u32,
    /// Assumed selling price
    pub price: Decimal,
    #[serde(default)]
    pub competitor_floor: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardQuote {
    pub item_id: String,
    pub channel: String,
    pub tariff: TariffResolution,
    /// Cell selected by the assumed price
    pub shipping: ShippingQuote,
    pub breakdown: ProfitBreakdown,
    pub red_flag: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuote {
    pub item_id: String,
    pub channel: String,
    pub rule_id: String,
    pub tariff: TariffResolution,
    pub shipping: ShippingQuote,
    /// Margin-satisfying price before the rule's floor and rounding
    pub required: RequiredPrice,
    /// Price to list at, after floor and rounding
    pub list_price: Decimal,
    /// Forward check at `list_price`
    pub breakdown: ProfitBreakdown,
    pub red_flag: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Every batch kind the CLI can run, tagged by `operation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "items", rename_all = "camelCase")]
pub enum BatchRequest {
    ResolveTariff(Vec<TariffRequest>),
    ResolveShipping(Vec<ShippingRequest>),
    CalculateForwardProfit(Vec<ProfitRequest>),
    CalculateRequiredPrice(Vec<RequiredPriceRequest>),
    ResolveStrategy(Vec<StrategyRequest>),
    ScoreArbitrageCandidate(Vec<ScoringRequest>),
    QuoteItem(Vec<QuoteRequest>),
    ForwardQuote(Vec<ForwardQuoteRequest>),
}

impl BatchRequest {
    /// Channels whose fee schedules the batch needs.
    pub fn channels(&self) -> Vec<String> {
        match self {
            BatchRequest::CalculateForwardProfit(items) => {
                items.iter().map(|i| i.channel.clone()).collect()
            }
            BatchRequest::CalculateRequiredPrice(items) => {
                items.iter().map(|i| i.channel.clone()).collect()
            }
            BatchRequest::QuoteItem(items) => {
                items.iter().map(|i| i.context.channel.clone()).collect()
            }
            BatchRequest::ForwardQuote(items) => {
                items.iter().map(|i| i.context.channel.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BatchRequest::ResolveTariff(items) => items.len(),
            BatchRequest::ResolveShipping(items) => items.len(),
            BatchRequest::CalculateForwardProfit(items) => items.len(),
            BatchRequest::CalculateRequiredPrice(items) => items.len(),
            BatchRequest::ResolveStrategy(items) => items.len(),
            BatchRequest::ScoreArbitrageCandidate(items) => items.len(),
            BatchRequest::QuoteItem(items) => items.len(),
            BatchRequest::ForwardQuote(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
