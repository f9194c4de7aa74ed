//! Pricing engine facade over one dataset snapshot.
//!
//! Single-item operations return a value or a typed error. Batch variants run
//! items in parallel against the same snapshot and batch context, and report
//! every item in input order; one item's failure never stops the others.

use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::catalogue::{CatalogueItem, ChannelContext};
use crate::errors::{checked, BandDimension, Error, Result, ValidationError};
use crate::fees::FeeSchedule;
use crate::profit::{CostInputs, ProfitBreakdown, ProfitCalculator, RequiredPrice};
use crate::scoring::{ArbitrageScore, ArbitrageScorer, ScoreSignal, SignalBuilder, SignalInputs};
use crate::shipping::{ShippingQuote, ShippingRateResolver};
use crate::snapshot::EngineSnapshot;
use crate::strategy::{PricingPolicyRule, RuleGroup};
use crate::tariffs::{TariffResolution, TariffResolver};

use super::batch::{BatchContext, BatchResult, ItemWarnings};
use super::engine_config::EngineConfig;
use super::engine_model::{
    ForwardQuote, ForwardQuoteRequest, ItemQuote, ProfitRequest, QuoteRequest, RequiredPriceRequest, ScoringRequest,
    ShippingRequest, StrategyRequest, TariffRequest,
};

/// A shipping cell paired with the price solved for it.
struct PricedCandidate {
    shipping: ShippingQuote,
    costs: CostInputs,
    required: RequiredPrice,
    list_price: Decimal,
}

pub struct PricingEngine {
    snapshot: Arc<EngineSnapshot>,
    config: EngineConfig,
    calculator: ProfitCalculator,
    scorer: ArbitrageScorer,
    signals: SignalBuilder,
}

impl PricingEngine {
    pub fn new(snapshot: Arc<EngineSnapshot>, config: EngineConfig) -> Self {
        let calculator =
            ProfitCalculator::new(config.minimum_acceptable_margin, config.decimal_precision);
        let scorer = ArbitrageScorer::new(config.scoring.clone());
        let signals = SignalBuilder::new(config.signals.clone());
        Self {
            snapshot,
            config,
            calculator,
            scorer,
            signals,
        }
    }

    pub fn snapshot(&self) -> &EngineSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Single-item operations
    // =========================================================================

    pub fn resolve_tariff(
        &self,
        origin_country: &str,
        classification_code: Option<&str>,
    ) -> Result<TariffResolution> {
        TariffResolver::new(self.snapshot.tariffs()).resolve(origin_country, classification_code)
    }

    /// Duty resolution using a special program rate where the code has one.
    pub fn resolve_special_tariff(
        &self,
        origin_country: &str,
        classification_code: &str,
        program: &str,
    ) -> Result<TariffResolution> {
        TariffResolver::new(self.snapshot.tariffs()).resolve_special(
            origin_country,
            classification_code,
            program,
        )
    }

    pub fn resolve_shipping(
        &self,
        weight: Decimal,
        item_price: Decimal,
        destination_zone: &str,
    ) -> Result<ShippingQuote> {
        self.shipping_resolver()
            .resolve(weight, item_price, destination_zone)
    }

    pub fn calculate_forward_profit(
        &self,
        costs: &CostInputs,
        fees: &FeeSchedule,
        price: Decimal,
        competitor_floor: Option<Decimal>,
    ) -> Result<ProfitBreakdown> {
        self.calculator.forward(costs, fees, price, competitor_floor)
    }

    pub fn calculate_required_price(
        &self,
        costs: &CostInputs,
        fees: &FeeSchedule,
        target_margin: Decimal,
        competitor_floor: Option<Decimal>,
    ) -> Result<RequiredPrice> {
        self.calculator
            .required_price(costs, fees, target_margin, competitor_floor)
    }

    /// Never fails: the default rule is the final fallback.
    pub fn resolve_strategy(
        &self,
        item: &CatalogueItem,
        context: &ChannelContext,
    ) -> &PricingPolicyRule {
        self.snapshot.rules().resolve(item, context)
    }

    pub fn score_arbitrage_candidate(&self, signal: &ScoreSignal) -> ArbitrageScore {
        self.scorer.score(signal)
    }

    /// Derives the signal from price history, then scores it.
    pub fn score_from_history(&self, inputs: &SignalInputs) -> Result<ArbitrageScore> {
        let signal = self.signals.build(inputs)?;
        Ok(self.scorer.score(&signal))
    }

    /// Prices one item for one channel: strategy, duty, shipping, reverse
    /// price, the rule's floor and rounding, then a forward check.
    ///
    /// Shipping depends on the price through the policy basis and price band,
    /// so the price is solved once per reachable rate cell and the lowest
    /// list price whose own shipping lookup lands back in that cell wins.
    pub fn quote_item(&self, request: &QuoteRequest, context: &BatchContext) -> Result<ItemQuote> {
        let item = &request.item;
        let lot_cost = lot_cost(item, request.units, request.fx_rate)?;

        let rule = self.resolve_strategy(item, &request.context);
        let tariff =
            self.resolve_tariff(&item.origin_country, item.classification_code.as_deref())?;
        let fees = context.fee_schedule(&request.context.channel)?;

        let shipping = self.shipping_resolver();
        let zone = &request.context.destination_zone;
        let mut consistent: Vec<PricedCandidate> = Vec::new();
        let mut lowest_inconsistent: Option<Decimal> = None;

        for candidate in shipping.candidate_quotes(item.weight, zone)? {
            let costs = CostInputs {
                source_cost: lot_cost,
                fx_rate: request.fx_rate,
                duty_rate: tariff.rate,
                shipping_cost: candidate.landed_shipping(request.units)?,
            };
            let required = self.calculator.required_price(
                &costs,
                fees,
                rule.effect.target_margin,
                request.competitor_floor,
            )?;
            let list_price = rule.effect.finalize_price(required.price)?;

            match shipping.resolve(item.weight, list_price, zone) {
                Ok(actual) if actual.same_cell(&candidate) => consistent.push(PricedCandidate {
                    shipping: candidate,
                    costs,
                    required,
                    list_price,
                }),
                _ => {
                    lowest_inconsistent =
                        Some(lowest_inconsistent.map_or(list_price, |p| p.min(list_price)));
                }
            }
        }

        let chosen = match consistent.into_iter().min_by(|a, b| a.list_price.cmp(&b.list_price)) {
            Some(chosen) => chosen,
            None => {
                let price = lowest_inconsistent.unwrap_or(Decimal::ZERO);
                warn!(
                    "No self-consistent shipping cell for item {} to {}",
                    item.id, zone
                );
                // Surface the lookup error at that price when there is one.
                shipping.resolve(item.weight, price, zone)?;
                return Err(Error::no_matching_band(
                    BandDimension::Price,
                    price,
                    zone.as_str(),
                    self.config.duty_policy().basis_for(price),
                ));
            }
        };

        let breakdown = self.calculator.forward(
            &chosen.costs,
            fees,
            chosen.list_price,
            request.competitor_floor,
        )?;

        debug!(
            "Quoted item {} on {} at {} under rule {} ({} cell)",
            item.id, request.context.channel, chosen.list_price, rule.id, chosen.shipping.policy_basis
        );

        let mut warnings = tariff.warnings.clone();
        warnings.extend(breakdown.warnings.iter().cloned());

        Ok(ItemQuote {
            item_id: item.id.clone(),
            channel: request.context.channel.clone(),
            rule_id: rule.id.clone(),
            red_flag: breakdown.red_flag,
            tariff,
            shipping: chosen.shipping,
            required: chosen.required,
            list_price: chosen.list_price,
            breakdown,
            warnings,
        })
    }

    /// Margin for one item listed at an assumed price. Duty comes from the
    /// item's origin and code, and shipping from the cell that price selects.
    pub fn forward_quote(
        &self,
        request: &ForwardQuoteRequest,
        context: &BatchContext,
    ) -> Result<ForwardQuote> {
        let item = &request.item;
        let lot_cost = lot_cost(item, request.units, request.fx_rate)?;
        if request.price <= Decimal::ZERO {
            return Err(ValidationError::not_positive("price", request.price).into());
        }

        let tariff =
            self.resolve_tariff(&item.origin_country, item.classification_code.as_deref())?;
        let fees = context.fee_schedule(&request.context.channel)?;
        let shipping = self.resolve_shipping(
            item.weight,
            request.price,
            &request.context.destination_zone,
        )?;

        let costs = CostInputs {
            source_cost: lot_cost,
            fx_rate: request.fx_rate,
            duty_rate: tariff.rate,
            shipping_cost: shipping.landed_shipping(request.units)?,
        };
        let breakdown = self
            .calculator
            .forward(&costs, fees, request.price, request.competitor_floor)?;

        debug!(
            "Forward quote for item {} on {} at {}: margin {} ({} cell)",
            item.id,
            request.context.channel,
            request.price,
            breakdown.margin,
            shipping.policy_basis
        );

        let mut warnings = tariff.warnings.clone();
        warnings.extend(breakdown.warnings.iter().cloned());

        Ok(ForwardQuote {
            item_id: item.id.clone(),
            channel: request.context.channel.clone(),
            red_flag: breakdown.red_flag,
            tariff,
            shipping,
            breakdown,
            warnings,
        })
    }

    // =========================================================================
    // Batch operations
    // =========================================================================

    pub fn resolve_tariff_batch(&self, requests: &[TariffRequest]) -> BatchResult<TariffResolution> {
        let results = requests
            .par_iter()
            .map(|r| self.resolve_tariff(&r.origin_country, r.classification_code.as_deref()))
            .collect();
        self.report(results)
    }

    pub fn resolve_shipping_batch(&self, requests: &[ShippingRequest]) -> BatchResult<ShippingQuote> {
        let results = requests
            .par_iter()
            .map(|r| self.resolve_shipping(r.weight, r.item_price, &r.destination_zone))
            .collect();
        self.report(results)
    }

    pub fn calculate_forward_profit_batch(
        &self,
        requests: &[ProfitRequest],
        context: &BatchContext,
    ) -> BatchResult<ProfitBreakdown> {
        let results = requests
            .par_iter()
            .map(|r| {
                let fees = context.fee_schedule(&r.channel)?;
                self.calculate_forward_profit(&r.costs, fees, r.price, r.competitor_floor)
            })
            .collect();
        self.report(results)
    }

    pub fn calculate_required_price_batch(
        &self,
        requests: &[RequiredPriceRequest],
        context: &BatchContext,
    ) -> BatchResult<RequiredPrice> {
        let results = requests
            .par_iter()
            .map(|r| {
                let fees = context.fee_schedule(&r.channel)?;
                self.calculate_required_price(&r.costs, fees, r.target_margin, r.competitor_floor)
            })
            .collect();
        self.report(results)
    }

    /// Resolves every item and groups the items by resolved rule. Each
    /// distinct predicate key is matched once.
    pub fn resolve_strategy_batch(
        &self,
        requests: &[StrategyRequest],
    ) -> (BatchResult<PricingPolicyRule>, Vec<RuleGroup>) {
        let pairs: Vec<(CatalogueItem, ChannelContext)> = requests
            .iter()
            .map(|r| (r.item.clone(), r.context.clone()))
            .collect();
        let (rules, groups) = self.snapshot.rules().resolve_batch(&pairs);
        let results = rules.into_iter().map(|rule| Ok(rule.clone())).collect();
        (self.report(results), groups)
    }

    pub fn score_arbitrage_batch(&self, requests: &[ScoringRequest]) -> BatchResult<ArbitrageScore> {
        let results = requests
            .par_iter()
            .map(|r| match r {
                ScoringRequest::Signal(signal) => Ok(self.score_arbitrage_candidate(signal)),
                ScoringRequest::History(inputs) => self.score_from_history(inputs),
            })
            .collect();
        self.report(results)
    }

    pub fn quote_item_batch(
        &self,
        requests: &[QuoteRequest],
        context: &BatchContext,
    ) -> BatchResult<ItemQuote> {
        let results = requests
            .par_iter()
            .map(|r| self.quote_item(r, context))
            .collect();
        self.report(results)
    }

    pub fn forward_quote_batch(
        &self,
        requests: &[ForwardQuoteRequest],
        context: &BatchContext,
    ) -> BatchResult<ForwardQuote> {
        let results = requests
            .par_iter()
            .map(|r| self.forward_quote(r, context))
            .collect();
        self.report(results)
    }

    fn report<T: ItemWarnings>(&self, results: Vec<Result<T>>) -> BatchResult<T> {
        BatchResult::collect(self.snapshot.version(), results)
    }

    fn shipping_resolver(&self) -> ShippingRateResolver<'_> {
        ShippingRateResolver::new(self.snapshot.shipping(), self.config.duty_policy())
    }
}

/// Source-currency cost of `units` of the item, after checking the lot
/// inputs shared by the item-level operations.
fn lot_cost(item: &CatalogueItem, units: u32, fx_rate: Decimal) -> Result<Decimal> {
    item.validate()?;
    if units == 0 {
        return Err(ValidationError::ZeroUnits.into());
    }
    if fx_rate <= Decimal::ZERO {
        return Err(ValidationError::not_positive("fxRate", fx_rate).into());
    }
    checked(item.cost.checked_mul(Decimal::from(units)), "lot cost")
}
