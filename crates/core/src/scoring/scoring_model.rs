//! Scoring domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::NEUTRAL_SCORE;

/// Externally supplied risk or potential classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Assessment {
    Low,
    Medium,
    High,
}

/// Price and market facts about a sourcing candidate, computed fresh for
/// every scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSignal {
    pub current_price: Decimal,
    pub trailing_average_price: Decimal,
    /// Peak-to-current drop within the short window, as a fraction
    pub short_window_drop_ratio: Decimal,
    pub open_offer_count: u32,
    #[serde(default)]
    pub discontinued: bool,
    #[serde(default)]
    pub sustained_decline: bool,
    #[serde(default)]
    pub risk: Option<Assessment>,
    #[serde(default)]
    pub potential: Option<Assessment>,
}

impl ScoreSignal {
    /// How far the current price sits below the trailing average, as a
    /// fraction of the average. Zero when there is no average; saturates at
    /// the decimal range.
    pub fn discount_ratio(&self) -> Decimal {
        let average = self.trailing_average_price;
        if average <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        average
            .checked_sub(self.current_price)
            .and_then(|gap| gap.checked_div(average))
            .unwrap_or(if self.current_price > average {
                Decimal::MIN
            } else {
                Decimal::MAX
            })
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk == Some(Assessment::High)
    }
}

/// Weights and thresholds of the arbitrage score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    /// Neutral starting score (default: 50)
    pub base_score: Decimal,

    /// Minimum discount below the trailing average for a mispricing (default: 0.30)
    pub mispricing_discount_threshold: Decimal,

    /// Short-window drop ratio that must be exceeded for a mispricing (default: 0.20)
    pub drop_ratio_threshold: Decimal,

    pub mispricing_bonus: Decimal,

    /// Open offers at or below which a discontinued item counts as scarce (default: 3)
    pub scarcity_max_open_offers: u32,

    pub scarcity_bonus: Decimal,

    pub decline_penalty: Decimal,

    pub potential_bonus: Decimal,

    /// Upper bound on the final score. Unset means unbounded.
    pub score_cap: Option<Decimal>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: NEUTRAL_SCORE,
            mispricing_discount_threshold: dec!(0.30),
            drop_ratio_threshold: dec!(0.20),
            mispricing_bonus: dec!(30),
            scarcity_max_open_offers: 3,
            scarcity_bonus: dec!(15),
            decline_penalty: dec!(15),
            potential_bonus: dec!(5),
            score_cap: None,
        }
    }
}

/// Windows used when deriving signals from price history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalConfig {
    /// Days averaged for the trailing price (default: 30)
    pub trailing_window_days: u32,

    /// Days inspected for a sharp drop (default: 7)
    pub short_window_days: u32,

    /// Consecutive segments that must each average lower for a sustained
    /// decline (default: 3)
    pub decline_segments: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            trailing_window_days: 30,
            short_window_days: 7,
            decline_segments: 3,
        }
    }
}

/// One observed market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Raw facts a `ScoreSignal` is derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalInputs {
    pub history: Vec<PricePoint>,
    pub open_offer_count: u32,
    #[serde(default)]
    pub discontinued: bool,
    #[serde(default)]
    pub risk: Option<Assessment>,
    #[serde(default)]
    pub potential: Option<Assessment>,
    /// Defaults to the latest observation
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    MispricingBonus,
    ScarcityBonus,
    DeclinePenalty,
    PotentialBonus,
    RiskVeto,
    Clamped,
    Capped,
}

/// One step applied to the running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAdjustment {
    pub kind: AdjustmentKind,
    pub delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageScore {
    pub score: Decimal,
    pub vetoed: bool,
    pub adjustments: Vec<ScoreAdjustment>,
}

impl ArbitrageScore {
    pub fn has(&self, kind: AdjustmentKind) -> bool {
        self.adjustments.iter().any(|a| a.kind == kind)
    }
}

/// An ingested item waiting in a manual-review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityEntry {
    pub item_id: String,
    #[serde(default)]
    pub priority_score: Option<Decimal>,
}
