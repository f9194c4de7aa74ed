//! Non-fatal conditions attached to otherwise successful results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why an item could not be matched to a tariff classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnclassifiedReason {
    /// No classification code was supplied
    NotProvided,
    /// The code is not a 2-10 digit number
    Malformed,
    /// The code does not resolve to a known full code
    UnknownCode,
    /// The code's chapter is excluded from automatic classification
    ExcludedChapter,
}

/// A warning that degrades confidence without failing the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    /// The item fell back to the country-default duty rate.
    #[serde(rename_all = "camelCase")]
    UnclassifiedItem {
        code: Option<String>,
        reason: UnclassifiedReason,
    },
    /// A known competitor sells below the price that meets the minimum
    /// acceptable margin.
    #[serde(rename_all = "camelCase")]
    RedFlag {
        competitor_floor: Decimal,
        /// `None` when no price can meet the minimum margin at all
        minimum_price: Option<Decimal>,
    },
}

impl Warning {
    pub fn is_red_flag(&self) -> bool {
        matches!(self, Warning::RedFlag { .. })
    }
}
