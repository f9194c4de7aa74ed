use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DECIMAL_PRECISION, DEFAULT_DDP_MAX_PRICE, DEFAULT_DDP_MIN_PRICE,
    DEFAULT_MINIMUM_ACCEPTABLE_MARGIN,
};
use crate::errors::{Result, ValidationError};
use crate::scoring::{ScoringConfig, SignalConfig};
use crate::shipping::DutyPolicy;

/// Business thresholds of the pricing engine.
///
/// Every field has a default, so a partial JSON document only needs the
/// values it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Lowest item price shipped duty-prepaid, inclusive (default: 150)
    pub ddp_min_price: Decimal,

    /// Highest item price shipped duty-prepaid, inclusive (default: 450)
    pub ddp_max_price: Decimal,

    /// Margin a competitor floor is checked against for red flags
    /// (default: 0.05). Kept separate from rule target margins.
    pub minimum_acceptable_margin: Decimal,

    /// Decimal places of reported values (default: 6)
    pub decimal_precision: u32,

    pub scoring: ScoringConfig,

    pub signals: SignalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ddp_min_price: DEFAULT_DDP_MIN_PRICE,
            ddp_max_price: DEFAULT_DDP_MAX_PRICE,
            minimum_acceptable_margin: DEFAULT_MINIMUM_ACCEPTABLE_MARGIN,
            decimal_precision: DECIMAL_PRECISION,
            scoring: ScoringConfig::default(),
            signals: SignalConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ddp_min_price > self.ddp_max_price {
            return Err(ValidationError::InvalidInput(format!(
                "duty-prepaid window {}..{} is empty",
                self.ddp_min_price, self.ddp_max_price
            ))
            .into());
        }
        let margin = self.minimum_acceptable_margin;
        if margin < Decimal::ZERO || margin >= Decimal::ONE {
            return Err(ValidationError::InvalidInput(format!(
                "minimum acceptable margin {} is outside [0, 1)",
                margin
            ))
            .into());
        }
        Ok(())
    }

    pub fn duty_policy(&self) -> DutyPolicy {
        DutyPolicy {
            ddp_min_price: self.ddp_min_price,
            ddp_max_price: self.ddp_max_price,
        }
    }
}
