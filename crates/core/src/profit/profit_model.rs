//! Profit domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{checked, Result, ValidationError};
use crate::fees::FeeSchedule;
use crate::warnings::Warning;

/// Price-independent cost inputs for one unit sold on one channel.
///
/// `source_cost` is in the source currency; `fx_rate` converts it to the
/// selling currency. Everything else is already in the selling currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostInputs {
    pub source_cost: Decimal,
    pub fx_rate: Decimal,
    pub duty_rate: Decimal,
    /// Shipping total including the handling fee
    pub shipping_cost: Decimal,
}

impl CostInputs {
    pub fn validate(&self) -> Result<()> {
        if self.fx_rate <= Decimal::ZERO {
            return Err(ValidationError::not_positive("fxRate", self.fx_rate).into());
        }
        let negative = [
            ("sourceCost", self.source_cost),
            ("dutyRate", self.duty_rate),
            ("shippingCost", self.shipping_cost),
        ]
        .into_iter()
        .find(|(_, value)| *value < Decimal::ZERO);
        if let Some((field, value)) = negative {
            return Err(ValidationError::InvalidInput(format!(
                "{} must not be negative, got {}",
                field, value
            ))
            .into());
        }
        Ok(())
    }

    /// Source cost in the selling currency.
    pub fn converted_cost(&self) -> Result<Decimal> {
        checked(self.source_cost.checked_mul(self.fx_rate), "converted cost")
    }

    pub fn duty_cost(&self) -> Result<Decimal> {
        checked(self.duty_rate.checked_mul(self.converted_cost()?), "duty cost")
    }

    /// Every cost that does not scale with the selling price.
    pub fn fixed_components(&self, fees: &FeeSchedule) -> Result<Decimal> {
        [self.duty_cost()?, self.shipping_cost, fees.fixed_fee]
            .into_iter()
            .try_fold(self.converted_cost()?, |sum, part| {
                checked(sum.checked_add(part), "fixed cost components")
            })
    }
}

/// Forward profit result at a given selling price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitBreakdown {
    pub price: Decimal,
    pub converted_cost: Decimal,
    pub duty_cost: Decimal,
    pub shipping_cost: Decimal,
    pub channel_fees: Decimal,
    pub landed_cost: Decimal,
    pub profit: Decimal,
    /// Profit as a fraction of price
    pub margin: Decimal,
    /// Profit as a percent of price
    pub margin_percent: Decimal,
    pub red_flag: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

/// Reverse result: the price that yields a target margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredPrice {
    pub price: Decimal,
    pub target_margin: Decimal,
    pub fixed_cost_components: Decimal,
    pub percentage_fee_rate: Decimal,
    /// Forward check of `price`
    pub breakdown: ProfitBreakdown,
}

impl RequiredPrice {
    pub fn red_flag(&self) -> bool {
        self.breakdown.red_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_components() {
        let inputs = CostInputs {
            source_cost: dec!(3000),
            fx_rate: dec!(0.0068),
            duty_rate: dec!(0.1),
            shipping_cost: dec!(12.5),
        };
        let fees = FeeSchedule::new("ebay", dec!(0.13), dec!(0.30), dec!(0.0165));

        assert_eq!(inputs.converted_cost().unwrap(), dec!(20.4));
        assert_eq!(inputs.duty_cost().unwrap(), dec!(2.04));
        assert_eq!(inputs.fixed_components(&fees).unwrap(), dec!(35.24));
    }

    #[test]
    fn test_validate() {
        let mut inputs = CostInputs {
            source_cost: dec!(10),
            fx_rate: dec!(1),
            duty_rate: dec!(0),
            shipping_cost: dec!(0),
        };
        assert!(inputs.validate().is_ok());

        inputs.fx_rate = dec!(0);
        assert!(inputs.validate().is_err());

        inputs.fx_rate = dec!(1);
        inputs.shipping_cost = dec!(-1);
        assert!(inputs.validate().is_err());
    }
}
