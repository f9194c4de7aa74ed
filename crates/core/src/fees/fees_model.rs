use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{checked, DatasetError, Result};

/// Per-channel selling fees: a share of the price, a fixed amount per order,
/// and a cross-border surcharge that is also a share of the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub channel: String,
    pub percentage_fee: Decimal,
    #[serde(default)]
    pub fixed_fee: Decimal,
    #[serde(default)]
    pub cross_border_fee: Decimal,
}

impl FeeSchedule {
    pub fn new(
        channel: impl Into<String>,
        percentage_fee: Decimal,
        fixed_fee: Decimal,
        cross_border_fee: Decimal,
    ) -> Self {
        Self {
            channel: channel.into(),
            percentage_fee,
            fixed_fee,
            cross_border_fee,
        }
    }

    /// Combined share of the selling price taken by the channel.
    pub fn percentage_rate(&self) -> Decimal {
        self.percentage_fee.saturating_add(self.cross_border_fee)
    }

    /// Channel fees owed at `price`.
    pub fn fees_at(&self, price: Decimal) -> Result<Decimal> {
        let variable = checked(self.percentage_rate().checked_mul(price), "channel fees")?;
        checked(variable.checked_add(self.fixed_fee), "channel fees")
    }

    pub fn validate(&self) -> Result<()> {
        let negative = self.percentage_fee < Decimal::ZERO
            || self.fixed_fee < Decimal::ZERO
            || self.cross_border_fee < Decimal::ZERO;
        if negative || self.percentage_rate() >= Decimal::ONE {
            return Err(DatasetError::InvalidValue(format!(
                "fee schedule for channel '{}' is out of range",
                self.channel
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fees_are_linear_in_price() {
        let schedule = FeeSchedule::new("ebay", dec!(0.13), dec!(0.30), dec!(0.0165));
        assert_eq!(schedule.percentage_rate(), dec!(0.1465));
        assert_eq!(schedule.fees_at(dec!(100)).unwrap(), dec!(14.95));
        assert_eq!(schedule.fees_at(dec!(0)).unwrap(), dec!(0.30));
    }

    #[test]
    fn test_fees_at_overflow_is_an_error() {
        let schedule = FeeSchedule::new("ebay", dec!(0.5), Decimal::MAX, dec!(0));
        let err = schedule.fees_at(dec!(10)).unwrap_err();
        assert!(matches!(
            err,
            crate::errors::Error::Validation(crate::errors::ValidationError::Overflow(_))
        ));
    }

    #[test]
    fn test_validate_rejects_rate_of_one() {
        assert!(FeeSchedule::new("x", dec!(0.9), dec!(0), dec!(0.1))
            .validate()
            .is_err());
        assert!(FeeSchedule::new("x", dec!(0.1), dec!(-1), dec!(0))
            .validate()
            .is_err());
        assert!(FeeSchedule::new("x", dec!(0.1), dec!(1), dec!(0))
            .validate()
            .is_ok());
    }
}
