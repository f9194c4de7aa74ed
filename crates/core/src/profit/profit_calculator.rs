//! Forward and reverse profit arithmetic.
//!
//! Landed cost at price `p` is
//! `converted + duty + shipping + fixed_fee + (percentage_fee + cross_border_fee) * p`.
//! Fees are linear in `p`, so the reverse problem has a closed form:
//! `p = fixed_components / (1 - percentage_rate - target_margin)`.

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::{DECIMAL_PRECISION, DEFAULT_MINIMUM_ACCEPTABLE_MARGIN};
use crate::errors::{checked, Error, Result, ValidationError};
use crate::fees::FeeSchedule;
use crate::warnings::Warning;

use super::profit_model::{CostInputs, ProfitBreakdown, RequiredPrice};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Solves `price - fixed - rate * price = margin * price` for `price`.
///
/// Fails with `InfeasibleMargin` when `1 - rate - margin <= 0`, and with an
/// overflow validation error when the price is too large to represent.
pub fn solve_price(
    fixed_cost_components: Decimal,
    percentage_fee_rate: Decimal,
    target_margin: Decimal,
) -> Result<Decimal> {
    let denominator = Decimal::ONE
        .checked_sub(percentage_fee_rate)
        .and_then(|d| d.checked_sub(target_margin));
    let denominator = checked(denominator, "price denominator")?;
    if denominator <= Decimal::ZERO {
        return Err(Error::InfeasibleMargin {
            target_margin,
            fee_rate: percentage_fee_rate,
        });
    }
    checked(
        fixed_cost_components.checked_div(denominator),
        "required price",
    )
}

#[derive(Debug, Clone)]
pub struct ProfitCalculator {
    minimum_acceptable_margin: Decimal,
    precision: u32,
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_ACCEPTABLE_MARGIN, DECIMAL_PRECISION)
    }
}

impl ProfitCalculator {
    pub fn new(minimum_acceptable_margin: Decimal, precision: u32) -> Self {
        Self {
            minimum_acceptable_margin,
            precision,
        }
    }

    pub fn minimum_acceptable_margin(&self) -> Decimal {
        self.minimum_acceptable_margin
    }

    /// Profit and margin at `price`.
    ///
    /// When `competitor_floor` is below the price needed for the minimum
    /// acceptable margin, the result is red-flagged; the numbers are
    /// unaffected.
    pub fn forward(
        &self,
        inputs: &CostInputs,
        fees: &FeeSchedule,
        price: Decimal,
        competitor_floor: Option<Decimal>,
    ) -> Result<ProfitBreakdown> {
        inputs.validate()?;
        if price <= Decimal::ZERO {
            return Err(ValidationError::not_positive("price", price).into());
        }

        let converted_cost = inputs.converted_cost()?;
        let duty_cost = inputs.duty_cost()?;
        let channel_fees = fees.fees_at(price)?;
        let landed_cost = [duty_cost, inputs.shipping_cost, channel_fees]
            .into_iter()
            .try_fold(converted_cost, |sum, part| {
                checked(sum.checked_add(part), "landed cost")
            })?;
        let profit = checked(price.checked_sub(landed_cost), "profit")?;
        let margin = checked(profit.checked_div(price), "margin")?;
        let margin_percent = checked(margin.checked_mul(HUNDRED), "margin percent")?;

        let warnings: Vec<Warning> = self
            .red_flag(inputs, fees, competitor_floor)
            .into_iter()
            .collect();

        Ok(ProfitBreakdown {
            price: self.round(price),
            converted_cost: self.round(converted_cost),
            duty_cost: self.round(duty_cost),
            shipping_cost: self.round(inputs.shipping_cost),
            channel_fees: self.round(channel_fees),
            landed_cost: self.round(landed_cost),
            profit: self.round(profit),
            margin: self.round(margin),
            margin_percent: self.round(margin_percent),
            red_flag: !warnings.is_empty(),
            warnings,
        })
    }

    /// Price that yields `target_margin` (a fraction), checked forward.
    pub fn required_price(
        &self,
        inputs: &CostInputs,
        fees: &FeeSchedule,
        target_margin: Decimal,
        competitor_floor: Option<Decimal>,
    ) -> Result<RequiredPrice> {
        inputs.validate()?;
        let fixed = inputs.fixed_components(fees)?;
        if fixed <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "item has no costs to recover; required price is undefined".to_string(),
            )
            .into());
        }

        let rate = fees.percentage_rate();
        let price = solve_price(fixed, rate, target_margin)?;
        debug!(
            "Required price {} for margin {} (fixed {}, fee rate {})",
            price, target_margin, fixed, rate
        );

        let breakdown = self.forward(inputs, fees, price, competitor_floor)?;

        Ok(RequiredPrice {
            price: self.round(price),
            target_margin,
            fixed_cost_components: self.round(fixed),
            percentage_fee_rate: rate,
            breakdown,
        })
    }

    /// Lowest price meeting the minimum acceptable margin, or `None` when the
    /// fee structure makes that margin unreachable.
    pub fn minimum_price(&self, inputs: &CostInputs, fees: &FeeSchedule) -> Option<Decimal> {
        solve_price(
            inputs.fixed_components(fees).ok()?,
            fees.percentage_rate(),
            self.minimum_acceptable_margin,
        )
        .ok()
    }

    fn red_flag(
        &self,
        inputs: &CostInputs,
        fees: &FeeSchedule,
        competitor_floor: Option<Decimal>,
    ) -> Option<Warning> {
        let floor = competitor_floor?;
        let minimum_price = self.minimum_price(inputs, fees);
        let flagged = match minimum_price {
            Some(minimum) => floor < minimum,
            None => true,
        };
        if !flagged {
            return None;
        }
        warn!(
            "Competitor floor {} is below the minimum-margin price {:?}",
            floor, minimum_price
        );
        Some(Warning::RedFlag {
            competitor_floor: floor,
            minimum_price: minimum_price.map(|p| self.round(p)),
        })
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp(self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(source_cost: Decimal) -> CostInputs {
        CostInputs {
            source_cost,
            fx_rate: dec!(1),
            duty_rate: dec!(0),
            shipping_cost: dec!(0),
        }
    }

    fn fees(rate: Decimal) -> FeeSchedule {
        FeeSchedule::new("ebay", rate, dec!(0), dec!(0))
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} to be within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_solve_price_closed_form() {
        let price = solve_price(dec!(20), dec!(0.13), dec!(0.15)).unwrap();
        assert_close(price, dec!(27.78), dec!(0.005));
    }

    #[test]
    fn test_solve_price_infeasible() {
        let err = solve_price(dec!(20), dec!(0.13), dec!(0.87)).unwrap_err();
        assert_eq!(
            err,
            Error::InfeasibleMargin {
                target_margin: dec!(0.87),
                fee_rate: dec!(0.13)
            }
        );
        assert!(solve_price(dec!(20), dec!(0.5), dec!(0.6)).is_err());
    }

    #[test]
    fn test_solve_price_overflow_near_upper_margin_bound() {
        // 1 - 0.13 - margin leaves a denominator of 1e-28
        let margin = dec!(0.8699999999999999999999999999);
        let err = solve_price(dec!(20), dec!(0.13), margin).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::Overflow(_))
        ));

        // A denominator of 1e-27 still gives a representable price
        let price = solve_price(dec!(20), dec!(0.13), dec!(0.869999999999999999999999999)).unwrap();
        assert!(price > dec!(10000000000000000000000000000));
    }

    #[test]
    fn test_forward_overflow_is_an_error() {
        let calculator = ProfitCalculator::default();
        let result = calculator.forward(
            &inputs(Decimal::MAX),
            &fees(dec!(0.1)),
            dec!(0.0000000000000000000000000001),
            None,
        );
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::Overflow(_)))
        ));
    }

    #[test]
    fn test_required_price_round_trips_to_target_margin() {
        let calculator = ProfitCalculator::default();

        let required = calculator
            .required_price(&inputs(dec!(20)), &fees(dec!(0.13)), dec!(0.15), None)
            .unwrap();

        assert_close(required.price, dec!(27.78), dec!(0.005));
        assert_close(required.breakdown.margin_percent, dec!(15), dec!(0.0001));
        assert_eq!(required.fixed_cost_components, dec!(20));
        assert!(!required.red_flag());
    }

    #[test]
    fn test_forward_profit() {
        let calculator = ProfitCalculator::default();
        let inputs = CostInputs {
            source_cost: dec!(50),
            fx_rate: dec!(1.1),
            duty_rate: dec!(0.1),
            shipping_cost: dec!(9.5),
        };
        let fees = FeeSchedule::new("ebay", dec!(0.10), dec!(0.5), dec!(0.02));

        let result = calculator.forward(&inputs, &fees, dec!(100), None).unwrap();

        // 55 converted + 5.5 duty + 9.5 shipping + 12.5 fees
        assert_eq!(result.converted_cost, dec!(55));
        assert_eq!(result.duty_cost, dec!(5.5));
        assert_eq!(result.channel_fees, dec!(12.5));
        assert_eq!(result.landed_cost, dec!(82.5));
        assert_eq!(result.profit, dec!(17.5));
        assert_eq!(result.margin_percent, dec!(17.5));
        assert!(!result.red_flag);
    }

    #[test]
    fn test_forward_rejects_non_positive_price() {
        let calculator = ProfitCalculator::default();
        assert!(matches!(
            calculator.forward(&inputs(dec!(10)), &fees(dec!(0.1)), dec!(0), None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_red_flag_keeps_numbers() {
        let calculator = ProfitCalculator::new(dec!(0.05), 6);
        let inputs = inputs(dec!(20));
        let fees = fees(dec!(0.13));
        // Minimum-margin price: 20 / (1 - 0.13 - 0.05) = 24.39
        let unflagged = calculator
            .forward(&inputs, &fees, dec!(30), None)
            .unwrap();
        let flagged = calculator
            .forward(&inputs, &fees, dec!(30), Some(dec!(22)))
            .unwrap();

        assert!(flagged.red_flag);
        assert_eq!(flagged.profit, unflagged.profit);
        assert_eq!(flagged.margin, unflagged.margin);
        match &flagged.warnings[0] {
            Warning::RedFlag {
                competitor_floor,
                minimum_price,
            } => {
                assert_eq!(*competitor_floor, dec!(22));
                assert_close(minimum_price.unwrap(), dec!(24.39), dec!(0.01));
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_red_flag_uses_minimum_not_target_margin() {
        let calculator = ProfitCalculator::new(dec!(0.05), 6);
        // Target price for 15% is 27.78, minimum-margin price is 24.39.
        // A competitor at 25 undercuts the target but not the minimum.
        let required = calculator
            .required_price(&inputs(dec!(20)), &fees(dec!(0.13)), dec!(0.15), Some(dec!(25)))
            .unwrap();
        assert!(!required.red_flag());
    }

    #[test]
    fn test_red_flag_when_minimum_margin_unreachable() {
        let calculator = ProfitCalculator::new(dec!(0.9), 6);
        let result = calculator
            .forward(&inputs(dec!(20)), &fees(dec!(0.13)), dec!(40), Some(dec!(1000)))
            .unwrap();
        assert!(result.red_flag);
        assert!(matches!(
            result.warnings[0],
            Warning::RedFlag {
                minimum_price: None,
                ..
            }
        ));
    }

    #[test]
    fn test_required_price_infeasible_margin() {
        let calculator = ProfitCalculator::default();
        let err = calculator
            .required_price(&inputs(dec!(20)), &fees(dec!(0.3)), dec!(0.7), None)
            .unwrap_err();
        assert!(matches!(err, Error::InfeasibleMargin { .. }));
    }

    #[test]
    fn test_required_price_without_costs() {
        let calculator = ProfitCalculator::default();
        let result = calculator.required_price(&inputs(dec!(0)), &fees(dec!(0.1)), dec!(0.2), None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
