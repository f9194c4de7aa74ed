//! Derives score signals from dated price history.

use chrono::{Duration, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use crate::errors::{checked, Result, ValidationError};

use super::scoring_model::{PricePoint, ScoreSignal, SignalConfig, SignalInputs};

fn average(points: &[&PricePoint]) -> Result<Option<Decimal>> {
    if points.is_empty() {
        return Ok(None);
    }
    let total = points.iter().try_fold(Decimal::ZERO, |sum, p| {
        checked(sum.checked_add(p.price), "price history total")
    })?;
    Ok(Some(total / Decimal::from(points.len())))
}

/// Observations in `(as_of - days, as_of]`.
fn window<'a>(sorted: &[&'a PricePoint], as_of: NaiveDate, days: u32) -> Vec<&'a PricePoint> {
    let start = as_of
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    sorted
        .iter()
        .copied()
        .filter(|p| p.date > start && p.date <= as_of)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SignalBuilder {
    config: SignalConfig,
}

impl SignalBuilder {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, inputs: &SignalInputs) -> Result<ScoreSignal> {
        if let Some(point) = inputs.history.iter().find(|p| p.price < Decimal::ZERO) {
            return Err(ValidationError::InvalidInput(format!(
                "negative price {} observed on {}",
                point.price, point.date
            ))
            .into());
        }

        let mut sorted: Vec<&PricePoint> = inputs.history.iter().collect();
        sorted.sort_by_key(|p| p.date);

        let as_of = match (inputs.as_of, sorted.last()) {
            (Some(date), _) => date,
            (None, Some(latest)) => latest.date,
            (None, None) => {
                return Err(ValidationError::MissingField("history".to_string()).into())
            }
        };
        sorted.retain(|p| p.date <= as_of);

        let current = sorted
            .last()
            .map(|p| p.price)
            .ok_or_else(|| ValidationError::InvalidInput(format!("no price observed by {}", as_of)))?;

        let trailing = window(&sorted, as_of, self.config.trailing_window_days);
        let trailing_average = average(&trailing)?.unwrap_or(current);

        let short = window(&sorted, as_of, self.config.short_window_days);
        let peak = short.iter().map(|p| p.price).max().unwrap_or(current);
        let drop_ratio = if peak > Decimal::ZERO && peak > current {
            (peak - current) / peak
        } else {
            Decimal::ZERO
        };

        let sustained_decline = self.is_sustained_decline(&trailing)?;

        debug!(
            "Signal as of {}: current {}, trailing {}, drop {}, decline {}",
            as_of, current, trailing_average, drop_ratio, sustained_decline
        );

        Ok(ScoreSignal {
            current_price: current,
            trailing_average_price: trailing_average,
            short_window_drop_ratio: drop_ratio,
            open_offer_count: inputs.open_offer_count,
            discontinued: inputs.discontinued,
            sustained_decline,
            risk: inputs.risk,
            potential: inputs.potential,
        })
    }

    /// Splits the window into consecutive segments of near-equal size and
    /// requires every segment to average strictly below the one before.
    fn is_sustained_decline(&self, points: &[&PricePoint]) -> Result<bool> {
        let segments = self.config.decline_segments;
        if segments < 2 || points.len() < segments {
            return Ok(false);
        }

        let base = points.len() / segments;
        let extra = points.len() % segments;
        let mut averages = Vec::with_capacity(segments);
        let mut start = 0;
        for i in 0..segments {
            let len = base + usize::from(i < extra);
            match average(&points[start..start + len])? {
                Some(avg) => averages.push(avg),
                None => return Ok(false),
            }
            start += len;
        }

        Ok(averages.windows(2).all(|pair| pair[1] < pair[0]))
    }
}
