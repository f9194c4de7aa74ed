//! Batch context and per-item batch reports.

use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{Error, ErrorKind, Result};
use crate::fees::{FeeSchedule, FeeScheduleCache, FeeScheduleProvider};
use crate::profit::{ProfitBreakdown, RequiredPrice};
use crate::scoring::ArbitrageScore;
use crate::shipping::ShippingQuote;
use crate::strategy::PricingPolicyRule;
use crate::tariffs::TariffResolution;
use crate::warnings::Warning;

use super::engine_model::{ForwardQuote, ItemQuote};

/// External data fetched once for a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchContext {
    fees: FeeScheduleCache,
}

impl BatchContext {
    /// Fetches the fee schedule of every distinct channel once.
    pub async fn prepare<I, S>(provider: &dyn FeeScheduleProvider, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fees: FeeScheduleCache::prefetch(provider, channels).await,
        }
    }

    pub fn from_schedules(schedules: impl IntoIterator<Item = FeeSchedule>) -> Self {
        Self {
            fees: FeeScheduleCache::from_schedules(schedules),
        }
    }

    pub fn fee_schedule(&self, channel: &str) -> Result<&FeeSchedule> {
        self.fees.get(channel)
    }

    pub fn fees(&self) -> &FeeScheduleCache {
        &self.fees
    }
}

/// Non-fatal warnings carried by a successful item result.
pub trait ItemWarnings {
    fn item_warnings(&self) -> Vec<Warning> {
        Vec::new()
    }
}

impl ItemWarnings for TariffResolution {
    fn item_warnings(&self) -> Vec<Warning> {
        self.warnings.clone()
    }
}

impl ItemWarnings for ProfitBreakdown {
    fn item_warnings(&self) -> Vec<Warning> {
        self.warnings.clone()
    }
}

impl ItemWarnings for RequiredPrice {
    fn item_warnings(&self) -> Vec<Warning> {
        self.breakdown.warnings.clone()
    }
}

impl ItemWarnings for ItemQuote {
    fn item_warnings(&self) -> Vec<Warning> {
        self.warnings.clone()
    }
}

impl ItemWarnings for ForwardQuote {
    fn item_warnings(&self) -> Vec<Warning> {
        self.warnings.clone()
    }
}

impl ItemWarnings for ShippingQuote {}
impl ItemWarnings for PricingPolicyRule {}
impl ItemWarnings for ArbitrageScore {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for BatchError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one item: a value or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem<T> {
    /// Position in the submitted batch
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl<T> BatchItem<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult<T> {
    pub run_id: Uuid,
    pub snapshot_version: String,
    pub items: Vec<BatchItem<T>>,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T: ItemWarnings> BatchResult<T> {
    /// Wraps per-item results, keeping their order.
    pub fn collect(snapshot_version: &str, results: Vec<Result<T>>) -> Self {
        let items: Vec<BatchItem<T>> = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(value) => BatchItem {
                    index,
                    warnings: value.item_warnings(),
                    value: Some(value),
                    error: None,
                },
                Err(err) => BatchItem {
                    index,
                    value: None,
                    error: Some(BatchError::from(&err)),
                    warnings: Vec::new(),
                },
            })
            .collect();

        let succeeded = items.iter().filter(|i| i.is_ok()).count();
        let failed = items.len() - succeeded;
        let run_id = Uuid::now_v7();
        info!(
            "Batch {} on snapshot {}: {} succeeded, {} failed",
            run_id, snapshot_version, succeeded, failed
        );

        Self {
            run_id,
            snapshot_version: snapshot_version.to_string(),
            items,
            succeeded,
            failed,
        }
    }
}

impl<T> BatchResult<T> {
    pub fn values(&self) -> impl Iterator<Item = Option<&T>> {
        self.items.iter().map(|i| i.value.as_ref())
    }
}
