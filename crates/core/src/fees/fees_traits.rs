use async_trait::async_trait;

use super::fees_model::FeeSchedule;
use crate::errors::Result;

/// External source of channel fee schedules (typically a marketplace API).
///
/// Called at most once per channel per batch; see `FeeScheduleCache`.
#[async_trait]
pub trait FeeScheduleProvider: Send + Sync {
    async fn fee_schedule(&self, channel: &str) -> Result<FeeSchedule>;
}
