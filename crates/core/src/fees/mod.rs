//! Fees module - channel fee schedules and the per-batch cache.

mod fee_cache;
mod fees_model;
mod fees_traits;

pub use fee_cache::{FeeScheduleCache, StaticFeeScheduleProvider};
pub use fees_model::FeeSchedule;
pub use fees_traits::FeeScheduleProvider;
