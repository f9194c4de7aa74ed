//! Per-batch fee schedule cache.
//!
//! Every distinct channel in a batch is fetched exactly once, concurrently,
//! before any item is priced. Items then read from the cache, so a batch
//! never sees two different schedules for one channel.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};

use crate::errors::{Error, Result};

use super::fees_model::FeeSchedule;
use super::fees_traits::FeeScheduleProvider;

#[derive(Debug, Clone, Default)]
pub struct FeeScheduleCache {
    schedules: HashMap<String, FeeSchedule>,
    /// channel -> fetch error message
    failures: HashMap<String, String>,
}

impl FeeScheduleCache {
    /// Fetches the schedule of each distinct channel once.
    ///
    /// A failed or invalid fetch is recorded against its channel instead of
    /// failing the whole batch.
    pub async fn prefetch<I, S>(provider: &dyn FeeScheduleProvider, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = channels.into_iter().map(Into::into).collect();
        debug!("Fetching fee schedules for {} channels", distinct.len());

        let fetches = distinct.iter().map(|channel| async move {
            let result = provider
                .fee_schedule(channel)
                .await
                .and_then(|schedule| schedule.validate().map(|_| schedule));
            (channel.clone(), result)
        });

        let mut cache = FeeScheduleCache::default();
        for (channel, result) in join_all(fetches).await {
            match result {
                Ok(schedule) => {
                    cache.schedules.insert(channel, schedule);
                }
                Err(e) => {
                    warn!("Fee schedule for channel '{}' unavailable: {}", channel, e);
                    cache.failures.insert(channel, e.to_string());
                }
            }
        }
        cache
    }

    /// Builds a cache from schedules that are already known.
    pub fn from_schedules(schedules: impl IntoIterator<Item = FeeSchedule>) -> Self {
        Self {
            schedules: schedules
                .into_iter()
                .map(|s| (s.channel.clone(), s))
                .collect(),
            failures: HashMap::new(),
        }
    }

    pub fn get(&self, channel: &str) -> Result<&FeeSchedule> {
        self.schedules
            .get(channel)
            .ok_or_else(|| Error::FeeScheduleUnavailable(channel.to_string()))
    }

    pub fn failure(&self, channel: &str) -> Option<&str> {
        self.failures.get(channel).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

/// Fee schedules held in memory, for callers that already have them.
#[derive(Debug, Clone, Default)]
pub struct StaticFeeScheduleProvider {
    schedules: HashMap<String, FeeSchedule>,
}

impl StaticFeeScheduleProvider {
    pub fn new(schedules: impl IntoIterator<Item = FeeSchedule>) -> Self {
        Self {
            schedules: schedules
                .into_iter()
                .map(|s| (s.channel.clone(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl FeeScheduleProvider for StaticFeeScheduleProvider {
    async fn fee_schedule(&self, channel: &str) -> Result<FeeSchedule> {
        self.schedules
            .get(channel)
            .cloned()
            .ok_or_else(|| Error::FeeScheduleUnavailable(channel.to_string()))
    }
}
