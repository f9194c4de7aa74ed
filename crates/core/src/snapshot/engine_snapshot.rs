//! Immutable, validated view of every rate and rule table.
//!
//! A snapshot is built once from the dataset providers and shared by `Arc`
//! for the lifetime of a batch, so concurrent dataset updates never show up
//! halfway through a run.

use log::info;

use crate::errors::Result;
use crate::shipping::{ShippingDatasetProvider, ShippingRateTable};
use crate::strategy::{RuleDatasetProvider, StrategyResolver};
use crate::tariffs::{TariffDatasetProvider, TariffTable};

use super::in_memory_dataset::InMemoryDataset;

#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    version: String,
    tariffs: TariffTable,
    shipping: ShippingRateTable,
    rules: StrategyResolver,
}

impl EngineSnapshot {
    /// Reads every provider once and validates the tables.
    pub fn build(
        version: impl Into<String>,
        tariffs: &dyn TariffDatasetProvider,
        shipping: &dyn ShippingDatasetProvider,
        rules: &dyn RuleDatasetProvider,
    ) -> Result<Self> {
        let version = version.into();
        let tariffs = TariffTable::from_provider(tariffs)?;
        let shipping = ShippingRateTable::from_provider(shipping)?;
        let rules = StrategyResolver::from_provider(rules)?;

        info!(
            "Built snapshot {}: {} full codes, {} countries, {} rate cells, {} pricing rules",
            version,
            tariffs.full_code_count(),
            tariffs.country_count(),
            shipping.cell_count(),
            rules.len()
        );

        Ok(Self {
            version,
            tariffs,
            shipping,
            rules,
        })
    }

    /// Builds from a single in-memory dataset. The dataset's own version is
    /// used when present.
    pub fn from_dataset(dataset: &InMemoryDataset, fallback_version: &str) -> Result<Self> {
        let version = dataset
            .version
            .clone()
            .unwrap_or_else(|| fallback_version.to_string());
        Self::build(version, dataset, dataset, dataset)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tariffs(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn shipping(&self) -> &ShippingRateTable {
        &self.shipping
    }

    pub fn rules(&self) -> &StrategyResolver {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatasetError, Error};
    use crate::snapshot::fixtures::sample_dataset;

    #[test]
    fn test_build_from_sample_dataset() {
        let snapshot = EngineSnapshot::from_dataset(&sample_dataset(), "unversioned").unwrap();

        assert_eq!(snapshot.version(), "fixture-1");
        assert_eq!(snapshot.tariffs().country_count(), 3);
        assert_eq!(snapshot.rules().default_rule().id, "default");
        assert!(snapshot.shipping().cell_count() > 0);
    }

    #[test]
    fn test_fallback_version() {
        let mut dataset = sample_dataset();
        dataset.version = None;
        let snapshot = EngineSnapshot::from_dataset(&dataset, "v0").unwrap();
        assert_eq!(snapshot.version(), "v0");
    }

    #[test]
    fn test_invalid_dataset_fails_once_at_build() {
        let mut dataset = sample_dataset();
        dataset.pricing_rules.retain(|r| r.id != "default");

        let err = EngineSnapshot::from_dataset(&dataset, "v0").unwrap_err();
        assert_eq!(err, Error::Dataset(DatasetError::DefaultRule(0)));
    }
}
