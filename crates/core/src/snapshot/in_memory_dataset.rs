//! Serde-loadable dataset holding every collaborator table in memory.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::fees::{FeeSchedule, StaticFeeScheduleProvider};
use crate::shipping::{PriceBand, ShippingDatasetProvider, ShippingRateCell, WeightBand};
use crate::strategy::{PricingPolicyRule, RuleDatasetProvider};
use crate::tariffs::{
    CountryRateOverride, CountryTariffProfile, TariffChapter, TariffDatasetProvider,
    TariffFullCode, TariffHeading, TariffSubheading,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InMemoryDataset {
    /// Snapshot version reported in batch results
    pub version: Option<String>,
    pub chapters: Vec<TariffChapter>,
    pub headings: Vec<TariffHeading>,
    pub subheadings: Vec<TariffSubheading>,
    pub full_codes: Vec<TariffFullCode>,
    pub country_profiles: Vec<CountryTariffProfile>,
    pub country_overrides: Vec<CountryRateOverride>,
    pub weight_bands: Vec<WeightBand>,
    pub price_bands: Vec<PriceBand>,
    pub rate_cells: Vec<ShippingRateCell>,
    pub pricing_rules: Vec<PricingPolicyRule>,
    pub fee_schedules: Vec<FeeSchedule>,
}

impl InMemoryDataset {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn fee_provider(&self) -> StaticFeeScheduleProvider {
        StaticFeeScheduleProvider::new(self.fee_schedules.clone())
    }
}

impl TariffDatasetProvider for InMemoryDataset {
    fn chapters(&self) -> Result<Vec<TariffChapter>> {
        Ok(self.chapters.clone())
    }

    fn headings(&self) -> Result<Vec<TariffHeading>> {
        Ok(self.headings.clone())
    }

    fn subheadings(&self) -> Result<Vec<TariffSubheading>> {
        Ok(self.subheadings.clone())
    }

    fn full_codes(&self) -> Result<Vec<TariffFullCode>> {
        Ok(self.full_codes.clone())
    }

    fn country_profiles(&self) -> Result<Vec<CountryTariffProfile>> {
        Ok(self.country_profiles.clone())
    }

    fn country_overrides(&self) -> Result<Vec<CountryRateOverride>> {
        Ok(self.country_overrides.clone())
    }
}

impl ShippingDatasetProvider for InMemoryDataset {
    fn weight_bands(&self) -> Result<Vec<WeightBand>> {
        Ok(self.weight_bands.clone())
    }

    fn price_bands(&self) -> Result<Vec<PriceBand>> {
        Ok(self.price_bands.clone())
    }

    fn rate_cells(&self) -> Result<Vec<ShippingRateCell>> {
        Ok(self.rate_cells.clone())
    }
}

impl RuleDatasetProvider for InMemoryDataset {
    fn pricing_rules(&self) -> Result<Vec<PricingPolicyRule>> {
        Ok(self.pricing_rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::shipping::PolicyBasis;
    use rust_decimal_macros::dec;

    const DATASET: &str = r#"{
        "version": "2026-10-01",
        "chapters": [{"code": "90", "description": "Optical instruments"}],
        "headings": [{"code": "9006", "description": "Photographic cameras"}],
        "subheadings": [{"code": "900659", "description": "Other cameras"}],
        "fullCodes": [{"code": "9006594000", "description": "Other", "generalRate": 0.032}],
        "countryProfiles": [{"country": "JP", "baseRate": 0.03}],
        "weightBands": [{"index": 0, "minWeight": 0, "maxWeight": 2}],
        "priceBands": [{"index": 0, "label": "<=450", "minPrice": 150, "maxPrice": 450}],
        "rateCells": [
            {"weightBand": 0, "zone": "US", "basis": "DUTY_UNPAID",
             "firstUnitRate": 18, "additionalUnitRate": 9}
        ],
        "pricingRules": [
            {"id": "default", "effect": {"targetMargin": 0.15}}
        ],
        "feeSchedules": [
            {"channel": "ebay", "percentageFee": 0.13, "fixedFee": 0.3, "crossBorderFee": 0.0165}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let dataset = InMemoryDataset::from_json(DATASET).unwrap();

        assert_eq!(dataset.version.as_deref(), Some("2026-10-01"));
        assert_eq!(dataset.full_codes[0].general_rate, dec!(0.032));
        assert!(!dataset.chapters[0].is_excluded);
        assert_eq!(dataset.rate_cells[0].basis, PolicyBasis::DutyUnpaid);
        assert_eq!(dataset.rate_cells[0].handling_fee, dec!(0));
        assert_eq!(dataset.pricing_rules[0].effect.target_margin, dec!(0.15));
        assert_eq!(dataset.fee_schedules[0].cross_border_fee, dec!(0.0165));
        assert!(dataset.country_overrides.is_empty());
    }

    #[test]
    fn test_malformed_json_is_a_dataset_error() {
        let err = InMemoryDataset::from_json("{\"chapters\": 5}").unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }
}
