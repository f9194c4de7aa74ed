//! Tariff domain models.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::warnings::Warning;

/// Level of the four-tier classification hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TariffLevel {
    Chapter,
    Heading,
    Subheading,
    FullCode,
}

/// 2-digit chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffChapter {
    pub code: String,
    pub description: String,
    /// No automatic classification may resolve into this chapter
    #[serde(default)]
    pub is_excluded: bool,
}

/// 4-digit heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffHeading {
    pub code: String,
    pub description: String,
}

/// 6-digit subheading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffSubheading {
    pub code: String,
    pub description: String,
}

/// 8 to 10 digit code carrying the duty rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffFullCode {
    pub code: String,
    pub description: String,
    pub general_rate: Decimal,
    /// Alternate rates keyed by program ("special" preference programs,
    /// "column2" for non-normal-trade-relations countries)
    #[serde(default)]
    pub special_rates: BTreeMap<String, Decimal>,
}

/// Per-origin-country duty components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryTariffProfile {
    pub country: String,
    pub base_rate: Decimal,
    #[serde(default)]
    pub trade_remedy_surcharge: Decimal,
    #[serde(default)]
    pub safeguard_surcharge: Decimal,
    #[serde(default)]
    pub antidumping_surcharge: Decimal,
}

impl CountryTariffProfile {
    pub fn new(country: impl Into<String>, base_rate: Decimal) -> Self {
        Self {
            country: country.into(),
            base_rate,
            trade_remedy_surcharge: Decimal::ZERO,
            safeguard_surcharge: Decimal::ZERO,
            antidumping_surcharge: Decimal::ZERO,
        }
    }

    /// Country-level rate: base plus every surcharge.
    pub fn total_rate(&self) -> Decimal {
        self.base_rate
            + self.trade_remedy_surcharge
            + self.safeguard_surcharge
            + self.antidumping_surcharge
    }

    /// Returns the name of the first negative component, if any.
    pub(crate) fn negative_component(&self) -> Option<&'static str> {
        [
            ("baseRate", self.base_rate),
            ("tradeRemedySurcharge", self.trade_remedy_surcharge),
            ("safeguardSurcharge", self.safeguard_surcharge),
            ("antidumpingSurcharge", self.antidumping_surcharge),
        ]
        .into_iter()
        .find(|(_, value)| *value < Decimal::ZERO)
        .map(|(name, _)| name)
    }
}

/// A duty rate that applies to one full code from one origin country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRateOverride {
    pub code: String,
    pub country: String,
    pub rate: Decimal,
}

/// Where a resolved duty rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TariffSource {
    /// By-country override for the exact (code, country) pair
    CountryOverride,
    /// Full code general (or special program) rate
    CodeSpecific,
    /// Country profile total
    CountryDefault,
}

impl TariffSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffSource::CountryOverride => "country-override",
            TariffSource::CodeSpecific => "code-specific",
            TariffSource::CountryDefault => "country-default",
        }
    }
}

impl std::fmt::Display for TariffSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    High,
}

/// Result of a duty-rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffResolution {
    pub origin_country: String,
    /// Normalised classification code that was looked up
    pub classification_code: Option<String>,
    pub rate: Decimal,
    pub source: TariffSource,
    pub confidence: Confidence,
    /// Deepest hierarchy level the code matched, if any
    pub matched_level: Option<TariffLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl TariffResolution {
    pub fn is_classified(&self) -> bool {
        self.source != TariffSource::CountryDefault
    }
}

/// One entry of a classification path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffPathEntry {
    pub level: TariffLevel,
    pub code: String,
    pub description: String,
}
