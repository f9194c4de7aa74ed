//! Duty-rate resolution for (origin country, classification code).
//!
//! Precedence, most specific first:
//! 1. By-country override for the exact (full code, origin) pair
//! 2. The full code's general rate (or a special program rate)
//! 3. The origin country's profile total (base + surcharges)
//!
//! An unknown origin country is the only hard failure. Unknown, malformed or
//! excluded classification codes degrade to the country default with a
//! `UnclassifiedItem` warning.

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::{Error, Result};
use crate::warnings::{UnclassifiedReason, Warning};

use super::tariff_table::{normalize_code, normalize_country, TariffTable};
use super::tariffs_model::{
    Confidence, CountryTariffProfile, TariffFullCode, TariffLevel, TariffResolution, TariffSource,
};

pub struct TariffResolver<'a> {
    table: &'a TariffTable,
}

impl<'a> TariffResolver<'a> {
    pub fn new(table: &'a TariffTable) -> Self {
        Self { table }
    }

    /// Resolves the duty rate using the full code's general rate.
    pub fn resolve(
        &self,
        origin_country: &str,
        classification_code: Option<&str>,
    ) -> Result<TariffResolution> {
        self.resolve_with(origin_country, classification_code, |full| {
            full.general_rate
        })
    }

    /// Resolves the duty rate using a special program rate when the full code
    /// defines one for `program`, falling back to its general rate.
    pub fn resolve_special(
        &self,
        origin_country: &str,
        classification_code: &str,
        program: &str,
    ) -> Result<TariffResolution> {
        self.resolve_with(origin_country, Some(classification_code), |full| {
            full.special_rates
                .get(program)
                .copied()
                .unwrap_or(full.general_rate)
        })
    }

    fn resolve_with<F>(
        &self,
        origin_country: &str,
        classification_code: Option<&str>,
        code_rate: F,
    ) -> Result<TariffResolution>
    where
        F: Fn(&TariffFullCode) -> Decimal,
    {
        let country = normalize_country(origin_country);
        let profile = self
            .table
            .profile(&country)
            .ok_or_else(|| Error::UnknownOriginCountry(country.clone()))?;

        let raw_code = match classification_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => raw,
            None => {
                debug!("No classification code for origin {}, using country default", country);
                return Ok(country_default(
                    profile,
                    None,
                    None,
                    UnclassifiedReason::NotProvided,
                ));
            }
        };

        let code = match normalize_code(raw_code) {
            Some(code) => code,
            None => {
                warn!("Malformed classification code '{}'", raw_code);
                return Ok(country_default(
                    profile,
                    Some(raw_code.to_string()),
                    None,
                    UnclassifiedReason::Malformed,
                ));
            }
        };

        let matched = self.table.lookup(&code);
        let matched_level = matched.deepest_level();

        if matched.is_excluded() {
            warn!(
                "Classification code {} falls in an excluded chapter, using country default for {}",
                code, country
            );
            return Ok(country_default(
                profile,
                Some(code),
                matched_level,
                UnclassifiedReason::ExcludedChapter,
            ));
        }

        let full_code = match matched.full_code {
            Some(full_code) => full_code,
            None => {
                warn!(
                    "Classification code {} did not resolve to a full code (deepest match: {:?})",
                    code, matched_level
                );
                return Ok(country_default(
                    profile,
                    Some(code),
                    matched_level,
                    UnclassifiedReason::UnknownCode,
                ));
            }
        };

        let (rate, source) = match self.table.override_rate(&code, &country) {
            Some(rate) => (rate, TariffSource::CountryOverride),
            None => (code_rate(full_code), TariffSource::CodeSpecific),
        };

        debug!("Resolved duty for {} from {}: {} ({})", code, country, rate, source);

        Ok(TariffResolution {
            origin_country: country,
            classification_code: Some(code),
            rate,
            source,
            confidence: Confidence::High,
            matched_level: Some(TariffLevel::FullCode),
            warnings: Vec::new(),
        })
    }
}

fn country_default(
    profile: &CountryTariffProfile,
    code: Option<String>,
    matched_level: Option<TariffLevel>,
    reason: UnclassifiedReason,
) -> TariffResolution {
    TariffResolution {
        origin_country: profile.country.clone(),
        classification_code: code.clone(),
        rate: profile.total_rate(),
        source: TariffSource::CountryDefault,
        confidence: Confidence::Low,
        matched_level,
        warnings: vec![Warning::UnclassifiedItem { code, reason }],
    }
}
