//! Indexed, validated tariff hierarchy.
//!
//! Each level of the hierarchy is stored in its own map keyed by that level's
//! code, so resolving a full code takes at most four key lookups. The builder
//! rejects any code whose parent level is missing, which is what lets the
//! lookup walk fail closed on the first miss.

use std::collections::HashMap;

use log::debug;
use rust_decimal::Decimal;

use crate::constants::{
    CHAPTER_DIGITS, HEADING_DIGITS, MAX_FULL_CODE_DIGITS, MIN_FULL_CODE_DIGITS, SUBHEADING_DIGITS,
};
use crate::errors::{DatasetError, Result, ValidationError};

use super::tariffs_model::{
    CountryRateOverride, CountryTariffProfile, TariffChapter, TariffFullCode, TariffHeading,
    TariffLevel, TariffPathEntry, TariffSubheading,
};
use super::tariffs_traits::TariffDatasetProvider;

/// Strips separators from a classification code ("8471.30.0100" -> "8471300100").
///
/// Returns `None` unless the result is 2 to 10 ASCII digits.
pub fn normalize_code(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | '-'))
        .collect();
    let valid_length = (CHAPTER_DIGITS..=MAX_FULL_CODE_DIGITS).contains(&digits.len());
    if valid_length && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// The levels a code walked through before the first miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeMatch<'a> {
    pub chapter: Option<&'a TariffChapter>,
    pub heading: Option<&'a TariffHeading>,
    pub subheading: Option<&'a TariffSubheading>,
    pub full_code: Option<&'a TariffFullCode>,
}

impl<'a> CodeMatch<'a> {
    pub fn deepest_level(&self) -> Option<TariffLevel> {
        if self.full_code.is_some() {
            Some(TariffLevel::FullCode)
        } else if self.subheading.is_some() {
            Some(TariffLevel::Subheading)
        } else if self.heading.is_some() {
            Some(TariffLevel::Heading)
        } else if self.chapter.is_some() {
            Some(TariffLevel::Chapter)
        } else {
            None
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.chapter.map(|c| c.is_excluded).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TariffTable {
    chapters: HashMap<String, TariffChapter>,
    headings: HashMap<String, TariffHeading>,
    subheadings: HashMap<String, TariffSubheading>,
    full_codes: HashMap<String, TariffFullCode>,
    profiles: HashMap<String, CountryTariffProfile>,
    /// (full code, country) -> rate
    overrides: HashMap<(String, String), Decimal>,
}

impl TariffTable {
    /// Reads every collection from the provider once and builds the index.
    pub fn from_provider(provider: &dyn TariffDatasetProvider) -> Result<Self> {
        Self::new(
            provider.chapters()?,
            provider.headings()?,
            provider.subheadings()?,
            provider.full_codes()?,
            provider.country_profiles()?,
            provider.country_overrides()?,
        )
    }

    pub fn new(
        chapters: Vec<TariffChapter>,
        headings: Vec<TariffHeading>,
        subheadings: Vec<TariffSubheading>,
        full_codes: Vec<TariffFullCode>,
        profiles: Vec<CountryTariffProfile>,
        overrides: Vec<CountryRateOverride>,
    ) -> Result<Self> {
        let mut table = TariffTable::default();

        for mut chapter in chapters {
            chapter.code = level_code(&chapter.code, CHAPTER_DIGITS, CHAPTER_DIGITS)?;
            insert_unique(&mut table.chapters, chapter.code.clone(), chapter)?;
        }

        for mut heading in headings {
            heading.code = level_code(&heading.code, HEADING_DIGITS, HEADING_DIGITS)?;
            require_parent(&table.chapters, &heading.code, CHAPTER_DIGITS)?;
            insert_unique(&mut table.headings, heading.code.clone(), heading)?;
        }

        for mut subheading in subheadings {
            subheading.code = level_code(&subheading.code, SUBHEADING_DIGITS, SUBHEADING_DIGITS)?;
            require_parent(&table.headings, &subheading.code, HEADING_DIGITS)?;
            insert_unique(&mut table.subheadings, subheading.code.clone(), subheading)?;
        }

        for mut full_code in full_codes {
            full_code.code = level_code(&full_code.code, MIN_FULL_CODE_DIGITS, MAX_FULL_CODE_DIGITS)?;
            require_parent(&table.subheadings, &full_code.code, SUBHEADING_DIGITS)?;
            let negative_rate = full_code.general_rate < Decimal::ZERO
                || full_code.special_rates.values().any(|r| *r < Decimal::ZERO);
            if negative_rate {
                return Err(DatasetError::TariffHierarchy {
                    code: full_code.code,
                    message: "duty rates must not be negative".to_string(),
                }
                .into());
            }
            insert_unique(&mut table.full_codes, full_code.code.clone(), full_code)?;
        }

        for mut profile in profiles {
            profile.country = normalize_country(&profile.country);
            if let Some(component) = profile.negative_component() {
                return Err(DatasetError::NegativeRate {
                    country: profile.country,
                    component: component.to_string(),
                }
                .into());
            }
            if table.profiles.contains_key(&profile.country) {
                return Err(DatasetError::InvalidValue(format!(
                    "duplicate country profile '{}'",
                    profile.country
                ))
                .into());
            }
            table.profiles.insert(profile.country.clone(), profile);
        }

        for entry in overrides {
            let code = normalize_code(&entry.code)
                .filter(|c| table.full_codes.contains_key(c))
                .ok_or_else(|| DatasetError::TariffHierarchy {
                    code: entry.code.clone(),
                    message: "country override references an unknown full code".to_string(),
                })?;
            if entry.rate < Decimal::ZERO {
                return Err(DatasetError::NegativeRate {
                    country: entry.country,
                    component: format!("override for {}", code),
                }
                .into());
            }
            table
                .overrides
                .insert((code, normalize_country(&entry.country)), entry.rate);
        }

        debug!(
            "Built tariff table: {} chapters, {} headings, {} subheadings, {} full codes, {} countries, {} overrides",
            table.chapters.len(),
            table.headings.len(),
            table.subheadings.len(),
            table.full_codes.len(),
            table.profiles.len(),
            table.overrides.len()
        );

        Ok(table)
    }

    /// Walks chapter -> heading -> subheading -> full code, stopping at the
    /// first level that does not exist. `code` must already be normalised.
    pub fn lookup(&self, code: &str) -> CodeMatch<'_> {
        let mut matched = CodeMatch::default();

        matched.chapter = prefix(code, CHAPTER_DIGITS).and_then(|c| self.chapters.get(c));
        if matched.chapter.is_none() {
            return matched;
        }
        matched.heading = prefix(code, HEADING_DIGITS).and_then(|c| self.headings.get(c));
        if matched.heading.is_none() {
            return matched;
        }
        matched.subheading = prefix(code, SUBHEADING_DIGITS).and_then(|c| self.subheadings.get(c));
        if matched.subheading.is_none() {
            return matched;
        }
        if code.len() >= MIN_FULL_CODE_DIGITS {
            matched.full_code = self.full_codes.get(code);
        }
        matched
    }

    pub fn profile(&self, country: &str) -> Option<&CountryTariffProfile> {
        self.profiles.get(country)
    }

    pub fn override_rate(&self, code: &str, country: &str) -> Option<Decimal> {
        self.overrides
            .get(&(code.to_string(), country.to_string()))
            .copied()
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.profiles.contains_key(country)
    }

    /// Returns the classification path for a code, from chapter down to the
    /// deepest level that exists.
    pub fn describe(&self, raw_code: &str) -> Result<Vec<TariffPathEntry>> {
        let code = normalize_code(raw_code)
            .ok_or_else(|| ValidationError::MalformedCode(raw_code.to_string()))?;
        let matched = self.lookup(&code);

        let mut path = Vec::with_capacity(4);
        if let Some(chapter) = matched.chapter {
            path.push(entry(TariffLevel::Chapter, &chapter.code, &chapter.description));
        }
        if let Some(heading) = matched.heading {
            path.push(entry(TariffLevel::Heading, &heading.code, &heading.description));
        }
        if let Some(subheading) = matched.subheading {
            path.push(entry(
                TariffLevel::Subheading,
                &subheading.code,
                &subheading.description,
            ));
        }
        if let Some(full_code) = matched.full_code {
            path.push(entry(
                TariffLevel::FullCode,
                &full_code.code,
                &full_code.description,
            ));
        }
        Ok(path)
    }

    pub fn full_code_count(&self) -> usize {
        self.full_codes.len()
    }

    pub fn country_count(&self) -> usize {
        self.profiles.len()
    }
}

fn prefix(code: &str, digits: usize) -> Option<&str> {
    code.get(..digits)
}

fn entry(level: TariffLevel, code: &str, description: &str) -> TariffPathEntry {
    TariffPathEntry {
        level,
        code: code.to_string(),
        description: description.to_string(),
    }
}

fn level_code(raw: &str, min_digits: usize, max_digits: usize) -> Result<String> {
    normalize_code(raw)
        .filter(|c| (min_digits..=max_digits).contains(&c.len()))
        .ok_or_else(|| {
            DatasetError::TariffHierarchy {
                code: raw.to_string(),
                message: format!("expected {} to {} digits", min_digits, max_digits),
            }
            .into()
        })
}

fn require_parent<T>(parents: &HashMap<String, T>, code: &str, parent_digits: usize) -> Result<()> {
    let parent = &code[..parent_digits];
    if parents.contains_key(parent) {
        Ok(())
    } else {
        Err(DatasetError::TariffHierarchy {
            code: code.to_string(),
            message: format!("parent code '{}' does not exist", parent),
        }
        .into())
    }
}

fn insert_unique<T>(map: &mut HashMap<String, T>, code: String, value: T) -> Result<()> {
    if map.contains_key(&code) {
        return Err(DatasetError::DuplicateCode(code).into());
    }
    map.insert(code, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn chapter(code: &str, excluded: bool) -> TariffChapter {
        TariffChapter {
            code: code.to_string(),
            description: format!("Chapter {}", code),
            is_excluded: excluded,
        }
    }

    fn heading(code: &str) -> TariffHeading {
        TariffHeading {
            code: code.to_string(),
            description: format!("Heading {}", code),
        }
    }

    fn subheading(code: &str) -> TariffSubheading {
        TariffSubheading {
            code: code.to_string(),
            description: format!("Subheading {}", code),
        }
    }

    fn full(code: &str, rate: Decimal) -> TariffFullCode {
        TariffFullCode {
            code: code.to_string(),
            description: format!("Full {}", code),
            general_rate: rate,
            special_rates: BTreeMap::new(),
        }
    }

    fn table() -> TariffTable {
        TariffTable::new(
            vec![chapter("85", false), chapter("93", true)],
            vec![heading("8517"), heading("9302")],
            vec![subheading("851762"), subheading("930200")],
            vec![full("8517.62.0090", dec!(0.0)), full("9302000000", dec!(0.02))],
            vec![CountryTariffProfile::new("cn", dec!(0.10))],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("8517.62.0090"), Some("8517620090".to_string()));
        assert_eq!(normalize_code("85 17-62"), Some("851762".to_string()));
        assert_eq!(normalize_code("8"), None);
        assert_eq!(normalize_code("85AB"), None);
        assert_eq!(normalize_code("12345678901"), None);
    }

    #[test]
    fn test_lookup_walks_all_levels() {
        let table = table();
        let matched = table.lookup("8517620090");
        assert_eq!(matched.deepest_level(), Some(TariffLevel::FullCode));
        assert!(!matched.is_excluded());
    }

    #[test]
    fn test_lookup_fails_closed_on_missing_heading() {
        let table = table();
        // Chapter 85 exists but heading 8518 does not; the full code must not match
        let matched = table.lookup("8518620090");
        assert_eq!(matched.deepest_level(), Some(TariffLevel::Chapter));
        assert!(matched.full_code.is_none());
    }

    #[test]
    fn test_lookup_partial_code() {
        let table = table();
        assert_eq!(
            table.lookup("851762").deepest_level(),
            Some(TariffLevel::Subheading)
        );
        assert_eq!(table.lookup("99").deepest_level(), None);
    }

    #[test]
    fn test_countries_are_normalised() {
        let table = table();
        assert!(table.has_country("CN"));
        assert_eq!(table.country_count(), 1);
    }

    #[test]
    fn test_rejects_orphan_full_code() {
        let result = TariffTable::new(
            vec![chapter("85", false)],
            vec![heading("8517")],
            vec![subheading("851762")],
            vec![full("8517630000", dec!(0.01))],
            vec![],
            vec![],
        );
        assert!(matches!(
            result,
            Err(Error::Dataset(DatasetError::TariffHierarchy { .. }))
        ));
    }

    #[test]
    fn test_rejects_duplicate_codes() {
        let result = TariffTable::new(
            vec![chapter("85", false), chapter("85", true)],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(
            result.unwrap_err(),
            Error::Dataset(DatasetError::DuplicateCode("85".to_string()))
        );
    }

    #[test]
    fn test_rejects_override_for_unknown_code() {
        let result = TariffTable::new(
            vec![chapter("85", false)],
            vec![],
            vec![],
            vec![],
            vec![CountryTariffProfile::new("CN", dec!(0.1))],
            vec![CountryRateOverride {
                code: "8517620090".to_string(),
                country: "CN".to_string(),
                rate: dec!(0.25),
            }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_returns_path() {
        let table = table();
        let path = table.describe("8517.62.0090").unwrap();
        let levels: Vec<TariffLevel> = path.iter().map(|p| p.level).collect();
        assert_eq!(
            levels,
            vec![
                TariffLevel::Chapter,
                TariffLevel::Heading,
                TariffLevel::Subheading,
                TariffLevel::FullCode
            ]
        );
        assert_eq!(path[3].code, "8517620090");
        assert!(table.describe("not-a-code").is_err());
    }
}
