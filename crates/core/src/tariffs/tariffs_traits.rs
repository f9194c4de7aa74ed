use super::tariffs_model::{
    CountryRateOverride, CountryTariffProfile, TariffChapter, TariffFullCode, TariffHeading,
    TariffSubheading,
};
use crate::errors::Result;

/// Read-only source of the tariff hierarchy and country profiles.
///
/// Implementations are read exactly once per snapshot build.
pub trait TariffDatasetProvider: Send + Sync {
    fn chapters(&self) -> Result<Vec<TariffChapter>>;
    fn headings(&self) -> Result<Vec<TariffHeading>>;
    fn subheadings(&self) -> Result<Vec<TariffSubheading>>;
    fn full_codes(&self) -> Result<Vec<TariffFullCode>>;
    fn country_profiles(&self) -> Result<Vec<CountryTariffProfile>>;
    fn country_overrides(&self) -> Result<Vec<CountryRateOverride>>;
}
