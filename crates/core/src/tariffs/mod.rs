//! Tariffs module - classification hierarchy, country profiles and duty
//! resolution.

mod tariff_resolver;
mod tariff_table;
mod tariffs_model;
mod tariffs_traits;


pub use tariff_resolver::TariffResolver;
pub use tariff_table::{normalize_code, normalize_country, CodeMatch, TariffTable};
pub use tariffs_model::{
    Confidence, CountryRateOverride, CountryTariffProfile, TariffChapter, TariffFullCode,
    TariffHeading, TariffLevel, TariffPathEntry, TariffResolution, TariffSource, TariffSubheading,
};
pub use tariffs_traits::TariffDatasetProvider;
