//! Shipping module - band tables, duty policy basis and rate resolution.

mod rate_table;
mod shipping_model;
mod shipping_resolver;
mod shipping_traits;

pub use rate_table::{normalize_zone, BandIndex, ShippingRateTable};
pub use shipping_model::{
    Band, DutyPolicy, PolicyBasis, PriceBand, ShippingQuote, ShippingRateCell, WeightBand,
};
pub use shipping_resolver::ShippingRateResolver;
pub use shipping_traits::ShippingDatasetProvider;
