use super::shipping_model::{PriceBand, ShippingRateCell, WeightBand};
use crate::errors::Result;

/// Read-only source of shipping bands and rate cells.
pub trait ShippingDatasetProvider: Send + Sync {
    fn weight_bands(&self) -> Result<Vec<WeightBand>>;
    fn price_bands(&self) -> Result<Vec<PriceBand>>;
    fn rate_cells(&self) -> Result<Vec<ShippingRateCell>>;
}
