//! Validated band tables and rate cells.
//!
//! Bands in a table must be contiguous: each band starts exactly where the
//! previous one ends. Both ends are inclusive, so a value sitting on a shared
//! boundary belongs to the lower band.

use std::collections::{HashMap, HashSet};

use log::debug;
use rust_decimal::Decimal;

use crate::errors::{BandDimension, DatasetError, Result};

use super::shipping_model::{Band, PolicyBasis, PriceBand, ShippingRateCell, WeightBand};
use super::shipping_traits::ShippingDatasetProvider;

/// Sorted, partition-checked band list with binary-search lookup.
#[derive(Debug, Clone)]
pub struct BandIndex<B: Band> {
    bands: Vec<B>,
}

impl<B: Band> BandIndex<B> {
    pub fn new(table: &str, mut bands: Vec<B>) -> Result<Self> {
        bands.sort_by(|a, b| a.lower().cmp(&b.lower()));

        let mut seen = HashSet::new();
        for band in &bands {
            if !seen.insert(band.index()) {
                return Err(partition_error(
                    table,
                    format!("band index {} is declared twice", band.index()),
                ));
            }
            if band.lower() < Decimal::ZERO || band.lower() >= band.upper() {
                return Err(partition_error(
                    table,
                    format!(
                        "band {} has an empty or negative range [{}, {}]",
                        band.index(),
                        band.lower(),
                        band.upper()
                    ),
                ));
            }
        }

        for pair in bands.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.lower() > prev.upper() {
                return Err(partition_error(
                    table,
                    format!(
                        "gap between band {} (ends {}) and band {} (starts {})",
                        prev.index(),
                        prev.upper(),
                        next.index(),
                        next.lower()
                    ),
                ));
            }
            if next.lower() < prev.upper() {
                return Err(partition_error(
                    table,
                    format!(
                        "band {} overlaps band {} ({} < {})",
                        next.index(),
                        prev.index(),
                        next.lower(),
                        prev.upper()
                    ),
                ));
            }
        }

        Ok(Self { bands })
    }

    /// Finds the band containing `value`. On a shared boundary the lower band
    /// wins.
    pub fn find(&self, value: Decimal) -> Option<&B> {
        let position = self.bands.partition_point(|b| b.upper() < value);
        self.bands
            .get(position)
            .filter(|b| b.lower() <= value && value <= b.upper())
    }

    pub fn get(&self, index: u32) -> Option<&B> {
        self.bands.iter().find(|b| b.index() == index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

fn partition_error(table: &str, message: String) -> crate::errors::Error {
    DatasetError::BandPartition {
        table: table.to_string(),
        message,
    }
    .into()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellKey {
    weight_band: u32,
    price_band: Option<u32>,
    zone: String,
    basis: PolicyBasis,
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "weight band {} / price band {} / {} / {}",
            self.weight_band,
            self.price_band
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.zone,
            self.basis
        )
    }
}

pub fn normalize_zone(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone)]
pub struct ShippingRateTable {
    weight_bands: BandIndex<WeightBand>,
    price_bands: BandIndex<PriceBand>,
    cells: HashMap<CellKey, ShippingRateCell>,
}

impl ShippingRateTable {
    pub fn from_provider(provider: &dyn ShippingDatasetProvider) -> Result<Self> {
        Self::new(
            provider.weight_bands()?,
            provider.price_bands()?,
            provider.rate_cells()?,
        )
    }

    pub fn new(
        weight_bands: Vec<WeightBand>,
        price_bands: Vec<PriceBand>,
        cells: Vec<ShippingRateCell>,
    ) -> Result<Self> {
        let weight_bands = BandIndex::new("weight", weight_bands)?;
        let price_bands = BandIndex::new("price", price_bands)?;
        let mut indexed = HashMap::with_capacity(cells.len());

        for mut cell in cells {
            cell.zone = normalize_zone(&cell.zone);
            let key = CellKey {
                weight_band: cell.weight_band,
                price_band: cell.price_band,
                zone: cell.zone.clone(),
                basis: cell.basis,
            };

            if weight_bands.get(cell.weight_band).is_none() {
                return Err(DatasetError::DanglingBand {
                    cell: key.to_string(),
                    dimension: BandDimension::Weight,
                    index: cell.weight_band,
                }
                .into());
            }
            match (cell.basis, cell.price_band) {
                (PolicyBasis::DutyPrepaid, Some(index)) => {
                    if price_bands.get(index).is_none() {
                        return Err(DatasetError::DanglingBand {
                            cell: key.to_string(),
                            dimension: BandDimension::Price,
                            index,
                        }
                        .into());
                    }
                }
                (PolicyBasis::DutyPrepaid, None) => {
                    return Err(DatasetError::InvalidValue(format!(
                        "duty-prepaid cell {} has no price band",
                        key
                    ))
                    .into());
                }
                (PolicyBasis::DutyUnpaid, Some(_)) => {
                    return Err(DatasetError::InvalidValue(format!(
                        "duty-unpaid cell {} must not declare a price band",
                        key
                    ))
                    .into());
                }
                (PolicyBasis::DutyUnpaid, None) => {}
            }
            let negative = cell.first_unit_rate < Decimal::ZERO
                || cell.additional_unit_rate < Decimal::ZERO
                || cell.handling_fee < Decimal::ZERO;
            if negative {
                return Err(DatasetError::InvalidValue(format!(
                    "cell {} has a negative rate",
                    key
                ))
                .into());
            }
            if indexed.contains_key(&key) {
                return Err(DatasetError::DuplicateCell(key.to_string()).into());
            }
            indexed.insert(key, cell);
        }

        debug!(
            "Built shipping table: {} weight bands, {} price bands, {} cells",
            weight_bands.len(),
            price_bands.len(),
            indexed.len()
        );

        Ok(Self {
            weight_bands,
            price_bands,
            cells: indexed,
        })
    }

    pub fn weight_band(&self, weight: Decimal) -> Option<&WeightBand> {
        self.weight_bands.find(weight)
    }

    pub fn price_band(&self, price: Decimal) -> Option<&PriceBand> {
        self.price_bands.find(price)
    }

    pub fn price_bands(&self) -> impl Iterator<Item = &PriceBand> {
        self.price_bands.iter()
    }

    pub fn cell(
        &self,
        weight_band: u32,
        price_band: Option<u32>,
        zone: &str,
        basis: PolicyBasis,
    ) -> Option<&ShippingRateCell> {
        self.cells.get(&CellKey {
            weight_band,
            price_band,
            zone: zone.to_string(),
            basis,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    fn weight(index: u32, min: Decimal, max: Decimal) -> WeightBand {
        WeightBand {
            index,
            min_weight: min,
            max_weight: max,
        }
    }

    #[test]
    fn test_band_lookup_boundaries_resolve_to_lower_band() {
        let index = BandIndex::new(
            "weight",
            vec![
                weight(1, dec!(0.5), dec!(1.0)),
                weight(0, dec!(0), dec!(0.5)),
                weight(2, dec!(1.0), dec!(2.0)),
            ],
        )
        .unwrap();

        assert_eq!(index.find(dec!(0)).map(|b| b.index), Some(0));
        assert_eq!(index.find(dec!(0.5)).map(|b| b.index), Some(0));
        assert_eq!(index.find(dec!(0.5001)).map(|b| b.index), Some(1));
        assert_eq!(index.find(dec!(1.0)).map(|b| b.index), Some(1));
        assert_eq!(index.find(dec!(2.0)).map(|b| b.index), Some(2));
        assert_eq!(index.find(dec!(2.01)).map(|b| b.index), None);
    }

    #[test]
    fn test_band_lookup_below_first_band() {
        let index = BandIndex::new("weight", vec![weight(0, dec!(0.1), dec!(1))]).unwrap();
        assert!(index.find(dec!(0.05)).is_none());
    }

    #[test]
    fn test_rejects_gap() {
        let result = BandIndex::new(
            "weight",
            vec![weight(0, dec!(0), dec!(0.5)), weight(1, dec!(0.51), dec!(1))],
        );
        assert!(matches!(
            result,
            Err(Error::Dataset(DatasetError::BandPartition { .. }))
        ));
    }

    #[test]
    fn test_rejects_overlap() {
        let result = BandIndex::new(
            "weight",
            vec![weight(0, dec!(0), dec!(0.6)), weight(1, dec!(0.5), dec!(1))],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_index() {
        let result = BandIndex::new(
            "weight",
            vec![weight(0, dec!(0), dec!(0.5)), weight(0, dec!(0.5), dec!(1))],
        );
        assert!(result.is_err());
    }

    fn cell(weight_band: u32, price_band: Option<u32>, basis: PolicyBasis) -> ShippingRateCell {
        ShippingRateCell {
            weight_band,
            price_band,
            zone: "us".to_string(),
            basis,
            first_unit_rate: dec!(10),
            additional_unit_rate: dec!(4),
            handling_fee: dec!(1),
        }
    }

    #[test]
    fn test_table_rejects_inconsistent_cells() {
        let bands = || vec![weight(0, dec!(0), dec!(1))];

        let ddp_without_price = ShippingRateTable::new(
            bands(),
            vec![],
            vec![cell(0, None, PolicyBasis::DutyPrepaid)],
        );
        assert!(ddp_without_price.is_err());

        let dangling = ShippingRateTable::new(
            bands(),
            vec![],
            vec![cell(3, None, PolicyBasis::DutyUnpaid)],
        );
        assert!(matches!(
            dangling,
            Err(Error::Dataset(DatasetError::DanglingBand { .. }))
        ));

        let duplicate = ShippingRateTable::new(
            bands(),
            vec![],
            vec![
                cell(0, None, PolicyBasis::DutyUnpaid),
                cell(0, None, PolicyBasis::DutyUnpaid),
            ],
        );
        assert!(matches!(
            duplicate,
            Err(Error::Dataset(DatasetError::DuplicateCell(_)))
        ));
    }

    #[test]
    fn test_table_normalises_zone() {
        let table = ShippingRateTable::new(
            vec![weight(0, dec!(0), dec!(1))],
            vec![],
            vec![cell(0, None, PolicyBasis::DutyUnpaid)],
        )
        .unwrap();
        assert!(table.cell(0, None, "US", PolicyBasis::DutyUnpaid).is_some());
        assert_eq!(table.cell_count(), 1);
    }
}
