//! Shipping domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DDP_MAX_PRICE, DEFAULT_DDP_MIN_PRICE};
use crate::errors::{checked, Result, ValidationError};

/// Whether import duty is paid by the seller upfront (DDP) or by the buyer on
/// delivery (DDU).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyBasis {
    DutyPrepaid,
    DutyUnpaid,
}

impl PolicyBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyBasis::DutyPrepaid => "DUTY_PREPAID",
            PolicyBasis::DutyUnpaid => "DUTY_UNPAID",
        }
    }
}

impl std::fmt::Display for PolicyBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price window in which shipments go duty-prepaid. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyPolicy {
    pub ddp_min_price: Decimal,
    pub ddp_max_price: Decimal,
}

impl Default for DutyPolicy {
    fn default() -> Self {
        Self {
            ddp_min_price: DEFAULT_DDP_MIN_PRICE,
            ddp_max_price: DEFAULT_DDP_MAX_PRICE,
        }
    }
}

impl DutyPolicy {
    pub fn basis_for(&self, item_price: Decimal) -> PolicyBasis {
        if item_price >= self.ddp_min_price && item_price <= self.ddp_max_price {
            PolicyBasis::DutyPrepaid
        } else {
            PolicyBasis::DutyUnpaid
        }
    }
}

/// A weight range in kilograms, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightBand {
    pub index: u32,
    pub min_weight: Decimal,
    pub max_weight: Decimal,
}

/// A named item-price range used by duty-prepaid shipments, inclusive on both
/// ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBand {
    pub index: u32,
    /// Display label, e.g. "<=250"
    pub label: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

/// Common view over weight and price bands.
pub trait Band {
    fn index(&self) -> u32;
    fn lower(&self) -> Decimal;
    fn upper(&self) -> Decimal;
}

impl Band for WeightBand {
    fn index(&self) -> u32 {
        self.index
    }
    fn lower(&self) -> Decimal {
        self.min_weight
    }
    fn upper(&self) -> Decimal {
        self.max_weight
    }
}

impl Band for PriceBand {
    fn index(&self) -> u32 {
        self.index
    }
    fn lower(&self) -> Decimal {
        self.min_price
    }
    fn upper(&self) -> Decimal {
        self.max_price
    }
}

/// One rate cell keyed by (weight band, price band, zone, basis).
///
/// Duty-unpaid cells carry no price band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRateCell {
    pub weight_band: u32,
    #[serde(default)]
    pub price_band: Option<u32>,
    pub zone: String,
    pub basis: PolicyBasis,
    pub first_unit_rate: Decimal,
    pub additional_unit_rate: Decimal,
    #[serde(default)]
    pub handling_fee: Decimal,
}

/// The resolved rate cell for one shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub zone: String,
    pub policy_basis: PolicyBasis,
    pub weight_band: u32,
    pub price_band: Option<u32>,
    pub price_band_label: Option<String>,
    pub first_unit_rate: Decimal,
    pub additional_unit_rate: Decimal,
    pub handling_fee: Decimal,
}

impl ShippingQuote {
    /// Shipping for `units` units: first unit rate plus the additional rate
    /// for every further unit. Zero units is invalid.
    pub fn total_for_units(&self, units: u32) -> Result<Decimal> {
        if units == 0 {
            return Err(ValidationError::ZeroUnits.into());
        }
        let additional = self
            .additional_unit_rate
            .checked_mul(Decimal::from(units - 1))
            .and_then(|a| a.checked_add(self.first_unit_rate));
        checked(additional, "shipping total")
    }

    /// Shipping total plus the handling fee; the per-shipment figure used in
    /// landed cost.
    pub fn landed_shipping(&self, units: u32) -> Result<Decimal> {
        checked(
            self.total_for_units(units)?.checked_add(self.handling_fee),
            "landed shipping",
        )
    }

    /// True when both quotes come from the same rate cell.
    pub fn same_cell(&self, other: &ShippingQuote) -> bool {
        self.policy_basis == other.policy_basis
            && self.weight_band == other.weight_band
            && self.price_band == other.price_band
            && self.zone == other.zone
    }
}
