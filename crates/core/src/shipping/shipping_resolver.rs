//! Shipping rate resolution from banded tables.
//!
//! The policy basis is chosen from the item price first. Duty-prepaid
//! shipments then select a price band; duty-unpaid shipments match on weight
//! and zone only. A missing band or cell is always an error, never a zero
//! rate.

use log::debug;
use rust_decimal::Decimal;

use crate::errors::{BandDimension, Error, Result, ValidationError};

use super::rate_table::{normalize_zone, ShippingRateTable};
use super::shipping_model::{DutyPolicy, PolicyBasis, PriceBand, ShippingQuote, WeightBand};

pub struct ShippingRateResolver<'a> {
    table: &'a ShippingRateTable,
    policy: DutyPolicy,
}

impl<'a> ShippingRateResolver<'a> {
    pub fn new(table: &'a ShippingRateTable, policy: DutyPolicy) -> Self {
        Self { table, policy }
    }

    pub fn policy(&self) -> &DutyPolicy {
        &self.policy
    }

    pub fn resolve(
        &self,
        weight: Decimal,
        item_price: Decimal,
        destination_zone: &str,
    ) -> Result<ShippingQuote> {
        if item_price <= Decimal::ZERO {
            return Err(ValidationError::not_positive("itemPrice", item_price).into());
        }
        let zone = normalize_zone(destination_zone);
        let basis = self.policy.basis_for(item_price);
        let weight_band = self.weight_band(weight, &zone, basis)?;

        let price_band = match basis {
            PolicyBasis::DutyPrepaid => Some(self.table.price_band(item_price).ok_or_else(|| {
                Error::no_matching_band(BandDimension::Price, item_price, zone.clone(), basis)
            })?),
            PolicyBasis::DutyUnpaid => None,
        };

        let quote = self.quote_for(weight, weight_band, price_band, &zone, basis)?;
        debug!(
            "Resolved shipping for {}kg at {} to {}: {} band {:?}",
            weight, item_price, zone, basis, quote.price_band_label
        );
        Ok(quote)
    }

    /// Every rate cell a shipment of `weight` to `destination_zone` could land
    /// in, whatever its price: the duty-unpaid cell plus one duty-prepaid cell
    /// per price band. Used to solve for a selling price when the price itself
    /// decides the cell.
    pub fn candidate_quotes(
        &self,
        weight: Decimal,
        destination_zone: &str,
    ) -> Result<Vec<ShippingQuote>> {
        let zone = normalize_zone(destination_zone);
        let weight_band = self.weight_band(weight, &zone, PolicyBasis::DutyUnpaid)?;

        let mut candidates = Vec::new();
        if let Ok(quote) =
            self.quote_for(weight, weight_band, None, &zone, PolicyBasis::DutyUnpaid)
        {
            candidates.push(quote);
        }
        for price_band in self.table.price_bands() {
            if let Ok(quote) =
                self.quote_for(weight, weight_band, Some(price_band), &zone, PolicyBasis::DutyPrepaid)
            {
                candidates.push(quote);
            }
        }

        if candidates.is_empty() {
            return Err(Error::no_matching_band(
                BandDimension::Cell,
                weight,
                zone,
                PolicyBasis::DutyUnpaid,
            ));
        }
        Ok(candidates)
    }

    fn weight_band(&self, weight: Decimal, zone: &str, basis: PolicyBasis) -> Result<&'a WeightBand> {
        if weight <= Decimal::ZERO {
            return Err(ValidationError::not_positive("weight", weight).into());
        }
        self.table
            .weight_band(weight)
            .ok_or_else(|| Error::no_matching_band(BandDimension::Weight, weight, zone, basis))
    }

    fn quote_for(
        &self,
        weight: Decimal,
        weight_band: &WeightBand,
        price_band: Option<&PriceBand>,
        zone: &str,
        basis: PolicyBasis,
    ) -> Result<ShippingQuote> {
        let cell = self
            .table
            .cell(weight_band.index, price_band.map(|b| b.index), zone, basis)
            .ok_or_else(|| {
                Error::no_matching_band(BandDimension::Cell, weight, zone, basis)
            })?;

        Ok(ShippingQuote {
            zone: cell.zone.clone(),
            policy_basis: basis,
            weight_band: weight_band.index,
            price_band: price_band.map(|b| b.index),
            price_band_label: price_band.map(|b| b.label.clone()),
            first_unit_rate: cell.first_unit_rate,
            additional_unit_rate: cell.additional_unit_rate,
            handling_fee: cell.handling_fee,
        })
    }
}
