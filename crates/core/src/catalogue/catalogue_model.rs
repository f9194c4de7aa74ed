//! Catalogue domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{checked, Result, ValidationError};

/// Physical condition of a sourced item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCondition {
    #[default]
    New,
    Used,
    Refurbished,
}

/// Package dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

impl Dimensions {
    pub fn volume(&self) -> Result<Decimal> {
        checked(
            self.length
                .checked_mul(self.width)
                .and_then(|area| area.checked_mul(self.height)),
            "volume",
        )
    }
}

/// A sourced product as persisted by the caller. Immutable input to every
/// calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueItem {
    pub id: String,
    /// Cost in the source currency
    pub cost: Decimal,
    /// Weight in kilograms
    pub weight: Decimal,
    #[serde(default)]
    pub dimensions: Dimensions,
    pub category: String,
    /// ISO 3166-1 alpha-2 origin country
    pub origin_country: String,
    /// Tariff classification code, if known
    #[serde(default)]
    pub classification_code: Option<String>,
    #[serde(default)]
    pub condition: ItemCondition,
}

impl CatalogueItem {
    /// Validates the numeric fields the cost model depends on.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if self.cost.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "cost of item {} is negative",
                self.id
            ))
            .into());
        }
        if self.weight <= Decimal::ZERO {
            return Err(ValidationError::not_positive("weight", self.weight).into());
        }
        if self.origin_country.trim().is_empty() {
            return Err(ValidationError::MissingField("originCountry".to_string()).into());
        }
        Ok(())
    }
}

/// Where and how an item is going to be sold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContext {
    /// Sales channel identifier (e.g. "ebay", "amazon_us")
    pub channel: String,
    /// Seller account on that channel
    #[serde(default)]
    pub account: Option<String>,
    /// Destination shipping zone (e.g. "US")
    pub destination_zone: String,
}

impl ChannelContext {
    pub fn new(channel: impl Into<String>, destination_zone: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            account: None,
            destination_zone: destination_zone.into(),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }
}
