//! Core error types for the landed pricing engine.
//!
//! Per-item errors (unknown country, missing shipping band, infeasible margin)
//! are reported inside batch results and never abort sibling items. Dataset
//! errors are raised once, when a snapshot is built.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shipping::PolicyBasis;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pricing engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No tariff data exists for origin country '{0}'")]
    UnknownOriginCountry(String),

    #[error("No {dimension} band matches {value} for zone {zone} ({basis})")]
    NoMatchingBand {
        dimension: BandDimension,
        value: Decimal,
        zone: String,
        basis: PolicyBasis,
    },

    #[error("Target margin {target_margin} is unreachable with a percentage fee rate of {fee_rate}")]
    InfeasibleMargin {
        target_margin: Decimal,
        fee_rate: Decimal,
    },

    #[error("No fee schedule available for channel '{0}'")]
    FeeScheduleUnavailable(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Stable machine-readable kind, used in batch reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownOriginCountry(_) => ErrorKind::UnknownOriginCountry,
            Error::NoMatchingBand { .. } => ErrorKind::NoMatchingBand,
            Error::InfeasibleMargin { .. } => ErrorKind::InfeasibleMargin,
            Error::FeeScheduleUnavailable(_) => ErrorKind::FeeScheduleUnavailable,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Dataset(_) => ErrorKind::Dataset,
            Error::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn no_matching_band(
        dimension: BandDimension,
        value: Decimal,
        zone: impl Into<String>,
        basis: PolicyBasis,
    ) -> Self {
        Error::NoMatchingBand {
            dimension,
            value,
            zone: zone.into(),
            basis,
        }
    }
}

/// Which band table failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandDimension {
    Weight,
    Price,
    Cell,
}

impl std::fmt::Display for BandDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BandDimension::Weight => "weight",
            BandDimension::Price => "price",
            BandDimension::Cell => "rate cell",
        };
        write!(f, "{}", label)
    }
}

/// Machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnknownOriginCountry,
    NoMatchingBand,
    InfeasibleMargin,
    FeeScheduleUnavailable,
    Validation,
    Dataset,
    Unexpected,
}

/// Validation errors for caller-supplied inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("'{field}' must be positive, got {value}")]
    NotPositive { field: String, value: Decimal },

    #[error("Unit count must be at least 1")]
    ZeroUnits,

    #[error("Malformed classification code '{0}'")]
    MalformedCode(String),

    #[error("{0} exceeds the representable decimal range")]
    Overflow(String),
}

impl ValidationError {
    pub fn not_positive(field: impl Into<String>, value: Decimal) -> Self {
        ValidationError::NotPositive {
            field: field.into(),
            value,
        }
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        ValidationError::Overflow(what.into())
    }
}

/// Unwraps a checked `Decimal` operation, mapping overflow to a per-item
/// validation error naming the quantity being computed.
pub(crate) fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| ValidationError::overflow(what).into())
}

/// Errors raised while building a dataset snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("{table} bands are not contiguous: {message}")]
    BandPartition { table: String, message: String },

    #[error("Duplicate rate cell: {0}")]
    DuplicateCell(String),

    #[error("Rate cell {cell} references unknown {dimension} band {index}")]
    DanglingBand {
        cell: String,
        dimension: BandDimension,
        index: u32,
    },

    #[error("Tariff code '{code}' is inconsistent with its parent: {message}")]
    TariffHierarchy { code: String, message: String },

    #[error("Duplicate tariff code '{0}'")]
    DuplicateCode(String),

    #[error("Country profile '{country}' has a negative component: {component}")]
    NegativeRate { country: String, component: String },

    #[error("Pricing rules must contain exactly one default rule, found {0}")]
    DefaultRule(usize),

    #[error("Duplicate pricing rule id '{0}'")]
    DuplicateRule(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Dataset(DatasetError::InvalidValue(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownOriginCountry("ZZ".to_string());
        assert_eq!(err.to_string(), "No tariff data exists for origin country 'ZZ'");

        let err = Error::no_matching_band(
            BandDimension::Weight,
            dec!(1.2),
            "US",
            PolicyBasis::DutyPrepaid,
        );
        assert_eq!(
            err.to_string(),
            "No weight band matches 1.2 for zone US (DUTY_PREPAID)"
        );

        let err = Error::from(ValidationError::overflow("required price"));
        assert_eq!(
            err.to_string(),
            "Input validation failed: required price exceeds the representable decimal range"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = Error::from(ValidationError::ZeroUnits);
        assert_eq!(
            err.to_string(),
            "Input validation failed: Unit count must be at least 1"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::FeeScheduleUnavailable("ebay".into()).kind(),
            ErrorKind::FeeScheduleUnavailable
        );
        assert_eq!(
            Error::InfeasibleMargin {
                target_margin: dec!(0.9),
                fee_rate: dec!(0.13)
            }
            .kind(),
            ErrorKind::InfeasibleMargin
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::NoMatchingBand).unwrap(),
            "\"NO_MATCHING_BAND\""
        );
    }
}
