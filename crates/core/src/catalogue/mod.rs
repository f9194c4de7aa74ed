//! Catalogue module - caller-owned item and channel inputs.

mod catalogue_model;

pub use catalogue_model::{CatalogueItem, ChannelContext, Dimensions, ItemCondition};
