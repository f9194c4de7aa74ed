//! Engine module - the pricing facade, its configuration and batch reports.

mod batch;
mod engine_config;
mod engine_model;
mod pricing_engine;


pub use batch::{BatchContext, BatchError, BatchItem, BatchResult, ItemWarnings};
pub use engine_config::EngineConfig;
pub use engine_model::{
    BatchRequest, ForwardQuote, ForwardQuoteRequest, ItemQuote, ProfitRequest, QuoteRequest,
    RequiredPriceRequest, ScoringRequest, ShippingRequest, StrategyRequest, TariffRequest,
};
pub use pricing_engine::PricingEngine;
