//! Landed Core - cross-border pricing, tariff resolution and arbitrage
//! scoring.
//!
//! The engine is a library: it computes against an immutable dataset
//! snapshot and returns values to a caller that owns persistence, fetching
//! and scheduling. Collaborator datasets are read through the provider traits
//! in each module; `snapshot::InMemoryDataset` implements all of them.

pub mod catalogue;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fees;
pub mod profit;
pub mod scoring;
pub mod shipping;
pub mod snapshot;
pub mod strategy;
pub mod tariffs;
pub mod warnings;

pub use engine::{BatchContext, BatchResult, EngineConfig, PricingEngine};
pub use snapshot::{EngineSnapshot, InMemoryDataset};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
