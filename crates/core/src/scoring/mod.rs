//! Scoring module - arbitrage scoring of sourcing candidates and review-queue
//! ordering.

mod arbitrage_scorer;
mod priority_scorer;
mod scoring_model;
mod signal_builder;

pub use arbitrage_scorer::ArbitrageScorer;
pub use priority_scorer::PriorityScorer;
pub use scoring_model::{
    AdjustmentKind, ArbitrageScore, Assessment, PricePoint, PriorityEntry, ScoreAdjustment,
    ScoreSignal, ScoringConfig, SignalConfig, SignalInputs,
};
pub use signal_builder::SignalBuilder;
