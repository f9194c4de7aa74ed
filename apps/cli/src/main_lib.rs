use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use landed_core::engine::BatchRequest;
use landed_core::{BatchContext, EngineConfig, EngineSnapshot, InMemoryDataset, PricingEngine};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries the report.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_engine(config: &Config) -> anyhow::Result<(PricingEngine, InMemoryDataset)> {
    let engine_config = match &config.config_path {
        Some(path) => EngineConfig::from_json(&read(path)?)
            .with_context(|| format!("invalid engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let dataset = InMemoryDataset::from_json(&read(&config.dataset_path)?)
        .with_context(|| format!("invalid dataset {}", config.dataset_path.display()))?;
    let fallback_version = config
        .dataset_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unversioned".to_string());
    let snapshot = EngineSnapshot::from_dataset(&dataset, &fallback_version)?;

    Ok((PricingEngine::new(Arc::new(snapshot), engine_config), dataset))
}

pub fn load_request(path: &Path) -> anyhow::Result<BatchRequest> {
    serde_json::from_str(&read(path)?)
        .with_context(|| format!("invalid batch request {}", path.display()))
}

/// Runs one batch and returns its JSON report. Fee schedules for the batch
/// are fetched once, before any item is processed.
pub async fn run_batch(
    engine: &PricingEngine,
    dataset: &InMemoryDataset,
    request: BatchRequest,
) -> anyhow::Result<Value> {
    let context = BatchContext::prepare(&dataset.fee_provider(), request.channels()).await;

    let report = match request {
        BatchRequest::ResolveTariff(items) => {
            serde_json::to_value(engine.resolve_tariff_batch(&items))?
        }
        BatchRequest::ResolveShipping(items) => {
            serde_json::to_value(engine.resolve_shipping_batch(&items))?
        }
        BatchRequest::CalculateForwardProfit(items) => {
            serde_json::to_value(engine.calculate_forward_profit_batch(&items, &context))?
        }
        BatchRequest::CalculateRequiredPrice(items) => {
            serde_json::to_value(engine.calculate_required_price_batch(&items, &context))?
        }
        BatchRequest::ResolveStrategy(items) => {
            let (batch, groups) = engine.resolve_strategy_batch(&items);
            json!({ "batch": batch, "groups": groups })
        }
        BatchRequest::ScoreArbitrageCandidate(items) => {
            serde_json::to_value(engine.score_arbitrage_batch(&items))?
        }
        BatchRequest::QuoteItem(items) => {
            serde_json::to_value(engine.quote_item_batch(&items, &context))?
        }
        BatchRequest::ForwardQuote(items) => {
            serde_json::to_value(engine.forward_quote_batch(&items, &context))?
        }
    };
    Ok(report)
}
