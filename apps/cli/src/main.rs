mod config;
mod main_lib;

use config::Config;
use main_lib::{init_tracing, load_engine, load_request, run_batch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let (engine, dataset) = load_engine(&config)?;
    let request = load_request(&config.request_path)?;
    tracing::info!(
        "Running {} items against snapshot {}",
        request.len(),
        engine.snapshot().version()
    );

    let report = run_batch(&engine, &dataset, request).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
