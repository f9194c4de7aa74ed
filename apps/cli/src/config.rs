use std::path::PathBuf;

use anyhow::Context;

pub struct Config {
    pub dataset_path: PathBuf,
    pub request_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub log_format: String,
}

impl Config {
    /// Reads `LANDED_*` variables, after loading a `.env` file if present.
    /// Positional arguments `<dataset> <request>` take precedence over the
    /// path variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut args = std::env::args().skip(1);

        let dataset_path = args
            .next()
            .or_else(|| std::env::var("LANDED_DATASET_PATH").ok())
            .context("dataset path missing: pass it as the first argument or set LANDED_DATASET_PATH")?;
        let request_path = args
            .next()
            .or_else(|| std::env::var("LANDED_REQUEST_PATH").ok())
            .context("request path missing: pass it as the second argument or set LANDED_REQUEST_PATH")?;
        let config_path = std::env::var("LANDED_CONFIG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let log_format = std::env::var("LANDED_LOG_FORMAT").unwrap_or_else(|_| "text".into());

        Ok(Self {
            dataset_path: PathBuf::from(dataset_path),
            request_path: PathBuf::from(request_path),
            config_path,
            log_format,
        })
    }
}
