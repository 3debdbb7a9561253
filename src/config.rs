use crate::analyzer::DEFAULT_THRESHOLD_PCT;
use crate::analyzer::consolidation::validate_threshold;
use crate::model::ConfigError;
use crate::normalizer::resolve_index;
use crate::utils::normalize_symbol;
use serde::Deserialize;
use std::fs;

/// A named ticker list, e.g. "Nifty 50".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    #[serde(default)]
    pub match_keywords: Vec<String>,
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: f64,
    /// Provider lookback, e.g. "3mo".
    #[serde(default = "default_range")]
    pub range: String,
    /// Bar size, e.g. "1d".
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Alternative chart endpoint; the public Yahoo one when absent.
    #[serde(default)]
    pub chart_url: Option<String>,
    /// 1 scans tickers one after another.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    pub indices: Vec<IndexConfig>,
    /// Index names rescanned periodically in bot mode.
    #[serde(default)]
    pub watch: Vec<String>,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

fn default_threshold_pct() -> f64 {
    DEFAULT_THRESHOLD_PCT
}

fn default_range() -> String {
    "3mo".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_check_interval_seconds() -> u64 {
    3600
}

fn default_request_timeout_seconds() -> u64 {
    15
}

fn default_max_concurrent_fetches() -> usize {
    1
}

impl AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.threshold_pct).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_fetches must be at least 1".into(),
            ));
        }
        if self.indices.is_empty() {
            return Err(ConfigError::Invalid("no indices configured".into()));
        }
        for name in &self.watch {
            if resolve_index(name, &self.indices).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "watched index '{}' is not configured",
                    name
                )));
            }
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    for index in &mut config.indices {
        index.tickers = index.tickers.iter().map(|t| normalize_symbol(t)).collect();
    }
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
