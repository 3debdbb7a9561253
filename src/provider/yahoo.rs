use crate::model::{PriceSeries, ProviderError, SeriesRequest};
use crate::parser::{Parser, YahooChartParser};
use crate::provider::traits::PriceSeriesProvider;

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct YahooProvider {
    client: Client,
    base_url: String,
    parser: YahooChartParser,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) SmaSniperBot/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: CHART_URL.to_string(),
            parser: YahooChartParser::new(),
        })
    }

    /// Points the provider at another chart endpoint, e.g. a local mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, req: &SeriesRequest) -> String {
        format!(
            "{}/{}?range={}&interval={}",
            self.base_url.trim_end_matches('/'),
            req.ticker,
            req.range,
            req.interval
        )
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::HttpError(e.to_string())
    }
}

#[async_trait::async_trait]
impl PriceSeriesProvider for YahooProvider {
    async fn fetch(&self, req: &SeriesRequest) -> Result<PriceSeries, ProviderError> {
        let url = self.build_url(req);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            // Unknown symbols come back as 404 with a JSON error payload.
            return match self.parser.parse(&body) {
                Err(e @ ProviderError::ApiError { .. }) => Err(e),
                _ => Err(ProviderError::InvalidResponse(status.as_u16())),
            };
        }

        self.parser.parse(&body)
    }
}
