use crate::model::{PriceSeries, ProviderError, SeriesRequest};

/// Source of daily closing prices for a ticker.
///
/// An `Ok` empty series means the provider knows nothing about the ticker.
#[async_trait::async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    async fn fetch(&self, req: &SeriesRequest) -> Result<PriceSeries, ProviderError>;
}
