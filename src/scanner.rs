use crate::analyzer::{Analyzer, ConsolidationAnalyzer};
use crate::config::AppConfig;
use crate::model::{ScanReport, SeriesRequest, TickerOutcome};
use crate::provider::PriceSeriesProvider;
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches each ticker's series and runs the consolidation check on it.
///
/// Every scan fetches fresh data; nothing is cached between calls.
pub struct Scanner {
    provider: Arc<dyn PriceSeriesProvider>,
    analyzer: ConsolidationAnalyzer,
    threshold_pct: f64,
    range: String,
    interval: String,
    concurrency: usize,
}

impl Scanner {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, threshold_pct: f64) -> Self {
        Self {
            provider,
            analyzer: ConsolidationAnalyzer::new(),
            threshold_pct,
            range: "3mo".to_string(),
            interval: "1d".to_string(),
            concurrency: 1,
        }
    }

    pub fn from_config(provider: Arc<dyn PriceSeriesProvider>, config: &AppConfig) -> Self {
        Self::new(provider, config.threshold_pct)
            .with_lookback(&config.range, &config.interval)
            .with_concurrency(config.max_concurrent_fetches)
    }

    pub fn with_lookback(mut self, range: &str, interval: &str) -> Self {
        self.range = range.to_string();
        self.interval = interval.to_string();
        self
    }

    /// Number of fetches allowed in flight. Results keep input order either way.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    async fn check_ticker(&self, ticker: &str) -> TickerOutcome {
        let req = SeriesRequest {
            ticker: ticker.to_string(),
            range: self.range.clone(),
            interval: self.interval.clone(),
        };

        let series = match self.provider.fetch(&req).await {
            Ok(series) => series,
            Err(e) => {
                warn!("Error fetching {}: {}", ticker, e);
                return TickerOutcome::FetchFailed(e);
            }
        };
        if series.is_empty() {
            info!("No data for {}, skipping", ticker);
            return TickerOutcome::Empty;
        }

        match self.analyzer.evaluate(&series, self.threshold_pct) {
            Ok(verdict) => {
                debug!(
                    "{}: {} points, spread {:?}% as of {:?}, consolidating = {}",
                    ticker,
                    series.len(),
                    verdict.spread_pct,
                    verdict.snapshot.map(|s| s.date),
                    verdict.is_consolidating
                );
                TickerOutcome::Evaluated(verdict)
            }
            Err(e) => {
                warn!("Cannot evaluate {}: {}", ticker, e);
                TickerOutcome::AnalysisFailed(e)
            }
        }
    }

    /// Lazily yields one outcome per ticker, in input order.
    ///
    /// Dropping the stream abandons the scan; tickers not yet reached are never fetched.
    pub fn outcomes<'a>(
        &'a self,
        tickers: &'a [String],
    ) -> impl Stream<Item = (String, TickerOutcome)> + 'a {
        stream::iter(tickers)
            .map(move |ticker| async move { (ticker.clone(), self.check_ticker(ticker).await) })
            .buffered(self.concurrency)
    }

    /// Scans every ticker and collects the consolidating ones plus any per-ticker failures.
    pub async fn scan(&self, tickers: &[String]) -> ScanReport {
        info!("Scanning {} tickers...", tickers.len());
        let report = self
            .outcomes(tickers)
            .fold(ScanReport::default(), |mut report, (ticker, outcome)| async move {
                report.record(ticker, outcome);
                report
            })
            .await;
        info!(
            "Scan finished: {} consolidating, {} empty, {} failed",
            report.consolidating.len(),
            report.empty.len(),
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceSeries, ProviderError};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Stub {
        Closes(Vec<f64>),
        Fail,
        Slow(u64, Vec<f64>),
    }

    #[derive(Default)]
    struct StubProvider {
        data: HashMap<String, Stub>,
        calls: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn with(mut self, ticker: &str, stub: Stub) -> Self {
            self.data.insert(ticker.to_string(), stub);
            self
        }
    }

    #[async_trait::async_trait]
    impl PriceSeriesProvider for StubProvider {
        async fn fetch(&self, req: &SeriesRequest) -> Result<PriceSeries, ProviderError> {
            self.calls.lock().unwrap().push(req.ticker.clone());
            match self.data.get(&req.ticker) {
                Some(Stub::Closes(c)) => Ok(PriceSeries::from_closes(c)),
                Some(Stub::Slow(ms, c)) => {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                    Ok(PriceSeries::from_closes(c))
                }
                Some(Stub::Fail) => Err(ProviderError::HttpError("connection reset".into())),
                None => Ok(PriceSeries::default()),
            }
        }
    }

    fn flat() -> Vec<f64> {
        vec![100.0; 40]
    }

    fn rising() -> Vec<f64> {
        (0..40).map(|i| 100.0 + i as f64).collect()
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn keeps_input_order_and_skips_failures() {
        let provider = StubProvider::default()
            .with("B", Stub::Closes(flat()))
            .with("X", Stub::Fail)
            .with("R", Stub::Closes(rising()))
            .with("A", Stub::Closes(flat()));
        let scanner = Scanner::new(Arc::new(provider), 0.5);

        let report = scanner.scan(&tickers(&["B", "X", "EMPTY", "R", "A"])).await;

        assert_eq!(report.consolidating, tickers(&["B", "A"]));
        assert_eq!(report.empty, tickers(&["EMPTY"]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "X");
        assert_eq!(report.scanned, 5);
    }

    #[tokio::test]
    async fn short_history_is_not_consolidating() {
        let provider = StubProvider::default().with("NEW", Stub::Closes(vec![100.0; 10]));
        let report = Scanner::new(Arc::new(provider), 0.5)
            .scan(&tickers(&["NEW"]))
            .await;
        assert!(report.consolidating.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn degenerate_prices_are_reported_not_fatal() {
        let provider = StubProvider::default()
            .with("ZERO", Stub::Closes(vec![0.0; 40]))
            .with("OK", Stub::Closes(flat()));
        let report = Scanner::new(Arc::new(provider), 0.5)
            .scan(&tickers(&["ZERO", "OK"]))
            .await;
        assert_eq!(report.consolidating, tickers(&["OK"]));
        assert_eq!(report.failures[0].ticker, "ZERO");
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_fetching() {
        let provider = Arc::new(
            StubProvider::default()
                .with("A", Stub::Closes(flat()))
                .with("B", Stub::Closes(flat()))
                .with("C", Stub::Closes(flat())),
        );
        let scanner = Scanner::new(provider.clone(), 0.5);
        let list = tickers(&["A", "B", "C"]);

        let first_two: Vec<_> = scanner.outcomes(&list).take(2).collect().await;

        assert_eq!(first_two.len(), 2);
        assert_eq!(*provider.calls.lock().unwrap(), tickers(&["A", "B"]));
    }

    #[tokio::test]
    async fn concurrent_scan_preserves_order() {
        let provider = StubProvider::default()
            .with("SLOW", Stub::Slow(50, flat()))
            .with("MID", Stub::Slow(20, flat()))
            .with("FAST", Stub::Closes(flat()));
        let scanner = Scanner::new(Arc::new(provider), 0.5).with_concurrency(3);

        let report = scanner.scan(&tickers(&["SLOW", "MID", "FAST"])).await;

        assert_eq!(report.consolidating, tickers(&["SLOW", "MID", "FAST"]));
    }

    #[tokio::test]
    async fn threshold_is_applied() {
        let provider = StubProvider::default().with("R", Stub::Closes(rising()));
        let report = Scanner::new(Arc::new(provider), 50.0)
            .scan(&tickers(&["R"]))
            .await;
        assert_eq!(report.consolidating, tickers(&["R"]));
    }
}
