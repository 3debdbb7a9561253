// Core structs: PriceSeries, SmaSnapshot, ConsolidationVerdict, ScanReport
use chrono::NaiveDate;
use thiserror::Error;

/// A single daily close. Only the closing value is used by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices in strictly ascending date order. Missing trading days are fine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting duplicate or out-of-order dates.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotAscending {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from bare closes, dated on consecutive days from 1970-01-01.
    #[cfg(test)]
    pub fn from_closes(closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: NaiveDate::default() + chrono::Days::new(i as u64),
                close,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The three SMA windows, fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaWindowSpec {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl SmaWindowSpec {
    pub const STANDARD: SmaWindowSpec = SmaWindowSpec {
        short: 14,
        medium: 21,
        long: 35,
    };

    /// Number of points needed before all three averages exist.
    pub fn longest(&self) -> usize {
        self.short.max(self.medium).max(self.long)
    }
}

impl Default for SmaWindowSpec {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// SMA values taken from the same trailing date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaSnapshot {
    pub date: NaiveDate,
    pub sma14: f64,
    pub sma21: f64,
    pub sma35: f64,
}

impl SmaSnapshot {
    pub fn max(&self) -> f64 {
        self.sma14.max(self.sma21).max(self.sma35)
    }

    pub fn min(&self) -> f64 {
        self.sma14.min(self.sma21).min(self.sma35)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolidationVerdict {
    pub is_consolidating: bool,
    /// Present only when all three SMAs were defined.
    pub spread_pct: Option<f64>,
    pub snapshot: Option<SmaSnapshot>,
}

impl ConsolidationVerdict {
    /// Negative verdict for a series shorter than the longest window.
    pub fn insufficient_data() -> Self {
        Self {
            is_consolidating: false,
            spread_pct: None,
            snapshot: None,
        }
    }
}

/// Lookback descriptor handed to a price provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub ticker: String,
    pub range: String,
    pub interval: String,
}

/// What happened to one ticker during a scan.
#[derive(Debug)]
pub enum TickerOutcome {
    Evaluated(ConsolidationVerdict),
    Empty,
    FetchFailed(ProviderError),
    AnalysisFailed(AnalysisError),
}

#[derive(Debug)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: String,
}

/// Result of scanning one list of tickers, in input order.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub scanned: usize,
    pub consolidating: Vec<String>,
    pub empty: Vec<String>,
    pub failures: Vec<TickerFailure>,
}

impl ScanReport {
    pub fn record(&mut self, ticker: String, outcome: TickerOutcome) {
        self.scanned += 1;
        match outcome {
            TickerOutcome::Evaluated(verdict) => {
                if verdict.is_consolidating {
                    self.consolidating.push(ticker);
                }
            }
            TickerOutcome::Empty => self.empty.push(ticker),
            TickerOutcome::FetchFailed(e) => self.failures.push(TickerFailure {
                ticker,
                reason: e.to_string(),
            }),
            TickerOutcome::AnalysisFailed(e) => self.failures.push(TickerFailure {
                ticker,
                reason: e.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("dates not strictly ascending: {previous} then {next}")]
    NotAscending { previous: NaiveDate, next: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("provider responded with status {0}")]
    InvalidResponse(u16),
    #[error("API error [{code}]: {description}")]
    ApiError { code: String, description: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("threshold must be a positive finite percentage, got {0}")]
    InvalidThreshold(f64),
    #[error("largest SMA is {0}; prices must be positive")]
    NonPositivePrices(f64),
    #[error("series contains non-finite prices")]
    NonFiniteValue,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram API error: {0}")]
    ApiError(String),
    #[error("Telegram unreachable")]
    Unreachable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
