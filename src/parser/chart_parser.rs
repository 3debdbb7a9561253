// Yahoo Finance chart-API parsing
use crate::model::{PricePoint, PriceSeries, ProviderError};
use crate::utils::trading_date;
use serde::Deserialize;
use tracing::debug;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<PriceSeries, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooChartParser;

impl YahooChartParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for YahooChartParser {
    /// Extracts daily closes. Bars without a close are dropped; when two bars fall on
    /// the same trading date (the live intraday bar), the later one is kept.
    fn parse(&self, body: &str) -> Result<PriceSeries, ProviderError> {
        let response: ChartResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

        if let Some(error) = response.chart.error {
            return Err(ProviderError::ApiError {
                code: error.code,
                description: error.description,
            });
        }

        let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(PriceSeries::default());
        };
        let offset = data.meta.as_ref().map_or(0, |m| m.gmtoffset);
        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut points: Vec<PricePoint> = Vec::with_capacity(data.timestamp.len());
        for (i, &ts) in data.timestamp.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                debug!("Skipping bar {} without close", ts);
                continue;
            };
            let date = trading_date(ts, offset)
                .ok_or_else(|| ProviderError::ParseError(format!("bad timestamp {}", ts)))?;
            points.push(PricePoint { date, close });
        }

        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(PriceSeries::new(deduped)?)
    }
}
