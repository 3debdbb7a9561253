use crate::analyzer::moving_average::rolling_mean;
use crate::model::{AnalysisError, ConsolidationVerdict, PriceSeries, SmaSnapshot, SmaWindowSpec};

/// Default maximum spread, in percent of the largest SMA.
pub const DEFAULT_THRESHOLD_PCT: f64 = 0.5;

/// Trait defining the interface for a consolidation analyzer.
pub trait Analyzer {
    /// Latest SMA values where every window is defined, if the series is long enough.
    fn snapshot(&self, series: &PriceSeries) -> Option<SmaSnapshot>;

    /// Classifies the series as consolidating when the SMA spread is strictly below `threshold_pct`.
    fn evaluate(
        &self,
        series: &PriceSeries,
        threshold_pct: f64,
    ) -> Result<ConsolidationVerdict, AnalysisError>;
}

/// SMA-convergence analyzer over the 14/21/35 windows.
///
/// Stateless: safe to share between tasks without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationAnalyzer {
    windows: SmaWindowSpec,
}

impl ConsolidationAnalyzer {
    pub fn new() -> Self {
        Self {
            windows: SmaWindowSpec::STANDARD,
        }
    }
}

/// Relative distance between the largest and smallest SMA, as a percent of the largest.
pub fn spread_pct(snapshot: &SmaSnapshot) -> Result<f64, AnalysisError> {
    let values = [snapshot.sma14, snapshot.sma21, snapshot.sma35];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFiniteValue);
    }
    let max = snapshot.max();
    if max <= 0.0 {
        return Err(AnalysisError::NonPositivePrices(max));
    }
    Ok((max - snapshot.min()) / max * 100.0)
}

pub fn validate_threshold(threshold_pct: f64) -> Result<(), AnalysisError> {
    if threshold_pct.is_finite() && threshold_pct > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidThreshold(threshold_pct))
    }
}

impl Analyzer for ConsolidationAnalyzer {
    fn snapshot(&self, series: &PriceSeries) -> Option<SmaSnapshot> {
        if series.len() < self.windows.longest() {
            return None;
        }
        let closes = series.closes();
        let short = rolling_mean(&closes, self.windows.short);
        let medium = rolling_mean(&closes, self.windows.medium);
        let long = rolling_mean(&closes, self.windows.long);

        // Single most recent row where all three are defined; no smoothing over older rows.
        (0..closes.len())
            .rev()
            .find_map(|i| match (short[i], medium[i], long[i]) {
                (Some(sma14), Some(sma21), Some(sma35)) => Some(SmaSnapshot {
                    date: series.points()[i].date,
                    sma14,
                    sma21,
                    sma35,
                }),
                _ => None,
            })
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        threshold_pct: f64,
    ) -> Result<ConsolidationVerdict, AnalysisError> {
        validate_threshold(threshold_pct)?;

        let Some(snapshot) = self.snapshot(series) else {
            return Ok(ConsolidationVerdict::insufficient_data());
        };
        let spread = spread_pct(&snapshot)?;

        Ok(ConsolidationVerdict {
            is_consolidating: spread < threshold_pct,
            spread_pct: Some(spread),
            snapshot: Some(snapshot),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(from: f64, to: f64, n: usize) -> PriceSeries {
        let step = (to - from) / (n - 1) as f64;
        let closes: Vec<f64> = (0..n).map(|i| from + step * i as f64).collect();
        PriceSeries::from_closes(&closes)
    }

    #[test]
    fn flat_series_is_consolidating() {
        let series = PriceSeries::from_closes(&[100.0; 40]);
        let verdict = ConsolidationAnalyzer::new()
            .evaluate(&series, DEFAULT_THRESHOLD_PCT)
            .unwrap();

        assert!(verdict.is_consolidating);
        assert_eq!(verdict.spread_pct, Some(0.0));
        let snap = verdict.snapshot.unwrap();
        assert_eq!((snap.sma14, snap.sma21, snap.sma35), (100.0, 100.0, 100.0));
    }

    #[test]
    fn flat_series_passes_any_positive_threshold() {
        let series = PriceSeries::from_closes(&[42.0; 35]);
        let analyzer = ConsolidationAnalyzer::new();
        for threshold in [1e-9, 0.01, 0.5, 10.0] {
            assert!(analyzer.evaluate(&series, threshold).unwrap().is_consolidating);
        }
    }

    #[test]
    fn rising_series_is_not_consolidating() {
        let series = linear(100.0, 140.0, 40);
        let verdict = ConsolidationAnalyzer::new()
            .evaluate(&series, DEFAULT_THRESHOLD_PCT)
            .unwrap();

        let snap = verdict.snapshot.unwrap();
        assert!(snap.sma14 > snap.sma21 && snap.sma21 > snap.sma35);
        assert!(verdict.spread_pct.unwrap() > 5.0);
        assert!(!verdict.is_consolidating);
    }

    #[test]
    fn short_series_has_no_spread() {
        let analyzer = ConsolidationAnalyzer::new();
        for closes in [vec![], vec![100.0; 10], vec![100.0; 34]] {
            let verdict = analyzer
                .evaluate(&PriceSeries::from_closes(&closes), DEFAULT_THRESHOLD_PCT)
                .unwrap();
            assert_eq!(verdict, ConsolidationVerdict::insufficient_data());
        }
    }

    #[test]
    fn exactly_35_points_is_enough() {
        let verdict = ConsolidationAnalyzer::new()
            .evaluate(&PriceSeries::from_closes(&[10.0; 35]), 0.5)
            .unwrap();
        assert!(verdict.spread_pct.is_some());
    }

    #[test]
    fn spread_equal_to_threshold_is_not_consolidating() {
        let series = linear(100.0, 101.0, 40);
        let analyzer = ConsolidationAnalyzer::new();
        let spread = analyzer.evaluate(&series, 50.0).unwrap().spread_pct.unwrap();

        assert!(!analyzer.evaluate(&series, spread).unwrap().is_consolidating);
        assert!(analyzer.evaluate(&series, spread * 1.01).unwrap().is_consolidating);
        assert!(!analyzer.evaluate(&series, spread * 0.99).unwrap().is_consolidating);
    }

    #[test]
    fn spread_uses_largest_sma_as_base() {
        let snap = SmaSnapshot {
            date: chrono::NaiveDate::default(),
            sma14: 99.0,
            sma21: 100.0,
            sma35: 98.0,
        };
        assert!((spread_pct(&snap).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn snapshot_is_taken_at_last_date() {
        let mut closes = vec![100.0; 39];
        closes.push(135.0);
        let series = PriceSeries::from_closes(&closes);
        let snap = ConsolidationAnalyzer::new().snapshot(&series).unwrap();

        assert_eq!(snap.date, series.points()[39].date);
        assert!((snap.sma14 - 102.5).abs() < 1e-9);
        assert!((snap.sma35 - 101.0).abs() < 1e-9);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let series = linear(50.0, 57.0, 60);
        let analyzer = ConsolidationAnalyzer::new();
        assert_eq!(
            analyzer.evaluate(&series, 0.5).unwrap(),
            analyzer.evaluate(&series, 0.5).unwrap()
        );
    }

    #[test]
    fn zero_prices_are_rejected() {
        let result = ConsolidationAnalyzer::new().evaluate(&PriceSeries::from_closes(&[0.0; 40]), 0.5);
        assert_eq!(result, Err(AnalysisError::NonPositivePrices(0.0)));
    }

    #[test]
    fn nan_prices_are_rejected() {
        let mut closes = vec![100.0; 40];
        closes[39] = f64::NAN;
        let result = ConsolidationAnalyzer::new().evaluate(&PriceSeries::from_closes(&closes), 0.5);
        assert_eq!(result, Err(AnalysisError::NonFiniteValue));
    }

    #[test]
    fn bad_thresholds_are_rejected() {
        let series = PriceSeries::from_closes(&[100.0; 40]);
        let analyzer = ConsolidationAnalyzer::new();
        assert_eq!(
            analyzer.evaluate(&series, 0.0),
            Err(AnalysisError::InvalidThreshold(0.0))
        );
        assert!(analyzer.evaluate(&series, -1.0).is_err());
        assert!(analyzer.evaluate(&series, f64::NAN).is_err());
    }
}
