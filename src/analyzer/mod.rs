// Analyzer module: rolling means and the SMA consolidation check built on them.

pub mod consolidation;
pub mod moving_average;

// Re-export the main Analyzer implementation for ease of use.
pub use consolidation::{Analyzer, ConsolidationAnalyzer, DEFAULT_THRESHOLD_PCT};
