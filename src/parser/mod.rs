pub mod chart_parser;

pub use chart_parser::{Parser, YahooChartParser};
