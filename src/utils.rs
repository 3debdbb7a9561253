// Utility functions
use chrono::{DateTime, NaiveDate};

/// Converts a unix timestamp plus the exchange's UTC offset into the local trading date.
pub fn trading_date(timestamp: i64, gmt_offset_secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp.checked_add(gmt_offset_secs)?, 0).map(|dt| dt.date_naive())
}

/// Canonical form of a ticker symbol: trimmed and upper-cased.
pub fn normalize_symbol(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Lower-cased text with spaces, dashes and underscores removed, for loose name matching.
pub fn to_lookup_key(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
