use crate::model::ScanReport;

/// Human-readable summary of a scan, as shown on the console and in Telegram.
pub fn render_report(index_name: &str, report: &ScanReport) -> String {
    let mut out = format!("📈 {} ({} tickers scanned)\n", index_name, report.scanned);

    if report.consolidating.is_empty() {
        out.push_str("No stocks currently consolidating.");
    } else {
        out.push_str("Stocks in consolidation:\n");
        out.push_str(&report.consolidating.join(", "));
    }

    if !report.empty.is_empty() {
        out.push_str(&format!("\nNo data: {}", report.empty.join(", ")));
    }
    for failure in &report.failures {
        out.push_str(&format!("\nError fetching {}: {}", failure.ticker, failure.reason));
    }
    out
}
