// notifier/telegram/sender.rs

use crate::model::{NotifyError, ScanReport};
use crate::notifier::telegram::TelegramNotifier;
use crate::report::render_report;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Sends a plain text message to the configured chat.
pub async fn send_text(notifier: &TelegramNotifier, text: &str) -> Result<(), NotifyError> {
    let url = notifier.api_url("sendMessage");
    let params = [
        ("chat_id", notifier.chat_id.to_string()),
        ("text", text.to_string()),
    ];
    let response = match timeout(
        Duration::from_secs(10),
        notifier.client.post(&url).form(&params).send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("❌ Telegram send() failed: {:?}", e);
            return Err(NotifyError::ApiError(format!("Send failed: {}", e)));
        }
        Err(_) => {
            warn!("⏳ Telegram send() timed out");
            return Err(NotifyError::Unreachable);
        }
    };
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        warn!("❌ Telegram API responded [{}]: {}", status, body);
        return Err(NotifyError::ApiError(format!("status {}", status)));
    }
    info!("✅ Telegram message sent [{}]", status);
    Ok(())
}

/// Sends the rendered result of one scan.
pub async fn send_report(
    notifier: &TelegramNotifier,
    index_name: &str,
    report: &ScanReport,
) -> Result<(), NotifyError> {
    let message = render_report(index_name, report);
    info!("📤 Sending scan report for {}", index_name);
    send_text(notifier, &message).await
}
