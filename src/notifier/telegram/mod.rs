pub mod command_handler;
pub mod listener;
pub mod sender;

use crate::config::{AppConfig, TelegramConfig};
use crate::model::{NotifyError, ScanReport};
use crate::scanner::Scanner;
use reqwest::Client;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::time::Instant;
use tokio::sync::Notify;

pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub client: Client,
    pub offset: Arc<AtomicI64>,
    pub config: Arc<AppConfig>,
    pub scanner: Arc<Scanner>,
    pub start_time: Instant,
    pub refresh_notify: Arc<Notify>,
}

impl TelegramNotifier {
    pub fn new(
        telegram: &TelegramConfig,
        config: Arc<AppConfig>,
        scanner: Arc<Scanner>,
        refresh_notify: Arc<Notify>,
    ) -> Result<Self, NotifyError> {
        // Long polling holds getUpdates open for up to 25s.
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(35))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            bot_token: telegram.bot_token.clone(),
            chat_id: telegram.chat_id,
            client,
            offset: Arc::new(AtomicI64::new(0)),
            config,
            scanner,
            start_time: Instant::now(),
            refresh_notify,
        })
    }

    pub(crate) fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, text).await
    }

    pub async fn notify_report(&self, index_name: &str, report: &ScanReport) -> Result<(), NotifyError> {
        sender::send_report(self, index_name, report).await
    }

    pub async fn listen_for_commands(&self) {
        listener::listen_for_commands(self).await;
    }

    pub async fn set_my_commands(&self) -> Result<(), NotifyError> {
        let commands = serde_json::json!({
            "commands": [
                { "command": "ping", "description": "Check connection" },
                { "command": "help", "description": "Command list" },
                { "command": "indices", "description": "Configured ticker lists" },
                { "command": "scan", "description": "Scan a list, e.g. /scan bank nifty" },
                { "command": "threshold", "description": "Current consolidation threshold" },
                { "command": "refresh", "description": "Rescan watched lists now" },
                { "command": "uptime", "description": "Service uptime" }
            ]
        });
        self.client
            .post(self.api_url("setMyCommands"))
            .json(&commands)
            .send()
            .await
            .map_err(|e| NotifyError::ApiError(e.to_string()))?;
        Ok(())
    }

    pub fn spawn_listener(notifier: Arc<TelegramNotifier>) {
        tokio::spawn(async move {
            tracing::info!("▶️ Starting Telegram listener...");
            notifier.listen_for_commands().await;
            tracing::info!("🛑 Telegram listener ended.");
        });
    }
}
