// notifier/telegram/command_handler.rs

use crate::config::IndexConfig;
use crate::normalizer::resolve_index;
use crate::notifier::telegram::TelegramNotifier;
use tracing::{info, warn};

const HELP: &str = "📋 Available commands:\n\
    /ping — check connection\n\
    /help — command list\n\
    /indices — configured ticker lists\n\
    /scan <list> — scan a list now, e.g. /scan bank nifty\n\
    /threshold — consolidation threshold\n\
    /refresh — rescan watched lists\n\
    /uptime — service uptime";

#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Ping,
    Help,
    Indices,
    Scan(&'a IndexConfig),
    UnknownIndex(String),
    Threshold,
    Refresh,
    Uptime,
    Unknown,
}

impl<'a> Command<'a> {
    /// Parses `/name args`; `/name@bot` suffixes are ignored. A bare `/banknifty`
    /// is read as `/scan banknifty`.
    pub fn parse(text: &str, indices: &'a [IndexConfig]) -> Self {
        let text = text.trim();
        let (head, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let name = head.split('@').next().unwrap_or(head);
        let args = args.trim();

        match name {
            "/ping" => Command::Ping,
            "/help" | "/start" => Command::Help,
            "/indices" => Command::Indices,
            "/threshold" => Command::Threshold,
            "/refresh" => Command::Refresh,
            "/uptime" => Command::Uptime,
            "/scan" => match resolve_index(args, indices) {
                Some(index) => Command::Scan(index),
                None => Command::UnknownIndex(args.to_string()),
            },
            other => match other.strip_prefix('/').and_then(|n| resolve_index(n, indices)) {
                Some(index) => Command::Scan(index),
                None => Command::Unknown,
            },
        }
    }
}

async fn reply(notifier: &TelegramNotifier, text: &str) {
    if let Err(e) = notifier.notify_text(text).await {
        warn!("Reply failed: {:?}", e);
    }
}

/// Handles an incoming command and triggers the corresponding action.
pub async fn handle_command(command_text: &str, notifier: &TelegramNotifier) {
    info!("Handling command: {}", command_text);
    match Command::parse(command_text, &notifier.config.indices) {
        Command::Ping => reply(notifier, "✅ I am online!").await,
        Command::Help => reply(notifier, HELP).await,
        Command::Indices => {
            let mut msg = String::from("⚙️ Configured lists:\n");
            for index in &notifier.config.indices {
                msg.push_str(&format!("🔸 {} ({} tickers)\n", index.name, index.tickers.len()));
            }
            reply(notifier, &msg).await;
        }
        Command::Scan(index) => {
            reply(notifier, &format!("🔍 Scanning {}, please wait...", index.name)).await;
            let report = notifier.scanner.scan(&index.tickers).await;
            if let Err(e) = notifier.notify_report(&index.name, &report).await {
                warn!("/scan report error: {:?}", e);
            }
        }
        Command::UnknownIndex(name) => {
            reply(
                notifier,
                &format!("🤷 Unknown list '{}'. Type /indices to see what can be scanned.", name),
            )
            .await
        }
        Command::Threshold => {
            let msg = format!(
                "📐 SMA 14/21/35 must be within {}% of the largest average.",
                notifier.scanner.threshold_pct()
            );
            reply(notifier, &msg).await;
        }
        Command::Refresh => {
            info!("/refresh command received, triggering refresh...");
            notifier.refresh_notify.notify_one();
            reply(notifier, "🔄 Rescan of watched lists initiated.").await;
        }
        Command::Uptime => {
            let uptime = notifier.start_time.elapsed();
            let msg = format!(
                "⏱ Uptime: {:02}:{:02}:{:02}",
                uptime.as_secs() / 3600,
                (uptime.as_secs() % 3600) / 60,
                uptime.as_secs() % 60
            );
            reply(notifier, &msg).await;
        }
        Command::Unknown => {
            reply(notifier, "🤖 Unknown command. Type /help for a list of commands.").await
        }
    }
}
