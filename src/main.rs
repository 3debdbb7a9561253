mod analyzer;
mod config;
mod model;
mod normalizer;
mod notifier;
mod parser;
mod provider;
mod report;
mod scanner;
mod utils;

use analyzer::consolidation::validate_threshold;
use clap::{Parser, Subcommand};
use config::{AppConfig, IndexConfig, load_config};
use normalizer::resolve_index;
use notifier::TelegramNotifier;
use provider::YahooProvider;
use report::render_report;
use scanner::Scanner;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sma-sniper")]
#[command(about = "Flags stocks whose 14/21/35-day SMAs have converged")]
struct Cli {
    /// Path to the JSON configuration
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Override the consolidation threshold (percent)
    #[arg(short, long)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one configured list (or all of them) and print the result
    Scan {
        /// List name or keyword, e.g. "bank nifty"
        #[arg(short, long)]
        index: Option<String>,
    },

    /// Show the configured ticker lists
    Indices,

    /// Run the Telegram bot and rescan watched lists periodically
    Bot,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let mut config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };
    if let Some(threshold) = cli.threshold {
        if let Err(e) = validate_threshold(threshold) {
            error!("{}", e);
            return;
        }
        config.threshold_pct = threshold;
    }
    let config = Arc::new(config);

    let provider = match YahooProvider::new(Duration::from_secs(config.request_timeout_seconds)) {
        Ok(p) => match &config.chart_url {
            Some(url) => Arc::new(p.with_base_url(url.as_str())),
            None => Arc::new(p),
        },
        Err(e) => {
            error!("Failed to create price provider: {}", e);
            return;
        }
    };
    let scanner = Arc::new(Scanner::from_config(provider, &config));

    match cli.command {
        Commands::Indices => print_indices(&config),
        Commands::Scan { index } => run_scan(&config, &scanner, index.as_deref()).await,
        Commands::Bot => run_bot(config, scanner).await,
    }
}

fn print_indices(config: &AppConfig) {
    for index in &config.indices {
        println!("{} ({} tickers): {}", index.name, index.tickers.len(), index.tickers.join(", "));
    }
}

/// Resolves the requested list, or every configured list when none is named.
fn select_indices<'a>(config: &'a AppConfig, name: Option<&str>) -> Option<Vec<&'a IndexConfig>> {
    match name {
        Some(name) => resolve_index(name, &config.indices).map(|index| vec![index]),
        None => Some(config.indices.iter().collect()),
    }
}

async fn run_scan(config: &AppConfig, scanner: &Scanner, name: Option<&str>) {
    let Some(indices) = select_indices(config, name) else {
        error!(
            "Unknown list '{}'. Configured: {}",
            name.unwrap_or_default(),
            config.indices.iter().map(|i| i.name.as_str()).collect::<Vec<_>>().join(", ")
        );
        return;
    };

    for index in indices {
        info!("Scanning {}...", index.name);
        tokio::select! {
            report = scanner.scan(&index.tickers) => {
                println!("{}\n", render_report(&index.name, &report));
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Scan of {} abandoned.", index.name);
                return;
            }
        }
    }
}

async fn run_bot(config: Arc<AppConfig>, scanner: Arc<Scanner>) {
    let Some(telegram) = config.telegram.clone() else {
        error!("Bot mode needs a \"telegram\" section in the config");
        return;
    };

    let refresh_notify = Arc::new(Notify::new());
    let notifier = match TelegramNotifier::new(
        &telegram,
        config.clone(),
        scanner.clone(),
        refresh_notify.clone(),
    ) {
        Ok(n) => Arc::new(n),
        Err(e) => {
            error!("Failed to create Telegram notifier: {}", e);
            return;
        }
    };

    if let Err(e) = notifier.set_my_commands().await {
        warn!("Registering bot commands failed: {}", e);
    }

    // Spawn listener for on-demand scans and manual refresh
    TelegramNotifier::spawn_listener(notifier.clone());

    info!("Sending startup message...");
    if let Err(e) = notifier.notify_text("🚀 SmaSniper started!").await {
        warn!("Startup notification failed: {:?}", e);
    }

    let watched: Vec<&IndexConfig> = config
        .watch
        .iter()
        .filter_map(|name| resolve_index(name, &config.indices))
        .collect();

    loop {
        info!("Rescanning {} watched lists...", watched.len());
        for index in &watched {
            let report = scanner.scan(&index.tickers).await;
            if let Err(e) = notifier.notify_report(&index.name, &report).await {
                warn!("Report for {} not delivered: {}", index.name, e);
            }
        }

        info!(
            "Waiting for timer ({}s) or manual refresh...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                return;
            }
        }
    }
}
