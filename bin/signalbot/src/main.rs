use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{Config, KvStore};
use engine::{Analyzer, BinanceClient, ContinuityConfig, ContinuityPolicy, Scanner, Scheduler};
use store::{JsonFileStore, SignalBook, SqliteStore};
use strategy::AnalysisConfig;
use telegram_ctrl::{start_bot, BotDeps, Broadcaster, TelegramNotifier};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(symbols = ?cfg.symbols, every_min = cfg.scan_interval_minutes, "Signal bot starting");

    let (analysis_cfg, continuity_cfg) = match &cfg.analysis_config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read analysis config '{path}': {e}"));
            let analysis = AnalysisConfig::from_toml(&raw)
                .unwrap_or_else(|e| panic!("Invalid analysis config '{path}': {e}"));
            let continuity = ContinuityConfig::from_toml(&raw)
                .unwrap_or_else(|e| panic!("Invalid analysis config '{path}': {e}"));
            info!(%path, "Analysis config loaded");
            (analysis, continuity)
        }
        None => (AnalysisConfig::default(), ContinuityConfig::default()),
    };

    // ── Storage ───────────────────────────────────────────────────────────────
    let store: Arc<dyn KvStore> = match &cfg.database_url {
        Some(url) => Arc::new(
            SqliteStore::connect(url)
                .await
                .unwrap_or_else(|e| panic!("Failed to open database: {e}")),
        ),
        None => Arc::new(
            JsonFileStore::open(&cfg.data_dir)
                .await
                .unwrap_or_else(|e| panic!("Failed to open data dir '{}': {e}", cfg.data_dir)),
        ),
    };
    let book = SignalBook::new(store, cfg.history_limit);
    info!("Storage ready");

    // ── Market data + scanner ─────────────────────────────────────────────────
    let binance = BinanceClient::new(
        cfg.binance_base_url.clone(),
        Duration::from_secs(cfg.http_timeout_secs),
    )
    .unwrap_or_else(|e| panic!("Failed to build HTTP client: {e}"));
    let analyzer = Analyzer::new(Arc::new(binance), &analysis_cfg);
    let scanner = Arc::new(Scanner::new(
        analyzer,
        book.clone(),
        cfg.symbols.clone(),
        ContinuityPolicy::new(continuity_cfg),
    ));

    // ── Telegram ──────────────────────────────────────────────────────────────
    let bot = teloxide::Bot::new(cfg.telegram_token.clone());
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::new(TelegramNotifier::new(bot.clone())),
        book.clone(),
        cfg.admin_id,
    ));
    let bot_deps = BotDeps {
        scanner: scanner.clone(),
        book: book.clone(),
        sink: broadcaster.clone(),
        admin_id: cfg.admin_id,
    };

    // ── Uptime endpoint ───────────────────────────────────────────────────────
    let api_state = api::AppState {
        status: scanner.status(),
        symbols: cfg.symbols.len(),
    };
    let port = cfg.http_port;

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    let every = Duration::from_secs(cfg.scan_interval_minutes * 60);
    tokio::spawn(Scheduler::new(scanner, broadcaster, every).run());
    tokio::spawn(start_bot(bot, bot_deps));
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Uptime endpoint stopped");
        }
    });

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
