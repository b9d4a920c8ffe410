/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    /// The operator. Always receives announcements and may manage permissions.
    pub admin_id: i64,

    // Scanning
    /// Symbols scanned every cycle, upper-cased, e.g. "BTCUSDT".
    pub symbols: Vec<String>,
    pub scan_interval_minutes: u64,

    // Market data
    pub binance_base_url: String,
    pub http_timeout_secs: u64,

    // Uptime endpoint
    pub http_port: u16,

    // Storage
    /// When set, the SQLite backend is used instead of JSON files.
    pub database_url: Option<String>,
    /// Directory holding one JSON file per key for the file backend.
    pub data_dir: String,
    /// Maximum number of retained history entries.
    pub history_limit: usize,

    /// Optional TOML file with detector, scorer and continuity thresholds.
    pub analysis_config_path: Option<String>,
}

impl Config {
    const DEFAULT_SYMBOLS: &'static str = "BTCUSDT,ETHUSDT,SOLUSDT";

    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let admin_raw = required_env("ADMIN_ID");
        let admin_id = admin_raw.trim().parse::<i64>().unwrap_or_else(|_| {
            panic!("ADMIN_ID must be a numeric Telegram user id, got: '{admin_raw}'")
        });

        let symbols = parse_symbols(
            &optional_env("COINS").unwrap_or_else(|| Self::DEFAULT_SYMBOLS.to_string()),
        );
        if symbols.is_empty() {
            panic!("COINS must list at least one symbol");
        }

        Config {
            telegram_token: required_env("TELEGRAM_TOKEN"),
            admin_id,
            symbols,
            scan_interval_minutes: optional_env("SCAN_INTERVAL_MINUTES")
                .and_then(|v| v.parse().ok())
                .filter(|&m: &u64| m > 0)
                .unwrap_or(5),
            binance_base_url: optional_env("BINANCE_BASE_URL")
                .unwrap_or_else(|| "https://api.binance.com".to_string()),
            http_timeout_secs: optional_env("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            http_port: optional_env("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: optional_env("DATABASE_URL"),
            data_dir: optional_env("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            history_limit: optional_env("HISTORY_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            analysis_config_path: optional_env("ANALYSIS_CONFIG_PATH"),
        }
    }
}

/// Split a comma separated symbol list, trimming, upper-casing and dropping
/// blanks and duplicates while keeping the first-seen order.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in raw.split(',') {
        let s = s.trim().to_uppercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
