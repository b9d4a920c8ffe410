use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use common::{Bar, BarSupply, Bars, Error, Result};

/// Binance caps a single klines request at this many rows.
const MAX_LIMIT: usize = 1000;

/// Public market-data client for Binance spot klines. No credentials needed.
pub struct BinanceClient {
    base_url: String,
    http: Client,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch candles oldest first. Errors on transport, status or payload problems.
    pub async fn klines(&self, symbol: &str, interval: &str, limit: usize) -> Result<Bars> {
        let limit = limit.clamp(1, MAX_LIMIT);
        let url = format!("{}/api/v3/klines", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Market(format!("HTTP {status}: {body}")));
        }

        let bars = parse_klines(&body)?;
        debug!(%symbol, %interval, count = bars.len(), "Fetched klines");
        Ok(bars)
    }
}

#[async_trait]
impl BarSupply for BinanceClient {
    async fn fetch_bars(&self, symbol: &str, interval: &str, limit: usize) -> Bars {
        match self.klines(symbol, interval, limit).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(%symbol, %interval, error = %e, "Kline fetch failed, treating as no data");
                Vec::new()
            }
        }
    }
}

// ─── Wire format ──────────────────────────────────────────────────────────────

/// Rows are arrays: `[openTime, "open", "high", "low", "close", "volume", ...]`.
pub fn parse_klines(body: &str) -> Result<Bars> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_row(row)).collect()
}

fn parse_row(row: &[Value]) -> Result<Bar> {
    if row.len() < 6 {
        return Err(Error::Market(format!("kline row has {} fields", row.len())));
    }
    let timestamp = row[0]
        .as_i64()
        .ok_or_else(|| Error::Market(format!("bad open time: {}", row[0])))?;

    Ok(Bar {
        timestamp,
        open: number(&row[1])?,
        high: number(&row[2])?,
        low: number(&row[3])?,
        close: number(&row[4])?,
        volume: number(&row[5])?,
    })
}

/// Binance quotes prices as strings; accept plain numbers too.
fn number(v: &Value) -> Result<f64> {
    match v {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| Error::Market(format!("bad number '{s}': {e}"))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::Market(format!("bad number {n}"))),
        other => Err(Error::Market(format!("unexpected value {other}"))),
    }
}
