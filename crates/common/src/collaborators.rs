use async_trait::async_trait;
use serde_json::Value;

use crate::{Announcement, Bars, Result};

/// Source of candlestick data.
///
/// `BinanceClient` implements this for live data. Implementations absorb
/// their own transport failures: an unreachable venue or a malformed payload
/// yields an empty `Bars`, never an error.
#[async_trait]
pub trait BarSupply: Send + Sync {
    async fn fetch_bars(&self, symbol: &str, interval: &str, limit: usize) -> Bars;
}

/// Minimal JSON key-value store backing the signal book.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Append `item` to the JSON array stored at `key`, evicting the oldest
    /// entries so that at most `max` remain.
    async fn append_bounded(&self, key: &str, item: Value, max: usize) -> Result<()> {
        let mut items = match self.get(key).await? {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        items.push(item);
        if items.len() > max {
            let excess = items.len() - max;
            items.drain(..excess);
        }
        self.set(key, Value::Array(items)).await
    }
}

/// Delivers a text message to one chat recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: i64, text: &str) -> Result<()>;
}

/// Receives the output of every scan cycle.
#[async_trait]
pub trait AnnouncementSink: Send + Sync {
    async fn deliver(&self, announcements: &[Announcement]);
}
