use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use common::{KvStore, Result, SignalRecord};

const LAST_SIGNALS: &str = "last_signals";
const HISTORY: &str = "history";
const WATCHLISTS: &str = "watchlists";
const PERMISSIONS: &str = "permissions";

/// Typed view over the key-value store: last announced signal per symbol,
/// bounded announcement history, per-user watchlists and granted recipients.
///
/// Read-modify-write updates are serialized through one lock so concurrent
/// chat commands and scan cycles cannot lose each other's writes.
#[derive(Clone)]
pub struct SignalBook {
    store: Arc<dyn KvStore>,
    history_limit: usize,
    write_lock: Arc<Mutex<()>>,
}

impl SignalBook {
    pub const DEFAULT_HISTORY_LIMIT: usize = 200;

    pub fn new(store: Arc<dyn KvStore>, history_limit: usize) -> Self {
        Self { store, history_limit, write_lock: Arc::new(Mutex::new(())) }
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.store.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.set(key, serde_json::to_value(value)?).await
    }

    // ── Last signals ────────────────────────────────────────────────────────

    pub async fn last_signals(&self) -> Result<BTreeMap<String, SignalRecord>> {
        self.load(LAST_SIGNALS).await
    }

    pub async fn last_signal(&self, symbol: &str) -> Result<Option<SignalRecord>> {
        Ok(self.last_signals().await?.remove(symbol))
    }

    /// Store `record` as the symbol's last signal without touching history.
    pub async fn set_last_signal(&self, record: &SignalRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_last_signal(record).await
    }

    /// Store `record` as the symbol's last signal and append it to history.
    pub async fn record_announcement(&self, record: &SignalRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_last_signal(record).await?;
        self.store
            .append_bounded(HISTORY, serde_json::to_value(record)?, self.history_limit)
            .await
    }

    async fn put_last_signal(&self, record: &SignalRecord) -> Result<()> {
        let mut map = self.last_signals().await?;
        map.insert(record.idea.symbol.clone(), record.clone());
        self.save(LAST_SIGNALS, &map).await
    }

    // ── History ─────────────────────────────────────────────────────────────

    /// Most recent announcements first.
    pub async fn history(&self, limit: usize) -> Result<Vec<SignalRecord>> {
        let all: Vec<SignalRecord> = self.load(HISTORY).await?;
        Ok(all.into_iter().rev().take(limit).collect())
    }

    // ── Watchlists ──────────────────────────────────────────────────────────

    pub async fn watchlists(&self) -> Result<BTreeMap<i64, Vec<String>>> {
        self.load(WATCHLISTS).await
    }

    pub async fn watchlist(&self, user_id: i64) -> Result<Vec<String>> {
        Ok(self.watchlists().await?.remove(&user_id).unwrap_or_default())
    }

    /// Returns `false` if the symbol was already watched.
    pub async fn watch(&self, user_id: i64, symbol: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut lists = self.watchlists().await?;
        let list = lists.entry(user_id).or_default();
        if list.iter().any(|s| s == symbol) {
            return Ok(false);
        }
        list.push(symbol.to_string());
        self.save(WATCHLISTS, &lists).await?;
        Ok(true)
    }

    /// Returns `false` if the symbol was not watched.
    pub async fn unwatch(&self, user_id: i64, symbol: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut lists = self.watchlists().await?;
        let Some(list) = lists.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|s| s != symbol);
        if list.len() == before {
            return Ok(false);
        }
        if list.is_empty() {
            lists.remove(&user_id);
        }
        self.save(WATCHLISTS, &lists).await?;
        Ok(true)
    }

    // ── Permissions ─────────────────────────────────────────────────────────

    /// Users granted access by the admin. The admin is not stored here.
    pub async fn granted(&self) -> Result<BTreeSet<i64>> {
        self.load(PERMISSIONS).await
    }

    pub async fn is_granted(&self, user_id: i64) -> Result<bool> {
        Ok(self.granted().await?.contains(&user_id))
    }

    /// Returns `false` if the user already had access.
    pub async fn grant(&self, user_id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.granted().await?;
        if !ids.insert(user_id) {
            return Ok(false);
        }
        self.save(PERMISSIONS, &ids).await?;
        Ok(true)
    }

    /// Remove the user's access and their watchlist, so no more watch hits
    /// reach them. Returns `false` if the user had no access.
    pub async fn revoke(&self, user_id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut lists = self.watchlists().await?;
        if lists.remove(&user_id).is_some() {
            self.save(WATCHLISTS, &lists).await?;
        }
        let mut ids = self.granted().await?;
        if !ids.remove(&user_id) {
            return Ok(false);
        }
        self.save(PERMISSIONS, &ids).await?;
        Ok(true)
    }
}
