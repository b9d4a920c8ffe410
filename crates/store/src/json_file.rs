use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use common::{Error, KvStore, Result};

/// One pretty-printed JSON file per key inside a data directory.
///
/// Writes go to a temporary file that is renamed over the target, so a crash
/// mid-write leaves the previous value intact.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Store(format!("invalid key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KvStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&value)?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(key, bytes = bytes.len(), "Persisted store key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "signalbot-store-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn set_then_get_survives_reopen() {
        let dir = temp_dir("reopen");
        let store = JsonFileStore::open(&dir).await.unwrap();
        store.set("watchlists", json!({"42": ["BTCUSDT"]})).await.unwrap();

        let reopened = JsonFileStore::open(&dir).await.unwrap();
        assert_eq!(
            reopened.get("watchlists").await.unwrap(),
            Some(json!({"42": ["BTCUSDT"]}))
        );
        assert!(!dir.join("watchlists.json.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = temp_dir("missing");
        let store = JsonFileStore::open(&dir).await.unwrap();
        assert!(store.get("history").await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn path_traversal_keys_are_rejected() {
        let dir = temp_dir("traversal");
        let store = JsonFileStore::open(&dir).await.unwrap();
        let err = store.set("../escape", json!(1)).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_json_error() {
        let dir = temp_dir("corrupt");
        let store = JsonFileStore::open(&dir).await.unwrap();
        std::fs::write(dir.join("permissions.json"), b"{not json").unwrap();
        assert!(matches!(store.get("permissions").await, Err(Error::Json(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
