use std::{collections::BTreeMap, ffi::OsString, path::PathBuf, sync::Arc};
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed map.
///
/// The whole map lives in memory and is mirrored to a single JSON file. Every mutation goes through
/// [`JsonMapStore::update_map`], which writes a complete snapshot to a sibling temporary file and
/// renames it over the data file while holding the write lock; the in-memory map is swapped only
/// once the rename has succeeded.
pub struct JsonMapStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Load the map from `path`. A missing file is created with an empty map; an unreadable one
    /// yields an empty map and a warning.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let map: BTreeMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(file = %file_path.display(), error = %e, "corrupt snapshot; starting from an empty graph");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: BTreeMap<K, V> = BTreeMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.file_path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    async fn write_temp(tmp: &std::path::Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(tmp).await?;
        file.write_all(data).await?;
        // contents must be on disk before the rename makes them visible
        file.sync_all().await
    }

    async fn write_snapshot(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map)?;
        let tmp = self.temp_path();
        if let Err(e) = Self::write_temp(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Entries accepted by `pred`, cloned out of the shared map.
    pub async fn filtered<F>(&self, pred: F) -> BTreeMap<K, V>
    where
        F: Fn(&K, &V) -> bool,
    {
        let map = self.inner.read().await;
        map.iter().filter(|(k, v)| pred(k, v)).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Apply a mutation to a copy of the map, persist it, then publish it.
    ///
    /// Nothing changes, on disk or in memory, when `f` or the write fails.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        self.write_snapshot(&next).await?;
        *map = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{}", uuid::Uuid::new_v4())).join("file.json")
    }

    #[tokio::test]
    async fn json_map_store_persists_updates() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // created empty
        assert!(store.filtered(|_, _| true).await.is_empty());
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "{}");

        store
            .update_map(|m| {
                m.insert("a".into(), "1".into());
                m.insert("b".into(), "2".into());
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        let existed = store.update_map(|m| Ok(m.remove("b").is_some())).await?;
        assert!(existed);

        let on_disk: BTreeMap<String, String> = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(on_disk, store.filtered(|_, _| true).await);

        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        let entries = reloaded.filtered(|_, _| true).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("a").map(String::as_str), Some("1"));
        assert!(tokio::fs::metadata(store.temp_path()).await.is_err());

        let _ = tokio::fs::remove_dir_all(tmp.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_changes_nothing() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        store.update_map(|m| { m.insert("keep".into(), "1".into()); Ok(()) }).await?;

        let res = store
            .update_map(|m| -> Result<(), ServiceError> {
                m.clear();
                Err(ServiceError::Validation("abort".into()))
            })
            .await;
        assert!(res.is_err());
        assert!(store.get(&"keep".into()).await.is_some());

        let _ = tokio::fs::remove_dir_all(tmp.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() -> Result<(), anyhow::Error> {
        let tmp = temp_file();
        tokio::fs::create_dir_all(tmp.parent().unwrap()).await?;
        tokio::fs::write(&tmp, b"{not json").await?;

        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert!(store.filtered(|_, _| true).await.is_empty());

        let _ = tokio::fs::remove_dir_all(tmp.parent().unwrap()).await;
        Ok(())
    }
}
