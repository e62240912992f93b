#![cfg(test)]
use std::path::PathBuf;
use std::sync::Arc;

use configs::DatabaseConfig;
use serde_json::{Map, Value};

use crate::storage::{DbStorage, DynStorage, FileStorage};

pub fn attrs(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {other}"),
    }
}

/// Fresh `<tmp>/<uuid>/file.json` path; the file itself does not exist yet.
pub fn temp_data_file() -> PathBuf {
    std::env::temp_dir().join(format!("hbnb_store_{}", uuid::Uuid::new_v4())).join("file.json")
}

pub fn sqlite_memory() -> DatabaseConfig {
    DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() }
}

pub async fn file_storage() -> anyhow::Result<DynStorage> {
    Ok(Arc::new(FileStorage::open_path(temp_data_file()).await?))
}

/// Each call gets its own private in-memory database with the schema applied.
pub async fn db_storage() -> anyhow::Result<DynStorage> {
    Ok(Arc::new(DbStorage::connect(&sqlite_memory()).await?))
}

/// One empty storage per backend, labelled for assertion messages.
pub async fn backends() -> anyhow::Result<Vec<(&'static str, DynStorage)>> {
    Ok(vec![("file", file_storage().await?), ("db", db_storage().await?)])
}
