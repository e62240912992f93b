//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server only needs the loaded configuration.

use configs::{AppConfig, StorageMode};

/// Make sure the file backend has somewhere to write its snapshot.
pub async fn ensure_env(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.storage.mode == StorageMode::File {
        common::env::ensure_data_dir(&cfg.storage.file_path).await?;
    }
    Ok(())
}
