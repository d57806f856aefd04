// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON-file-backed key-value store
//!
//! One file per key under a base directory. Keys are sanitized to a safe
//! filename; values are pretty-printed JSON for inspectability.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Durable store writing one JSON file per key
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            })
            .collect();
        self.base_dir.join(format!("{}.json", safe))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let value = serde_json::from_str(&contents)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.ensure_dir().await?;
        let path = self.path_for(key);
        let contents = serde_json::to_string_pretty(&value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!("Writing {} bytes to {}", contents.len(), path.display());
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.set("course_cache", json!({"x": [1, 2]})).await.unwrap();
        assert_eq!(
            store.get("course_cache").await.unwrap(),
            Some(json!({"x": [1, 2]}))
        );
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_key_sanitization() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.set("odd/key with:chars", json!(true)).await.unwrap();
        assert_eq!(
            store.get("odd/key with:chars").await.unwrap(),
            Some(json!(true))
        );
        // Sanitized filename lands inside the base dir
        assert!(dir.path().join("odd_key_with_chars.json").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonFileStore::new(dir.path());
            store.set("persisted", json!("v")).await.unwrap();
        }
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.get("persisted").await.unwrap(), Some(json!("v")));
    }
}
