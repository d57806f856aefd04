// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory key-value store for tests and stub mode

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{KeyValueStore, StorageError};

/// Volatile store backed by a HashMap
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
