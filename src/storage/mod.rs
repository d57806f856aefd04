// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persistent key-value storage
//!
//! The result cache and the audit log persist through this trait so state
//! survives process restarts. Values are JSON; there are no transactions.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Durable key-value store over JSON values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; None when the key is absent
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    /// Remove a key; absent keys are not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
