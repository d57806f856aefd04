// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Append-only audit log of model requests and responses
//!
//! Every model call is recorded, failures included. Each append is one
//! read-modify-write of the whole list under the lock, so interleaved
//! writers cannot lose entries. Only the most recent entries are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::llm::types::{LlmRequest, TokenUsage};
use crate::storage::{KeyValueStore, StorageError};

const STORAGE_KEY: &str = "model_audit_log";
const MAX_ENTRIES: usize = 100;

/// One audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum AuditEntry {
    Request {
        request_id: Uuid,
        timestamp: DateTime<Utc>,
        #[serde(flatten)]
        request: LlmRequest,
    },
    Response {
        request_id: Uuid,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
        content: String,
        usage: TokenUsage,
    },
    Error {
        request_id: Uuid,
        timestamp: DateTime<Utc>,
        error: String,
    },
}

impl AuditEntry {
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::Request { request_id, .. }
            | Self::Response { request_id, .. }
            | Self::Error { request_id, .. } => *request_id,
        }
    }
}

/// Persistent, capped audit log
pub struct AuditLog {
    store: Arc<dyn KeyValueStore>,
    // Serializes the read-modify-write append cycle
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Append an entry, trimming to the newest MAX_ENTRIES.
    ///
    /// Audit writes are mandatory for callers but a storage failure here is
    /// logged and swallowed so it cannot fail a model call that succeeded.
    pub async fn append(&self, entry: AuditEntry) {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await;
        debug!("Audit append for request {}", entry.request_id());
        entries.push(entry);

        if entries.len() > MAX_ENTRIES {
            let excess = entries.len() - MAX_ENTRIES;
            entries.drain(..excess);
        }

        if let Err(e) = self.persist(&entries).await {
            warn!("Audit log write failed: {}", e);
        }
    }

    /// All retained entries, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.load().await
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(STORAGE_KEY).await
    }

    /// Plain-text dump of the log for inspection.
    pub async fn formatted(&self) -> String {
        let entries = self.load().await;
        let mut out = String::new();
        out.push_str("COURSELENS - MODEL AUDIT LOG\n");
        out.push_str(&format!("Generated: {}\n", Utc::now().to_rfc3339()));
        out.push_str(&format!("Total Entries: {}\n", entries.len()));
        out.push_str(&format!("{}\n\n", "=".repeat(80)));

        for (i, entry) in entries.iter().enumerate() {
            out.push_str(&format!("Entry #{}\n", i + 1));
            match entry {
                AuditEntry::Request {
                    request_id,
                    timestamp,
                    request,
                } => {
                    out.push_str(&format!("Timestamp: {}\n", timestamp.to_rfc3339()));
                    out.push_str("Type: REQUEST\n");
                    out.push_str(&format!("Request ID: {}\n", request_id));
                    out.push_str(&format!("Request Kind: {:?}\n", request.kind));
                    out.push_str(&format!("Model: {}\n", request.model));
                    out.push_str(&format!(
                        "Max Output Tokens: {}\n",
                        request.max_output_tokens
                    ));
                    out.push_str(&format!("Reasoning Effort: {:?}\n", request.effort));
                    out.push_str(&format!(
                        "\nSYSTEM PROMPT:\n{}\n{}\n",
                        "-".repeat(40),
                        request.system_prompt
                    ));
                    out.push_str(&format!(
                        "\nUSER PROMPT:\n{}\n{}\n",
                        "-".repeat(40),
                        request.user_prompt
                    ));
                }
                AuditEntry::Response {
                    request_id,
                    timestamp,
                    duration_ms,
                    content,
                    usage,
                } => {
                    out.push_str(&format!("Timestamp: {}\n", timestamp.to_rfc3339()));
                    out.push_str("Type: RESPONSE\n");
                    out.push_str(&format!("Request ID: {}\n", request_id));
                    out.push_str(&format!("Duration: {}ms\n", duration_ms));
                    out.push_str(&format!(
                        "Usage: in={} out={} total={}\n",
                        usage.input_tokens, usage.output_tokens, usage.total_tokens
                    ));
                    out.push_str(&format!(
                        "\nRESPONSE CONTENT:\n{}\n{}\n",
                        "-".repeat(40),
                        content
                    ));
                }
                AuditEntry::Error {
                    request_id,
                    timestamp,
                    error,
                } => {
                    out.push_str(&format!("Timestamp: {}\n", timestamp.to_rfc3339()));
                    out.push_str("Type: ERROR\n");
                    out.push_str(&format!("Request ID: {}\n", request_id));
                    out.push_str(&format!("Error: {}\n", error));
                }
            }
            out.push_str(&format!("{}\n\n", "=".repeat(80)));
        }

        out
    }

    async fn load(&self) -> Vec<AuditEntry> {
        match self.store.get(STORAGE_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Audit log unreadable, starting empty: {}", e);
                vec![]
            }),
            Ok(None) => vec![],
            Err(e) => {
                warn!("Audit log read failed: {}", e);
                vec![]
            }
        }
    }

    async fn persist(&self, entries: &[AuditEntry]) -> Result<(), StorageError> {
        let value = serde_json::to_value(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(STORAGE_KEY, value).await
    }
}
