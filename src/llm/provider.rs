// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model provider abstraction

use async_trait::async_trait;

use crate::llm::types::{LlmError, LlmRequest, LlmResponse};

/// A backend able to complete model requests.
///
/// One attempt per call; providers never retry internally.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
