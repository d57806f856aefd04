// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model-mediated operations: filtering, summarization, rating synthesis

pub mod audit;
pub mod gateway;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod stub;
pub mod types;

pub use audit::{AuditEntry, AuditLog};
pub use gateway::LlmGateway;
pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use stub::StubLlmProvider;
pub use types::{
    LlmError, LlmRequest, LlmResponse, ReasoningEffort, RequestKind, SourceSummary, TokenUsage,
};
