// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request/response types for model-mediated operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of the three pipeline operations a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    ContentFiltering,
    PageSummarization,
    FinalRating,
}

impl RequestKind {
    /// Reasoning-effort tier for this operation
    pub fn effort(&self) -> ReasoningEffort {
        match self {
            // Filtering and final rating need more careful analysis
            Self::ContentFiltering => ReasoningEffort::Low,
            Self::PageSummarization => ReasoningEffort::Minimal,
            Self::FinalRating => ReasoningEffort::Low,
        }
    }

    /// Output-token budget for this operation
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            Self::ContentFiltering => 150,
            Self::PageSummarization => 300,
            Self::FinalRating => 500,
        }
    }
}

/// Reasoning-effort tier passed to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
}

/// One model request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    pub kind: RequestKind,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_output_tokens: u32,
    pub effort: ReasoningEffort,
}

/// Token usage counters reported by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    // Aliases accept the provider's snake_case wire form
    #[serde(default, alias = "input_tokens")]
    pub input_tokens: u64,
    #[serde(default, alias = "output_tokens")]
    pub output_tokens: u64,
    #[serde(default, alias = "total_tokens")]
    pub total_tokens: u64,
}

/// One model response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    pub content: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// A (source, summary) pair fed into final-rating synthesis
#[derive(Debug, Clone)]
pub struct SourceSummary {
    /// Site the summary came from
    pub source: String,
    pub summary: String,
}

/// Errors from the model provider; single attempt, never retried here
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider returned a non-success status
    #[error("Model API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider's error message
        message: String,
    },

    /// Network-level failure
    #[error("Model API call failed: {0}")]
    Network(String),

    /// Response arrived but its shape was not usable
    #[error("Failed to extract content from model response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effort_per_kind() {
        assert_eq!(RequestKind::ContentFiltering.effort(), ReasoningEffort::Low);
        assert_eq!(
            RequestKind::PageSummarization.effort(),
            ReasoningEffort::Minimal
        );
        assert_eq!(RequestKind::FinalRating.effort(), ReasoningEffort::Low);
    }

    #[test]
    fn test_token_budget_per_kind() {
        assert_eq!(RequestKind::ContentFiltering.max_output_tokens(), 150);
        assert_eq!(RequestKind::PageSummarization.max_output_tokens(), 300);
        assert_eq!(RequestKind::FinalRating.max_output_tokens(), 500);
    }

    #[test]
    fn test_effort_serialization() {
        assert_eq!(
            serde_json::to_string(&ReasoningEffort::Minimal).unwrap(),
            "\"minimal\""
        );
        assert_eq!(
            serde_json::to_string(&ReasoningEffort::Low).unwrap(),
            "\"low\""
        );
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&RequestKind::ContentFiltering).unwrap(),
            "\"CONTENT_FILTERING\""
        );
    }

    #[test]
    fn test_usage_defaults_when_absent() {
        let usage: TokenUsage = serde_json::from_str("{}").unwrap();
        assert_eq!(usage.total_tokens, 0);
    }
}
