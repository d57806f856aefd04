// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Audited gateway over the model provider
//!
//! All model traffic goes through here so every request and outcome lands
//! in the audit log. Filtering degrades gracefully: on any model failure
//! the original content is passed through untouched.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::identity::CourseIdentity;
use crate::llm::audit::{AuditEntry, AuditLog};
use crate::llm::prompts;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{LlmError, LlmRequest, LlmResponse, RequestKind, SourceSummary};

pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    audit: Arc<AuditLog>,
    model: String,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, audit: Arc<AuditLog>, model: String) -> Self {
        Self {
            provider,
            audit,
            model,
        }
    }

    /// Extract only the passages relevant to this course and professor.
    ///
    /// The model's no-content sentinel maps to an empty string. Any model
    /// failure returns the original content unchanged so one flaky call
    /// cannot drop a source.
    pub async fn filter_relevant(&self, content: &str, identity: &CourseIdentity) -> String {
        let request = self.build_request(
            RequestKind::ContentFiltering,
            prompts::filter_system_prompt(),
            prompts::filter_user_prompt(content, identity),
        );

        match self.call(request).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.contains(prompts::NO_RELEVANT_INFORMATION) {
                    debug!("Filter found no relevant content");
                    String::new()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!("Content filtering failed, using unfiltered content: {}", e);
                content.to_string()
            }
        }
    }

    /// Summarize one page's filtered content.
    pub async fn summarize_page(
        &self,
        content: &str,
        url: &str,
        identity: &CourseIdentity,
    ) -> Result<String, LlmError> {
        let user_prompt = format!(
            "{}\nSOURCE_URL: {}",
            prompts::summary_user_prompt(content, identity),
            url
        );
        let request = self.build_request(
            RequestKind::PageSummarization,
            prompts::summary_system_prompt(),
            user_prompt,
        );

        let response = self.call(request).await?;
        Ok(response.content)
    }

    /// Synthesize the final rating text from per-source summaries.
    ///
    /// `use_rubric` adds the numeric scoring rubric; callers omit it when an
    /// aggregator already supplied the numbers.
    pub async fn synthesize_rating(
        &self,
        summaries: &[SourceSummary],
        identity: &CourseIdentity,
        use_rubric: bool,
    ) -> Result<String, LlmError> {
        let request = self.build_request(
            RequestKind::FinalRating,
            prompts::rating_system_prompt(),
            prompts::rating_user_prompt(summaries, identity, use_rubric),
        );

        let response = self.call(request).await?;
        Ok(response.content)
    }

    fn build_request(
        &self,
        kind: RequestKind,
        system_prompt: String,
        user_prompt: String,
    ) -> LlmRequest {
        LlmRequest {
            kind,
            model: self.model.clone(),
            system_prompt,
            user_prompt,
            max_output_tokens: kind.max_output_tokens(),
            effort: kind.effort(),
        }
    }

    /// Single audited provider call.
    async fn call(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let request_id = Uuid::new_v4();
        self.audit
            .append(AuditEntry::Request {
                request_id,
                timestamp: Utc::now(),
                request: request.clone(),
            })
            .await;

        let started = Instant::now();
        match self.provider.complete(&request).await {
            Ok(response) => {
                self.audit
                    .append(AuditEntry::Response {
                        request_id,
                        timestamp: Utc::now(),
                        duration_ms: started.elapsed().as_millis() as u64,
                        content: response.content.clone(),
                        usage: response.usage.clone(),
                    })
                    .await;
                Ok(response)
            }
            Err(e) => {
                self.audit
                    .append(AuditEntry::Error {
                        request_id,
                        timestamp: Utc::now(),
                        error: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::TokenUsage;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider scripted with a queue of responses
    struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, LlmError>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            let next = self.responses.lock().unwrap().remove(0);
            next.map(|content| LlmResponse {
                content,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn gateway(responses: Vec<Result<String, LlmError>>) -> (LlmGateway, Arc<AuditLog>) {
        let audit = Arc::new(AuditLog::new(Arc::new(MemoryStore::new())));
        let gateway = LlmGateway::new(
            Arc::new(ScriptedLlm::new(responses)),
            audit.clone(),
            "gpt-5-mini".to_string(),
        );
        (gateway, audit)
    }

    fn identity() -> CourseIdentity {
        CourseIdentity::new("CS 2130").with_professor("Jane Doe")
    }

    #[tokio::test]
    async fn test_filter_passes_relevant_text() {
        let (gw, _) = gateway(vec![Ok("The course is great.".to_string())]);
        let out = gw.filter_relevant("page text", &identity()).await;
        assert_eq!(out, "The course is great.");
    }

    #[tokio::test]
    async fn test_filter_sentinel_maps_to_empty() {
        let (gw, _) = gateway(vec![Ok("NO RELEVANT INFORMATION".to_string())]);
        let out = gw.filter_relevant("page text", &identity()).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_filter_error_degrades_to_original() {
        let (gw, _) = gateway(vec![Err(LlmError::Api {
            status: 500,
            message: "server error".to_string(),
        })]);
        let out = gw.filter_relevant("original page text", &identity()).await;
        assert_eq!(out, "original page text");
    }

    #[tokio::test]
    async fn test_summarize_appends_source_url() {
        let (gw, audit) = gateway(vec![Ok("SUMMARY: fine".to_string())]);
        gw.summarize_page("content", "https://a.com/review", &identity())
            .await
            .unwrap();

        let entries = audit.entries().await;
        let AuditEntry::Request { request, .. } = &entries[0] else {
            panic!("expected request entry");
        };
        assert!(request
            .user_prompt
            .ends_with("SOURCE_URL: https://a.com/review"));
    }

    #[tokio::test]
    async fn test_every_call_audited_request_and_response() {
        let (gw, audit) = gateway(vec![Ok("out".to_string())]);
        gw.synthesize_rating(&[], &identity(), true).await.unwrap();

        let entries = audit.entries().await;
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], AuditEntry::Request { .. }));
        assert!(matches!(entries[1], AuditEntry::Response { .. }));
    }

    #[tokio::test]
    async fn test_failures_audited() {
        let (gw, audit) = gateway(vec![Err(LlmError::Network("timeout".to_string()))]);
        let result = gw.synthesize_rating(&[], &identity(), false).await;
        assert!(result.is_err());

        let entries = audit.entries().await;
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[1], AuditEntry::Error { .. }));
    }

    #[tokio::test]
    async fn test_rubric_flag_controls_prompt() {
        let (gw, audit) = gateway(vec![Ok("out".to_string()), Ok("out".to_string())]);
        gw.synthesize_rating(&[], &identity(), true).await.unwrap();
        gw.synthesize_rating(&[], &identity(), false).await.unwrap();

        let entries = audit.entries().await;
        let AuditEntry::Request { request: with, .. } = &entries[0] else {
            panic!("expected request entry");
        };
        let AuditEntry::Request { request: without, .. } = &entries[2] else {
            panic!("expected request entry");
        };
        assert!(with.user_prompt.contains("RIGOROUS RATING RUBRIC"));
        assert!(!without.user_prompt.contains("RIGOROUS RATING RUBRIC"));
    }
}
