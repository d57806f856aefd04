// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI Responses API provider
//!
//! Each call is a single attempt; the surrounding pipeline treats a model
//! failure as a per-page degradation, not something to retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::llm::provider::LlmProvider;
use crate::llm::types::{LlmError, LlmRequest, LlmResponse, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), timeout_secs)
    }

    pub fn with_base_url(api_key: String, base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url,
            client,
        }
    }

    fn build_body(&self, request: &LlmRequest) -> serde_json::Value {
        json!({
            "model": request.model,
            "input": [
                {
                    "role": "developer",
                    "content": [{ "type": "input_text", "text": request.system_prompt }]
                },
                {
                    "role": "user",
                    "content": [{ "type": "input_text", "text": request.user_prompt }]
                }
            ],
            "text": {
                "format": { "type": "text" },
                "verbosity": "medium"
            },
            "reasoning": { "effort": request.effort },
            "max_output_tokens": request.max_output_tokens,
            "tools": [],
            "store": true
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/responses", self.base_url);
        debug!("Model call: {:?} via {}", request.kind, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_api_message(&body),
            });
        }

        let parsed: ResponsesApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let content = extract_output_text(&parsed)
            .ok_or_else(|| LlmError::MalformedResponse("no assistant output_text".to_string()))?;

        Ok(LlmResponse {
            content,
            usage: parsed.usage.unwrap_or_default(),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Assistant text lives at output[].content[] with type "output_text"
fn extract_output_text(response: &ResponsesApiResponse) -> Option<String> {
    response
        .output
        .iter()
        .filter(|item| item.role.as_deref() == Some("assistant"))
        .flat_map(|item| item.content.iter())
        .find(|part| part.kind == "output_text")
        .map(|part| part.text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn extract_api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
