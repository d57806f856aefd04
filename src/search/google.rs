// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google Custom Search API provider
//!
//! Issues site-restricted queries against the Custom Search JSON API.
//! Requests go through the retrying client, so transient 5xx/429 responses
//! are retried with backoff before surfacing here.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchHit};
use crate::client::{ClientError, RetryingClient};

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search provider
pub struct GoogleSearchProvider {
    api_key: String,
    engine_id: String,
    client: Arc<RetryingClient>,
}

impl GoogleSearchProvider {
    pub fn new(api_key: String, engine_id: String, client: Arc<RetryingClient>) -> Self {
        Self {
            api_key,
            engine_id,
            client,
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search(
        &self,
        query: &str,
        site: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        debug!("Google CSE query \"{}\" on {}", query, site);

        let num = num_results.min(10).to_string();
        let response = self
            .client
            .execute(|c| {
                c.get(GOOGLE_CSE_URL).query(&[
                    ("key", self.api_key.as_str()),
                    ("cx", self.engine_id.as_str()),
                    ("q", query),
                    ("siteSearch", site),
                    ("num", num.as_str()),
                ])
            })
            .await
            .map_err(|e| match e {
                ClientError::Status { status, message } => SearchError::ApiError {
                    status,
                    message: extract_api_message(&message)
                        .unwrap_or_else(|| format!("Search API error ({})", status)),
                },
                other => SearchError::Network(other.to_string()),
            })?;

        let data: GoogleResponse = response.json().await.map_err(|e| SearchError::ApiError {
            status: 0,
            message: format!("JSON parse error: {}", e),
        })?;

        let hits: Vec<SearchHit> = data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet.unwrap_or_default(),
                display_site: item.display_link.unwrap_or_else(|| site.to_string()),
            })
            .collect();

        debug!("Google CSE returned {} results for {}", hits.len(), site);
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "google-cse"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty() && !self.engine_id.is_empty()
    }
}

/// Pull the human-readable message out of a Google error body when possible
fn extract_api_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

#[derive(Debug, serde::Deserialize)]
struct GoogleResponse {
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    title: String,
    link: String,
    snippet: Option<String>,
    display_link: Option<String>,
}
