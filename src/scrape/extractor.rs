// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML fetching and plain-text reduction
//!
//! Extraction is deliberately regex-based, not a DOM parse: script and
//! style blocks go first, then all remaining tags, then a fixed
//! entity table, then whitespace collapse and a hard length cap.

use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use url::Url;

use async_trait::async_trait;

use super::patterns::extract_embedded_rating;
use crate::client::RetryingClient;
use crate::rating::EmbeddedRating;

/// One page to scrape, carrying its search-result context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeTask {
    pub site: String,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Result of fetching and reducing one page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtract {
    pub url: String,
    pub site: String,
    pub title: String,
    /// Bounded plain text; empty on failure
    pub content: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only for recognized aggregator pages with a numeric rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_rating: Option<EmbeddedRating>,
}

/// Seam over page extraction; the pipeline only needs the batch form
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract_many(&self, tasks: &[ScrapeTask]) -> Vec<PageExtract>;
}

/// Fetches pages through the retrying client and reduces them to text
pub struct ContentExtractor {
    client: Arc<RetryingClient>,
    max_content_length: usize,
    aggregator_domains: Vec<String>,
}

impl ContentExtractor {
    pub fn new(
        client: Arc<RetryingClient>,
        max_content_length: usize,
        aggregator_domains: Vec<String>,
    ) -> Self {
        Self {
            client,
            max_content_length,
            aggregator_domains,
        }
    }

    /// Fetch and extract one page. A fetch failure yields `success: false`
    /// with the error message, never an Err.
    pub async fn extract(&self, task: &ScrapeTask) -> PageExtract {
        debug!("Scraping URL: {}", task.url);

        let html = match self.client.get_text(&task.url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to scrape {}: {}", task.url, e);
                return PageExtract {
                    url: task.url.clone(),
                    site: task.site.clone(),
                    title: task.title.clone(),
                    content: String::new(),
                    success: false,
                    error: Some(e.to_string()),
                    embedded_rating: None,
                };
            }
        };

        let content = extract_text(&html, self.max_content_length);
        let embedded_rating = self
            .aggregator_label(&task.url)
            .and_then(|label| extract_embedded_rating(&task.url, &html, &label));

        info!("Scraped {} chars from {}", content.len(), task.url);

        PageExtract {
            url: task.url.clone(),
            site: task.site.clone(),
            title: task.title.clone(),
            content,
            success: true,
            error: None,
            embedded_rating,
        }
    }

    /// Scrape many pages in parallel; results keep input order so callers
    /// can re-associate by task.
    pub async fn extract_many(&self, tasks: &[ScrapeTask]) -> Vec<PageExtract> {
        info!("Scraping {} URLs", tasks.len());
        let futures: Vec<_> = tasks.iter().map(|t| self.extract(t)).collect();
        let extracts = join_all(futures).await;

        let ok = extracts.iter().filter(|e| e.success).count();
        info!("Completed {}/{} scrapes", ok, tasks.len());
        extracts
    }

    /// Aggregator label when the URL's host matches a configured domain
    fn aggregator_label(&self, url: &str) -> Option<String> {
        let host = Url::parse(url).ok()?.host_str()?.to_lowercase();
        self.aggregator_domains
            .iter()
            .find(|domain| host == **domain || host.ends_with(&format!(".{}", domain)))
            .map(|domain| pretty_label(domain))
    }
}

#[async_trait]
impl PageExtractor for ContentExtractor {
    async fn extract_many(&self, tasks: &[ScrapeTask]) -> Vec<PageExtract> {
        ContentExtractor::extract_many(self, tasks).await
    }
}

pub(crate) fn pretty_label(domain: &str) -> String {
    // Known aggregators get their branded name
    if domain == "thecourseforum.com" {
        "theCourseForum".to_string()
    } else {
        domain.to_string()
    }
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap())
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&[#\w]+;").unwrap())
}

/// Reduce markup to plain text, capped at `max_chars` with a marker.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let without_scripts = script_re().replace_all(html, " ");
    let without_styles = style_re().replace_all(&without_scripts, " ");
    let without_tags = tag_re().replace_all(&without_styles, " ");
    let decoded = decode_entities(&without_tags);

    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > max_chars {
        let truncated: String = collapsed.chars().take(max_chars).collect();
        debug!(
            "Truncated content from {} to {} chars",
            collapsed.len(),
            max_chars
        );
        format!("{}...", truncated)
    } else {
        collapsed
    }
}

/// Decode the fixed entity table; unknown entities pass through unchanged.
fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &regex::Captures| {
            match caps.get(0).map(|m| m.as_str()).unwrap_or_default() {
                "&amp;" => "&",
                "&lt;" => "<",
                "&gt;" => ">",
                "&quot;" => "\"",
                "&#39;" => "'",
                "&nbsp;" => " ",
                other => other,
            }
            .to_string()
        })
        .to_string()
}
