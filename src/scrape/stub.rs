// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic page extractor for stub mode and tests

use async_trait::async_trait;

use super::extractor::{pretty_label, PageExtract, PageExtractor, ScrapeTask};
use crate::rating::EmbeddedRating;

/// Returns canned page content without touching the network.
///
/// Aggregator course pages additionally carry an embedded rating, matching
/// what a live scrape of such a page would find.
pub struct StubPageExtractor {
    aggregator_domains: Vec<String>,
}

impl StubPageExtractor {
    pub fn new(aggregator_domains: Vec<String>) -> Self {
        Self { aggregator_domains }
    }

    fn aggregator_domain(&self, task: &ScrapeTask) -> Option<&str> {
        self.aggregator_domains
            .iter()
            .find(|domain| task.site.contains(domain.as_str()))
            .map(|domain| domain.as_str())
    }
}

#[async_trait]
impl PageExtractor for StubPageExtractor {
    async fn extract_many(&self, tasks: &[ScrapeTask]) -> Vec<PageExtract> {
        tasks
            .iter()
            .map(|task| {
                let embedded_rating = self
                    .aggregator_domain(task)
                    .filter(|_| task.url.contains("/course/"))
                    .map(|domain| EmbeddedRating {
                        overall: 4.5,
                        difficulty: Some(3.2),
                        source_label: pretty_label(domain),
                        source_url: task.url.clone(),
                    });

                PageExtract {
                    url: task.url.clone(),
                    site: task.site.clone(),
                    title: task.title.clone(),
                    content: format!(
                        "{} Students describe clear lectures, fair grading, and a \
                         steady workload with weekly assignments.",
                        task.snippet
                    ),
                    success: true,
                    error: None,
                    embedded_rating,
                }
            })
            .collect()
    }
}
