// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic search provider for stub mode and tests

use async_trait::async_trait;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchHit};

/// Canned two-result provider used when no search credentials are configured
#[derive(Default)]
pub struct StubSearchProvider;

impl StubSearchProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for StubSearchProvider {
    async fn search(
        &self,
        query: &str,
        site: &str,
        _num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(vec![
            SearchHit {
                title: format!("{} - student reviews on {}", query, site),
                url: format!("https://{}/course/stub", site),
                snippet: format!(
                    "Student reviews and ratings for {}. Overall rating: 4.5/5. \
                     Students praise the teaching style and course organization.",
                    query
                ),
                display_site: site.to_string(),
            },
            SearchHit {
                title: format!("Review thread: {}", query),
                url: format!("https://{}/professor/stub", site),
                snippet: format!(
                    "Detailed review for {}. Great lectures, fair grading, \
                     manageable workload.",
                    query
                ),
                display_site: site.to_string(),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_available(&self) -> bool {
        true
    }
}
