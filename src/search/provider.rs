// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;

use super::types::{SearchError, SearchHit};

/// Trait for implementing site-restricted web search
///
/// Providers run one query against one site. Strategy sequencing and
/// multi-site fan-out live in the resolver, not here.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a search restricted to a single site
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `site` - Site restriction, e.g. "thecourseforum.com"
    /// * `num_results` - Maximum number of results to return
    async fn search(
        &self,
        query: &str,
        site: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Whether the provider has what it needs (API key, etc.)
    fn is_available(&self) -> bool;
}
