// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Progressive multi-strategy search resolution
//!
//! Queries are tried strictest-first: an exact-phrase professor match, then
//! an exact-phrase course match, then a loose combination of all terms. The
//! first strategy that yields results wins; provider errors propagate.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::provider::SearchProvider;
use super::rate_limiter::SearchRateLimiter;
use super::types::{QueryStrategy, SearchError, SearchHit, SiteSearchOutcome};
use crate::identity::CourseIdentity;

/// Resolves course feedback pages through a strategy ladder
pub struct SearchResolver {
    provider: Arc<dyn SearchProvider>,
    rate_limiter: SearchRateLimiter,
    num_results: usize,
}

impl SearchResolver {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        rate_limit_per_minute: u32,
        num_results: usize,
    ) -> Self {
        Self {
            provider,
            rate_limiter: SearchRateLimiter::new(rate_limit_per_minute),
            num_results,
        }
    }

    /// Search one site, degrading through the strategy ladder until a
    /// strategy yields at least one result.
    ///
    /// An empty result set falls through to the next strategy; a provider
    /// error does not and propagates to the caller.
    pub async fn search(
        &self,
        identity: &CourseIdentity,
        site: &str,
    ) -> Result<Vec<SearchHit>, SearchError> {
        debug!("Progressive search for {} on {}", identity.course_number, site);

        for strategy in self.applicable_strategies(identity) {
            let query = build_query(identity, strategy);
            debug!("Strategy {}: \"{}\"", strategy.label(), query);

            self.rate_limiter.check()?;
            let results = self
                .provider
                .search(&query, site, self.num_results)
                .await?;

            if !results.is_empty() {
                info!(
                    "Strategy {} found {} results on {}",
                    strategy.label(),
                    results.len(),
                    site
                );
                return Ok(results);
            }
            debug!("Strategy {} returned 0 results", strategy.label());
        }

        Ok(vec![])
    }

    /// Fan out across sites in parallel.
    ///
    /// Never fails as a whole: a failing site reports its own error in its
    /// outcome without aborting sibling searches.
    pub async fn search_multiple_sources(
        &self,
        identity: &CourseIdentity,
        sites: &[String],
    ) -> Vec<SiteSearchOutcome> {
        info!("Searching {} sources: {}", sites.len(), sites.join(", "));

        let futures: Vec<_> = sites
            .iter()
            .map(|site| async move {
                match self.search(identity, site).await {
                    Ok(results) => SiteSearchOutcome {
                        site: site.clone(),
                        results,
                        error: None,
                    },
                    Err(e) => {
                        warn!("Search failed for {}: {}", site, e);
                        SiteSearchOutcome {
                            site: site.clone(),
                            results: vec![],
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        let outcomes = join_all(futures).await;
        let ok = outcomes.iter().filter(|o| o.success()).count();
        info!("Completed {}/{} site searches", ok, sites.len());
        outcomes
    }

    fn applicable_strategies(&self, identity: &CourseIdentity) -> Vec<QueryStrategy> {
        let mut strategies = Vec::with_capacity(3);
        if identity.professor.is_some() {
            strategies.push(QueryStrategy::ProfessorRequired);
        }
        if !identity.course_number.trim().is_empty() {
            strategies.push(QueryStrategy::CourseRequired);
        }
        strategies.push(QueryStrategy::Normal);
        strategies
    }
}

/// Build the query string for a strategy.
///
/// `+"…"` marks an exact-phrase requirement for the search engine.
pub fn build_query(identity: &CourseIdentity, strategy: QueryStrategy) -> String {
    match strategy {
        QueryStrategy::ProfessorRequired => {
            let mut query = format!("+\"{}\"", identity.professor.as_deref().unwrap_or_default());
            if !identity.course_number.is_empty() {
                query.push(' ');
                query.push_str(&identity.course_number);
            }
            if let Some(name) = &identity.course_name {
                query.push(' ');
                query.push_str(name);
            }
            query
        }
        QueryStrategy::CourseRequired => {
            let mut query = format!("+\"{}\"", identity.course_number);
            if let Some(prof) = &identity.professor {
                query.push(' ');
                query.push_str(prof);
            }
            if let Some(name) = &identity.course_name {
                query.push(' ');
                query.push_str(name);
            }
            query
        }
        QueryStrategy::Normal => {
            let mut parts = Vec::new();
            if !identity.course_number.is_empty() {
                parts.push(identity.course_number.clone());
            }
            match &identity.professor {
                Some(prof) if prof != "N/A" => parts.push(prof.clone()),
                _ => {
                    if let Some(name) = &identity.course_name {
                        parts.push(name.clone());
                    }
                }
            }
            parts.join(" ")
        }
    }
}
