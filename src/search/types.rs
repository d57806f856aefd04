// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for course feedback search

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Display form of the site the hit came from
    pub display_site: String,
}

/// Outcome of searching one site; a failing site carries its error instead
/// of aborting sibling searches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSearchOutcome {
    pub site: String,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteSearchOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Query construction strategies, tried strictest-first.
///
/// Phrase-anchoring on the professor (then the course) minimizes
/// false-positive matches before degrading to a loose search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStrategy {
    /// Exact-phrase match on the professor name required
    ProfessorRequired,
    /// Exact-phrase match on the course number required
    CourseRequired,
    /// All available identity terms, no phrase requirements
    Normal,
}

impl QueryStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProfessorRequired => "professor-required",
            Self::CourseRequired => "course-required",
            Self::Normal => "normal",
        }
    }
}

/// Errors from search providers
#[derive(Debug, Error)]
pub enum SearchError {
    /// API error from the search provider
    #[error("Search API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the provider
        message: String,
    },

    /// Rate limited locally before the provider was called
    #[error("Search rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Network-level failure after retries
    #[error("Search request failed: {0}")]
    Network(String),

    /// Provider has no credentials configured
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing credentials
        provider: String,
    },
}
