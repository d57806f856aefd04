// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search for course and professor feedback
//!
//! A provider trait with a live Google Custom Search implementation and a
//! deterministic stub, driven by a resolver that degrades through
//! progressively looser query strategies.

mod google;
mod provider;
mod rate_limiter;
mod resolver;
mod stub;
mod types;

pub use google::GoogleSearchProvider;
pub use provider::SearchProvider;
pub use rate_limiter::SearchRateLimiter;
pub use resolver::SearchResolver;
pub use stub::StubSearchProvider;
pub use types::{QueryStrategy, SearchError, SearchHit, SiteSearchOutcome};
