// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the course analysis pipeline

use std::env;

/// Top-level configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Google Custom Search configuration
    pub search: SearchConfig,
    /// Language-model provider configuration
    pub llm: LlmConfig,
    /// Result cache configuration
    pub cache: CacheConfig,
    /// Sites searched for course feedback
    pub sites: Vec<String>,
    /// Domains treated as rating aggregators during scraping
    pub aggregator_domains: Vec<String>,
    /// Maximum characters of page text kept after extraction
    pub max_content_length: usize,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
}

/// Google Custom Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// API key, absent in stub mode
    pub api_key: Option<String>,
    /// Custom search engine id
    pub engine_id: Option<String>,
    /// Results requested per query
    pub num_results: usize,
    /// Search requests allowed per minute
    pub rate_limit_per_minute: u32,
}

/// Language-model provider configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key, absent in stub mode
    pub api_key: Option<String>,
    /// Model id used for all three operations
    pub model: String,
}

/// Result cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entry time-to-live in days
    pub ttl_days: i64,
    /// Hard cap on live entries
    pub max_entries: usize,
    /// Entry count that triggers a cleanup sweep
    pub cleanup_threshold: usize,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            search: SearchConfig {
                api_key: non_empty(env::var("GOOGLE_SEARCH_API_KEY").ok()),
                engine_id: non_empty(env::var("GOOGLE_SEARCH_ENGINE_ID").ok()),
                num_results: parse_or("SEARCH_NUM_RESULTS", 5),
                rate_limit_per_minute: parse_or("SEARCH_RATE_LIMIT_PER_MINUTE", 60),
            },
            llm: LlmConfig {
                api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
                model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-5-mini".to_string()),
            },
            cache: CacheConfig {
                ttl_days: parse_or("CACHE_TTL_DAYS", 7),
                max_entries: parse_or("CACHE_MAX_ENTRIES", 50),
                cleanup_threshold: parse_or("CACHE_CLEANUP_THRESHOLD", 60),
            },
            sites: env::var("FEEDBACK_SITES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| default_sites()),
            aggregator_domains: vec!["thecourseforum.com".to_string()],
            max_content_length: parse_or("MAX_CONTENT_LENGTH", 5000),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 15),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.ttl_days <= 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }
        if self.cache.max_entries == 0 {
            return Err("Cache max entries must be greater than 0".to_string());
        }
        if self.sites.is_empty() {
            return Err("At least one feedback site must be configured".to_string());
        }
        if self.max_content_length == 0 {
            return Err("Max content length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Whether both the search and model providers have credentials.
    ///
    /// Without full credentials the analyzer falls back to deterministic
    /// stub services.
    pub fn has_live_credentials(&self) -> bool {
        self.search.api_key.is_some()
            && self.search.engine_id.is_some()
            && self.llm.api_key.is_some()
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                api_key: None,
                engine_id: None,
                num_results: 5,
                rate_limit_per_minute: 60,
            },
            llm: LlmConfig {
                api_key: None,
                model: "gpt-5-mini".to_string(),
            },
            cache: CacheConfig {
                ttl_days: 7,
                max_entries: 50,
                cleanup_threshold: 60,
            },
            sites: default_sites(),
            aggregator_domains: vec!["thecourseforum.com".to_string()],
            max_content_length: 5000,
            request_timeout_secs: 15,
        }
    }
}

fn default_sites() -> Vec<String> {
    vec!["thecourseforum.com".to_string(), "reddit.com/r/uva".to_string()]
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.cache.ttl_days, 7);
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.cache.cleanup_threshold, 60);
        assert_eq!(config.max_content_length, 5000);
        assert_eq!(config.sites.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_credentials_means_stub_mode() {
        let config = AnalyzerConfig::default();
        assert!(!config.has_live_credentials());
    }

    #[test]
    fn test_full_credentials() {
        let mut config = AnalyzerConfig::default();
        config.search.api_key = Some("key".to_string());
        config.search.engine_id = Some("cx".to_string());
        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.has_live_credentials());
    }

    #[test]
    fn test_partial_credentials_still_stub() {
        let mut config = AnalyzerConfig::default();
        config.search.api_key = Some("key".to_string());
        assert!(!config.has_live_credentials());
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let mut config = AnalyzerConfig::default();
        config.cache.ttl_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_sites() {
        let mut config = AnalyzerConfig::default();
        config.sites.clear();
        assert!(config.validate().is_err());
    }
}
