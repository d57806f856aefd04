// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyzer;
pub mod cache;
pub mod client;
pub mod config;
pub mod identity;
pub mod llm;
pub mod rating;
pub mod scrape;
pub mod search;
pub mod storage;

// Re-export the types most callers need
pub use analyzer::{AnalysisRun, AnalyzerError, CourseAnalyzer, ProgressSink, RunStatus};
pub use cache::{CacheStats, ResultCache};
pub use config::AnalyzerConfig;
pub use identity::CourseIdentity;
pub use rating::{FinalRating, RatingSource};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
