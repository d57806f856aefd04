// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end pipeline tests against the stub providers

use std::sync::Arc;

use courselens::analyzer::{ProgressSink, TOTAL_STEPS};
use courselens::llm::AuditLog;
use courselens::{
    AnalyzerConfig, CourseAnalyzer, CourseIdentity, JsonFileStore, MemoryStore, RatingSource,
    RunStatus,
};
use tempfile::TempDir;

fn identity() -> CourseIdentity {
    CourseIdentity::new("CS 2130")
        .with_name("Computer Systems and Organization")
        .with_professor("Jane Doe")
}

#[tokio::test]
async fn stub_run_produces_aggregator_backed_rating() {
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), Arc::new(MemoryStore::new()));
    let run = analyzer.analyze(&identity(), &ProgressSink::noop()).await;

    assert_eq!(run.status, RunStatus::Completed);
    assert!(!run.from_cache);

    let result = run.result.expect("completed run carries a result");
    assert_eq!(result.rating_source, RatingSource::ExternalAggregator);
    assert_eq!(result.overall_rating, Some(4.5));
    assert!(result.rating_source_url.is_some());
    assert!(!result.sources.is_empty());
    assert!(!result.full_analysis.is_empty());
    assert!(!result.course_summary.is_empty());
}

#[tokio::test]
async fn progress_covers_all_stages_in_order() {
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), Arc::new(MemoryStore::new()));
    let (sink, mut rx) = ProgressSink::channel();
    analyzer.analyze(&identity(), &sink).await;
    drop(sink);

    let mut steps = vec![];
    while let Some(update) = rx.recv().await {
        assert_eq!(update.total_steps, TOTAL_STEPS);
        steps.push((update.step, update.completed));
    }

    assert_eq!(steps.first(), Some(&(1, false)));
    assert_eq!(steps.last(), Some(&(TOTAL_STEPS, true)));
    let step_numbers: Vec<u32> = steps.iter().map(|(s, _)| *s).collect();
    assert!(step_numbers.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn results_survive_restart_through_file_store() {
    let dir = TempDir::new().unwrap();

    let first_run = {
        let store = Arc::new(JsonFileStore::new(dir.path()));
        let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), store);
        analyzer.analyze(&identity(), &ProgressSink::noop()).await
    };
    assert!(!first_run.from_cache);

    // A fresh analyzer over the same directory sees the cached result
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), store);
    let second_run = analyzer.analyze(&identity(), &ProgressSink::noop()).await;

    assert_eq!(second_run.status, RunStatus::Completed);
    assert!(second_run.from_cache);
    assert_eq!(
        second_run.result.unwrap().overall_rating,
        first_run.result.unwrap().overall_rating
    );
}

#[tokio::test]
async fn different_professor_misses_the_cache() {
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), Arc::new(MemoryStore::new()));

    let doe = analyzer.analyze(&identity(), &ProgressSink::noop()).await;
    assert!(!doe.from_cache);

    let smith = CourseIdentity::new("CS 2130").with_professor("John Smith");
    let smith_run = analyzer.analyze(&smith, &ProgressSink::noop()).await;
    assert!(!smith_run.from_cache);

    // But an honorific variant of the same professor hits
    let titled = CourseIdentity::new("cs2130").with_professor("Prof. Jane Doe");
    let titled_run = analyzer.analyze(&titled, &ProgressSink::noop()).await;
    assert!(titled_run.from_cache);
}

#[tokio::test]
async fn audit_log_persists_model_traffic() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), store);
    analyzer.analyze(&identity(), &ProgressSink::noop()).await;

    assert!(!analyzer.audit().entries().await.is_empty());

    // Visible through an independent handle on the same directory
    let reopened = AuditLog::new(Arc::new(JsonFileStore::new(dir.path())));
    let entries = reopened.entries().await;
    assert!(!entries.is_empty());

    let dump = reopened.formatted().await;
    assert!(dump.contains("Type: REQUEST"));
    assert!(dump.contains("Type: RESPONSE"));
}

#[tokio::test]
async fn cache_stats_reflect_stored_runs() {
    let analyzer = CourseAnalyzer::new(AnalyzerConfig::default(), Arc::new(MemoryStore::new()));
    analyzer.analyze(&identity(), &ProgressSink::noop()).await;
    analyzer.analyze(&identity(), &ProgressSink::noop()).await;

    let stats = analyzer.cache().stats().await;
    assert_eq!(stats.total_entries, 1);
    assert_eq!(stats.active_entries, 1);
    assert_eq!(stats.hits, 1);
    assert!(stats.approx_size_bytes > 0);
}
