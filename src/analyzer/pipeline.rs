// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Four-stage analysis pipeline: search, scrape, summarize, synthesize
//!
//! Stage failures degrade per item wherever possible; only a total absence
//! of evidence or a failed final synthesis aborts a run. A numeric rating
//! scraped from a recognized aggregator always outranks a model-derived one.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::progress::{ProgressSink, TOTAL_STEPS};
use crate::cache::ResultCache;
use crate::client::{RetryPolicy, RetryingClient};
use crate::config::AnalyzerConfig;
use crate::identity::CourseIdentity;
use crate::llm::{
    AuditLog, LlmError, LlmGateway, LlmProvider, OpenAiProvider, SourceSummary, StubLlmProvider,
};
use crate::rating::{
    parse_rating_response, EmbeddedRating, FinalRating, ParsedRating, RatingSource, SourceRef,
};
use crate::scrape::{ContentExtractor, PageExtractor, ScrapeTask, StubPageExtractor};
use crate::search::{GoogleSearchProvider, SearchProvider, SearchResolver, StubSearchProvider};
use crate::storage::KeyValueStore;

/// Model calls get a longer deadline than page fetches
const LLM_TIMEOUT_SECS: u64 = 60;

/// Label attached to ratings synthesized under the scoring rubric
const RUBRIC_LABEL: &str = "Scoring Rubric";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Course number is required")]
    MissingCourseNumber,

    /// Nothing usable survived search, scraping, and filtering
    #[error("No relevant course feedback found for {course} ({professor})")]
    NoEvidence { course: String, professor: String },

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Lifecycle state of one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Processing,
    Completed,
    Error,
}

/// Terminal record of one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub identity: CourseIdentity,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FinalRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Orchestrates the full pipeline over injected providers
pub struct CourseAnalyzer {
    config: AnalyzerConfig,
    cache: ResultCache,
    resolver: SearchResolver,
    extractor: Arc<dyn PageExtractor>,
    gateway: LlmGateway,
    audit: Arc<AuditLog>,
}

impl CourseAnalyzer {
    /// Build an analyzer, selecting live or stub providers by credential
    /// presence. Missing credentials never fail construction; the stub
    /// providers produce deterministic results instead.
    pub fn new(config: AnalyzerConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let client = Arc::new(RetryingClient::new(
            RetryPolicy::default(),
            config.request_timeout_secs,
        ));

        let (search, extractor, llm): (
            Arc<dyn SearchProvider>,
            Arc<dyn PageExtractor>,
            Arc<dyn LlmProvider>,
        ) = match (
            &config.search.api_key,
            &config.search.engine_id,
            &config.llm.api_key,
        ) {
            (Some(key), Some(engine_id), Some(llm_key)) => {
                info!("Live search and model providers configured");
                (
                    Arc::new(GoogleSearchProvider::new(
                        key.clone(),
                        engine_id.clone(),
                        client.clone(),
                    )),
                    Arc::new(ContentExtractor::new(
                        client,
                        config.max_content_length,
                        config.aggregator_domains.clone(),
                    )),
                    Arc::new(OpenAiProvider::new(llm_key.clone(), LLM_TIMEOUT_SECS)),
                )
            }
            _ => {
                info!("Credentials missing, running with stub providers");
                (
                    Arc::new(StubSearchProvider::new()),
                    Arc::new(StubPageExtractor::new(config.aggregator_domains.clone())),
                    Arc::new(StubLlmProvider),
                )
            }
        };

        Self::with_components(config, store, search, extractor, llm)
    }

    /// Wire the analyzer from explicit components.
    pub fn with_components(
        config: AnalyzerConfig,
        store: Arc<dyn KeyValueStore>,
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn PageExtractor>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let audit = Arc::new(AuditLog::new(store.clone()));
        let resolver = SearchResolver::new(
            search,
            config.search.rate_limit_per_minute,
            config.search.num_results,
        );
        let gateway = LlmGateway::new(llm, audit.clone(), config.llm.model.clone());
        let cache = ResultCache::new(store, config.cache.clone());

        Self {
            config,
            cache,
            resolver,
            extractor,
            gateway,
            audit,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run the full pipeline for one course.
    ///
    /// Never panics and never returns Err: all failures collapse into a run
    /// with `RunStatus::Error` and a message.
    pub async fn analyze(&self, identity: &CourseIdentity, progress: &ProgressSink) -> AnalysisRun {
        let started_at = Utc::now();
        info!(
            "Analyzing {} ({})",
            identity.course_number,
            identity.professor_or_na()
        );

        match self.run(identity, progress).await {
            Ok((result, from_cache)) => AnalysisRun {
                identity: identity.clone(),
                status: RunStatus::Completed,
                result: Some(result),
                error: None,
                from_cache,
                started_at,
                finished_at: Utc::now(),
            },
            Err(e) => {
                error!("Analysis failed for {}: {}", identity.course_number, e);
                AnalysisRun {
                    identity: identity.clone(),
                    status: RunStatus::Error,
                    result: None,
                    error: Some(e.to_string()),
                    from_cache: false,
                    started_at,
                    finished_at: Utc::now(),
                }
            }
        }
    }

    async fn run(
        &self,
        identity: &CourseIdentity,
        progress: &ProgressSink,
    ) -> Result<(FinalRating, bool), AnalyzerError> {
        if identity.course_number.trim().is_empty() {
            return Err(AnalyzerError::MissingCourseNumber);
        }

        if let Some(cached) = self.cache.get(identity).await {
            progress.emit("Loaded result from cache", TOTAL_STEPS, true);
            return Ok((cached, true));
        }

        // Stage 1: search every configured site in parallel
        progress.emit("Searching course feedback sites", 1, false);
        let outcomes = self
            .resolver
            .search_multiple_sources(identity, &self.config.sites)
            .await;

        let tasks: Vec<ScrapeTask> = outcomes
            .iter()
            .flat_map(|outcome| {
                outcome.results.iter().map(|hit| ScrapeTask {
                    site: outcome.site.clone(),
                    url: hit.url.clone(),
                    title: hit.title.clone(),
                    snippet: hit.snippet.clone(),
                })
            })
            .collect();

        if tasks.is_empty() {
            return Err(self.no_evidence(identity));
        }

        // Stage 2: scrape the found pages
        progress.emit(format!("Reading {} pages", tasks.len()), 2, false);
        let extracts = self.extractor.extract_many(&tasks).await;

        // An aggregator's own number outranks anything the model derives
        let embedded: Option<EmbeddedRating> = extracts
            .iter()
            .find_map(|e| e.embedded_rating.clone());

        // Stage 3: filter and summarize each usable page
        progress.emit("Filtering and summarizing feedback", 3, false);
        let summary_futures = extracts
            .iter()
            .filter(|e| e.success && !e.content.is_empty())
            .map(|extract| async move {
                let filtered = self
                    .gateway
                    .filter_relevant(&extract.content, identity)
                    .await;
                if filtered.is_empty() {
                    return None;
                }
                match self
                    .gateway
                    .summarize_page(&filtered, &extract.url, identity)
                    .await
                {
                    Ok(summary) => Some((
                        SourceSummary {
                            source: extract.site.clone(),
                            summary,
                        },
                        SourceRef {
                            title: extract.title.clone(),
                            url: extract.url.clone(),
                            source: extract.site.clone(),
                        },
                    )),
                    Err(e) => {
                        warn!("Summarization failed for {}: {}", extract.url, e);
                        None
                    }
                }
            });

        let (summaries, sources): (Vec<SourceSummary>, Vec<SourceRef>) = join_all(summary_futures)
            .await
            .into_iter()
            .flatten()
            .unzip();

        if summaries.is_empty() && embedded.is_none() {
            return Err(self.no_evidence(identity));
        }

        // Stage 4: synthesize the final rating text. The rubric only applies
        // when no aggregator supplied the numbers.
        progress.emit("Synthesizing final rating", 4, false);
        let use_rubric = embedded.is_none();
        let analysis = self
            .gateway
            .synthesize_rating(&summaries, identity, use_rubric)
            .await?;
        let parsed = parse_rating_response(&analysis);
        let result = assemble_rating(parsed, embedded, sources);

        if let Err(e) = self.cache.set(identity, result.clone()).await {
            warn!("Failed to cache result: {}", e);
        }

        progress.emit("Analysis complete", TOTAL_STEPS, true);
        Ok((result, false))
    }

    fn no_evidence(&self, identity: &CourseIdentity) -> AnalyzerError {
        AnalyzerError::NoEvidence {
            course: identity.course_number.clone(),
            professor: identity.professor_or_na().to_string(),
        }
    }
}

/// Combine parsed model output with an optional aggregator rating.
fn assemble_rating(
    parsed: ParsedRating,
    embedded: Option<EmbeddedRating>,
    sources: Vec<SourceRef>,
) -> FinalRating {
    let (overall, difficulty, source, label, url) = match embedded {
        // The aggregator owns both numbers; a difficulty it did not publish
        // stays absent rather than being filled from the model
        Some(emb) => (
            Some(emb.overall),
            emb.difficulty,
            RatingSource::ExternalAggregator,
            emb.source_label,
            Some(emb.source_url),
        ),
        None => (
            parsed.overall_rating,
            parsed.difficulty_rating,
            RatingSource::ModelRubric,
            RUBRIC_LABEL.to_string(),
            None,
        ),
    };

    FinalRating {
        overall_rating: overall,
        difficulty_rating: difficulty,
        course_summary: parsed.course_summary,
        professor_summary: parsed.professor_summary,
        rating_source: source,
        rating_source_label: label,
        rating_source_url: url,
        sources,
        full_analysis: parsed.full_analysis,
        generated_at: Utc::now(),
    }
}
