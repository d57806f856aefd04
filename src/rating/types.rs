// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Terminal rating artifact stored in the cache and returned to callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the numeric scores came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingSource {
    /// Numeric rating scraped directly from a recognized aggregator site
    ExternalAggregator,
    /// Rating synthesized by the model under the scoring rubric
    ModelRubric,
}

/// Attribution for one page that fed the analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    /// Site the page came from, e.g. "thecourseforum.com"
    pub source: String,
}

/// Numeric rating found directly in scraped aggregator markup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedRating {
    pub overall: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// Human-readable aggregator name
    pub source_label: String,
    pub source_url: String,
}

/// The terminal artifact of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalRating {
    /// Overall rating on a 1-5 scale; None when unparsable
    pub overall_rating: Option<f64>,
    /// Difficulty rating on a 1-5 scale; None when unparsable or absent
    pub difficulty_rating: Option<f64>,
    /// Narrative about the course content
    pub course_summary: String,
    /// Narrative about the professor
    pub professor_summary: String,
    pub rating_source: RatingSource,
    /// Label shown next to the score, e.g. "theCourseForum"
    pub rating_source_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_source_url: Option<String>,
    /// Pages that contributed to the analysis
    pub sources: Vec<SourceRef>,
    /// Raw model output, preserved verbatim for auditability
    pub full_analysis: String,
    pub generated_at: DateTime<Utc>,
}
