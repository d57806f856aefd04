// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline orchestration over search, scraping, and the model gateway

mod pipeline;
mod progress;

pub use pipeline::{AnalysisRun, AnalyzerError, CourseAnalyzer, RunStatus};
pub use progress::{ProgressSink, ProgressUpdate, TOTAL_STEPS};
