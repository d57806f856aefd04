// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page fetching and best-effort text extraction
//!
//! Reduces raw markup to bounded plain text and, for recognized rating
//! aggregators, pulls an embedded numeric rating straight out of the markup.

mod extractor;
mod patterns;
mod stub;

pub use extractor::{extract_text, ContentExtractor, PageExtract, PageExtractor, ScrapeTask};
pub use patterns::extract_embedded_rating;
pub use stub::StubPageExtractor;
