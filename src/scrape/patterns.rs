// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedded-rating extraction from aggregator markup
//!
//! Pattern rules are an ordered table evaluated until first match, so new
//! source formats are additive rather than more nesting.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::rating::EmbeddedRating;

/// Ordered patterns for the overall rating; first match wins
const OVERALL_PATTERNS: &[&str] = &[
    r"(?i)Overall\s*Rating[:\s]+(\d+(?:\.\d+)?)\s*/\s*5",
    r"(?i)Rating[:\s]+(\d+(?:\.\d+)?)\s*/\s*5",
    r#"(?i)<span[^>]*class="[^"]*rating[^"]*"[^>]*>(\d+(?:\.\d+)?)</span>"#,
    r"(?i)Overall[:\s]+(\d+(?:\.\d+)?)",
];

/// Ordered patterns for the difficulty rating
const DIFFICULTY_PATTERNS: &[&str] = &[
    r"(?i)Difficulty[:\s]+(\d+(?:\.\d+)?)\s*/\s*5",
    r"(?i)Difficulty\s*Rating[:\s]+(\d+(?:\.\d+)?)",
    r#"(?i)<span[^>]*class="[^"]*difficulty[^"]*"[^>]*>(\d+(?:\.\d+)?)</span>"#,
];

fn overall_regexes() -> &'static Vec<Regex> {
    static SET: OnceLock<Vec<Regex>> = OnceLock::new();
    SET.get_or_init(|| {
        OVERALL_PATTERNS
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

fn difficulty_regexes() -> &'static Vec<Regex> {
    static SET: OnceLock<Vec<Regex>> = OnceLock::new();
    SET.get_or_init(|| {
        DIFFICULTY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

/// Try to find an embedded rating in aggregator markup.
///
/// Returns Some only when an overall rating matched; difficulty is optional.
pub fn extract_embedded_rating(
    url: &str,
    html: &str,
    source_label: &str,
) -> Option<EmbeddedRating> {
    let overall = first_match(overall_regexes(), html)?;
    let difficulty = first_match(difficulty_regexes(), html);

    debug!(
        "Found embedded rating {}/5.0 (difficulty: {:?}) at {}",
        overall, difficulty, url
    );

    Some(EmbeddedRating {
        overall,
        difficulty,
        source_label: source_label.to_string(),
        source_url: url.to_string(),
    })
}

fn first_match(regexes: &[Regex], html: &str) -> Option<f64> {
    regexes.iter().find_map(|re| {
        re.captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}
