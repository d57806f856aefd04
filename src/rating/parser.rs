// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tolerant parsing of the model's final-rating output
//!
//! The synthesis prompt demands a fixed template but the model does not
//! always comply; every field degrades to None/empty instead of failing,
//! and the raw text is kept verbatim.

use regex::Regex;
use std::sync::OnceLock;

/// Structured fields recovered from free-form model output
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRating {
    pub overall_rating: Option<f64>,
    pub difficulty_rating: Option<f64>,
    pub course_summary: String,
    pub professor_summary: String,
    /// The input text, unchanged
    pub full_analysis: String,
}

fn overall_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)OVERALL RATING:\s*(\d+(?:\.\d+)?)").unwrap())
}

fn difficulty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)DIFFICULTY RATING:\s*(\d+(?:\.\d+)?)").unwrap())
}

fn course_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Non-greedy capture up to the next known section label or end of text
        Regex::new(r"(?is)COURSE CONTENT SUMMARY:\s*(.*?)(?:PROFESSOR SUMMARY:|KEY STRENGTHS:|\z)")
            .unwrap()
    })
}

fn professor_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)PROFESSOR SUMMARY:\s*(.*?)(?:KEY STRENGTHS:|\z)").unwrap()
    })
}

/// Parse a final-rating response into structured fields.
///
/// Never fails: missing or malformed fields come back as None or empty.
pub fn parse_rating_response(response: &str) -> ParsedRating {
    let overall_rating = capture_number(overall_re(), response);
    let difficulty_rating = capture_number(difficulty_re(), response);
    let course_summary = capture_section(course_summary_re(), response);
    let professor_summary = capture_section(professor_summary_re(), response);

    ParsedRating {
        overall_rating,
        difficulty_rating,
        course_summary,
        professor_summary,
        full_analysis: response.to_string(),
    }
}

fn capture_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn capture_section(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
