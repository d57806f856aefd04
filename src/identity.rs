// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Course identity and cache-key normalization

use serde::{Deserialize, Serialize};

/// Identity of a (course, instructor) pair as extracted from a catalog page.
///
/// Immutable once handed to the analysis pipeline; only the extraction layer
/// that produced it may fill in fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseIdentity {
    /// Course code, e.g. "CS 2130"
    pub course_number: String,
    /// Full course title, e.g. "Computer Systems and Organization"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    /// Instructor name if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    /// Section identifier if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl CourseIdentity {
    pub fn new(course_number: impl Into<String>) -> Self {
        Self {
            course_number: course_number.into(),
            course_name: None,
            professor: None,
            section: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.course_name = Some(name.into());
        self
    }

    pub fn with_professor(mut self, professor: impl Into<String>) -> Self {
        self.professor = Some(professor.into());
        self
    }

    /// Derive the cache key for this identity.
    ///
    /// Pure and total: never fails, even on empty fields. Two identities that
    /// normalize to the same course and professor map to the same key.
    pub fn cache_key(&self) -> String {
        let course = normalize_course_number(&self.course_number);
        let prof = normalize_professor(self.professor.as_deref().unwrap_or("Unknown"));
        format!("{}_{}", course, prof)
    }

    /// Professor name or the "N/A" placeholder used in prompts.
    pub fn professor_or_na(&self) -> &str {
        self.professor.as_deref().unwrap_or("N/A")
    }
}

/// Uppercase and strip everything that is not A-Z or 0-9.
pub fn normalize_course_number(course_number: &str) -> String {
    course_number
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Strip leading honorifics, drop whitespace and non-letters, uppercase.
///
/// An empty or absent name normalizes to "UNKNOWN" so the key stays total.
pub fn normalize_professor(name: &str) -> String {
    let trimmed = name.trim();
    let without_title = ["Prof.", "Professor", "Dr."]
        .iter()
        .find_map(|title| {
            let rest = strip_prefix_ignore_case(trimmed, title)?;
            Some(rest.trim_start())
        })
        .unwrap_or(trimmed);

    let normalized: String = without_title
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();

    if normalized.is_empty() {
        "UNKNOWN".to_string()
    } else {
        normalized
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
