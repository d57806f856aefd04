// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic stand-in provider used when no API key is configured

use async_trait::async_trait;

use crate::llm::provider::LlmProvider;
use crate::llm::types::{LlmError, LlmRequest, LlmResponse, RequestKind, TokenUsage};

/// Returns canned, well-formed responses keyed on the request kind.
pub struct StubLlmProvider;

#[async_trait]
impl LlmProvider for StubLlmProvider {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let content = match request.kind {
            RequestKind::ContentFiltering => {
                "The course is well organized and the professor explains concepts clearly. \
                 Workload is moderate with weekly assignments."
                    .to_string()
            }
            RequestKind::PageSummarization => {
                "SUMMARY: Students describe this course as <strong>engaging</strong> and well \
                 structured, with a professor who explains material clearly and grades fairly. \
                 The workload is steady but manageable, built around weekly assignments and a \
                 few larger projects. Most feedback is positive, with occasional notes that \
                 exams can feel fast paced. Attending lectures and starting assignments early \
                 are the most common tips. Overall, reviewers recommend it to students who \
                 keep up with the material week by week and ask questions.\n\
                 QUOTE: NO RELEVANT QUOTE"
                    .to_string()
            }
            RequestKind::FinalRating => "\
OVERALL RATING: 4.2

DIFFICULTY RATING: 3.0

COURSE CONTENT SUMMARY:
This course earns consistently <strong>positive</strong> feedback for its clear structure and \
practical focus. Students say the material builds logically from week to week, with assignments \
that reinforce lectures rather than wander from them. The workload is steady but fair, centered \
on weekly problem sets and a few larger projects. Exams reward understanding over memorization. \
Reviewers recommend keeping pace with the readings and starting projects early, calling the \
overall experience <strong>rewarding</strong> and well worth taking.

PROFESSOR SUMMARY:
Feedback on the professor is warm and consistent. Students call the lectures \
<strong>clear</strong> and well paced, with real examples that make abstract ideas concrete. \
Grading is described as fair and transparent, with rubrics shared up front and reasonable \
deadlines. Office hours are genuinely useful, and questions get thoughtful answers rather than \
brush-offs. A few reviewers wanted faster feedback on assignments, but most describe an \
<strong>approachable</strong> instructor who clearly wants students to succeed."
                .to_string(),
        };

        Ok(LlmResponse {
            content,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ReasoningEffort;
    use crate::rating::parse_rating_response;

    fn request(kind: RequestKind) -> LlmRequest {
        LlmRequest {
            kind,
            model: "stub".to_string(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            max_output_tokens: kind.max_output_tokens(),
            effort: kind.effort(),
        }
    }

    #[tokio::test]
    async fn test_final_rating_parses() {
        let response = StubLlmProvider
            .complete(&request(RequestKind::FinalRating))
            .await
            .unwrap();
        let parsed = parse_rating_response(&response.content);
        assert_eq!(parsed.overall_rating, Some(4.2));
        assert_eq!(parsed.difficulty_rating, Some(3.0));
        assert!(!parsed.course_summary.is_empty());
        assert!(!parsed.professor_summary.is_empty());
    }

    #[tokio::test]
    async fn test_summary_has_template_markers() {
        let response = StubLlmProvider
            .complete(&request(RequestKind::PageSummarization))
            .await
            .unwrap();
        assert!(response.content.contains("SUMMARY:"));
        assert!(response.content.contains("QUOTE:"));
    }
}
