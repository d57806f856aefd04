// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt construction for the three model operations
//!
//! The final-rating prompt is a fixed, must-match output template: the
//! parser in `crate::rating` depends on these exact section labels.

use crate::identity::CourseIdentity;
use crate::llm::types::SourceSummary;

/// Sentinel the filter operation emits when nothing on the page is relevant
pub const NO_RELEVANT_INFORMATION: &str = "NO RELEVANT INFORMATION";

pub fn filter_system_prompt() -> String {
    "You are a content extraction assistant. Your ONLY job is to copy relevant text \
     verbatim from the input. Do NOT summarize, paraphrase, or add any commentary. \
     If no relevant information exists, output exactly: \"NO RELEVANT INFORMATION\""
        .to_string()
}

pub fn filter_user_prompt(content: &str, identity: &CourseIdentity) -> String {
    let course = &identity.course_number;
    let name = identity.course_name.as_deref().unwrap_or("");
    let prof = identity.professor_or_na();

    format!(
        "CRITICAL: You MUST focus ONLY on the EXACT course and professor specified below. \
         Ignore all other courses and professors.\n\n\
         TARGET COURSE: {course} {name}\n\
         TARGET PROFESSOR: {prof}\n\n\
         Source content:\n{content}\n\n\
         Instructions:\n\
         1. Copy ONLY sentences/paragraphs that mention THIS SPECIFIC course ({course}) \
         OR THIS SPECIFIC professor ({prof})\n\
         2. REJECT any content about different courses or different professors\n\
         3. Output the text VERBATIM (word-for-word, no changes)\n\
         4. If no relevant information about THIS specific course/professor exists, \
         output exactly: \"NO RELEVANT INFORMATION\"\n\
         5. Do NOT add your own words, summaries, or explanations"
    )
}

pub fn summary_system_prompt() -> String {
    "You are a course review summarizer. Write concise, conversational summaries with \
     NO buzzwords or corporate speak. Use HTML: <strong> for emphasis on key adjectives \
     only. Count your words carefully. ALWAYS focus on the EXACT course and professor \
     specified."
        .to_string()
}

pub fn summary_user_prompt(content: &str, identity: &CourseIdentity) -> String {
    let course = &identity.course_number;
    let prof = identity.professor_or_na();

    format!(
        "CRITICAL: This feedback is SPECIFICALLY about the following course and professor. \
         Do NOT mix in information about other courses or professors.\n\n\
         TARGET COURSE: {course}\n\
         TARGET PROFESSOR: {prof}\n\n\
         Feedback content:\n{content}\n\n\
         Output EXACTLY this format:\n\
         SUMMARY: [Write exactly 80 words in one paragraph about THIS SPECIFIC COURSE \
         ({course}) with THIS SPECIFIC PROFESSOR ({prof}). Cover: overall sentiment, \
         teaching style, workload, grading, key strengths and concerns. Be direct and \
         conversational.]\n\
         QUOTE: \"[Copy one exact quote from the source that DIRECTLY mentions either \
         {course} OR {prof} by name. If no such quote exists, output: NO RELEVANT QUOTE]\"\n\n\
         Requirements:\n\
         - SUMMARY must be exactly 80 words (count carefully!)\n\
         - Focus ONLY on {course} with {prof}\n\
         - Be conversational and direct\n\
         - NO corporate buzzwords\n\
         - QUOTE must be verbatim from source AND must explicitly mention the course code \
         or professor name\n\
         - If no quote directly mentions the course/professor, use: NO RELEVANT QUOTE"
    )
}

pub fn rating_system_prompt() -> String {
    "You are a course evaluator writing final summaries. Be concise, direct, and \
     conversational. NO buzzwords. Each summary MUST be exactly 80 words. Format using \
     HTML: use <strong> ONLY for 2-3 key descriptive adjectives. NEVER bold names or \
     codes. Use <a href=\"URL\">text</a> for quotes. Count your words carefully. ALWAYS \
     focus on the EXACT course and professor specified at the beginning."
        .to_string()
}

const RATING_RUBRIC: &str = "\n\nRIGOROUS RATING RUBRIC (Apply carefully):\n\n\
OVERALL RATING (1-5):\n\
- 5.0: Exceptional - Overwhelmingly positive, transformative learning, highly recommended\n\
- 4.0-4.9: Very Good - Mostly positive, some minor concerns, recommended\n\
- 3.0-3.9: Good - Mixed reviews, balanced pros/cons, depends on student\n\
- 2.0-2.9: Fair - More concerns than positives, proceed with caution\n\
- 1.0-1.9: Poor - Predominantly negative, major issues, not recommended\n\n\
DIFFICULTY RATING (1-5):\n\
- 5.0: Very Difficult - Extremely heavy workload, complex material, high failure risk\n\
- 4.0-4.9: Difficult - Significant time investment, challenging concepts\n\
- 3.0-3.9: Moderate - Manageable with effort, balanced difficulty\n\
- 2.0-2.9: Easy - Light workload, straightforward material\n\
- 1.0-1.9: Very Easy - Minimal effort required\n\n\
Consider: Number of sources, sentiment consistency, specific complaints/praise, \
workload mentions, grading fairness, teaching quality";

pub fn rating_user_prompt(
    summaries: &[SourceSummary],
    identity: &CourseIdentity,
    use_rubric: bool,
) -> String {
    let course = &identity.course_number;
    let prof = identity.professor_or_na();

    let summaries_text = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Source {} ({}):\n{}", i + 1, s.source, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    let rubric = if use_rubric { RATING_RUBRIC } else { "" };

    format!(
        "CRITICAL - DEFINITIVE COURSE AND PROFESSOR (your analysis MUST focus on these \
         exact values):\n\
         TARGET COURSE: {course}\n\
         TARGET PROFESSOR: {prof}\n\n\
         The summaries below may mention various courses or professors. You MUST filter \
         and focus ONLY on feedback about the TARGET course and TARGET professor \
         specified above. Ignore any information about other courses or professors.\n\n\
         Aggregated feedback from multiple sources:\n{summaries_text}\n\n\
         Output EXACTLY this format:\n\n\
         OVERALL RATING: [single number 1-5 with decimal for {course} with {prof}, e.g., 4.2]\n\n\
         DIFFICULTY RATING: [single number 1-5 with decimal for {course}, where 1=very \
         easy, 5=very difficult]\n\n\
         COURSE CONTENT SUMMARY:\n\
         [Write exactly 80 words in one paragraph (count carefully!) about {course}. \
         Cover what THIS SPECIFIC COURSE teaches, structure, learning experience. Use \
         \"{course}\" (short code only, NOT full title). Use <strong> ONLY for 2-3 key \
         adjectives. DO NOT bold course code or professor name. ONLY include a quote as: \
         <a href=\"URL\">quoted text</a> IF the quote DIRECTLY mentions {course} by name. \
         Otherwise omit quotes entirely.]\n\n\
         PROFESSOR SUMMARY:\n\
         [Write exactly 80 words in one paragraph (count carefully!) about {prof}. Cover \
         THIS SPECIFIC PROFESSOR's teaching style, grading fairness, student interaction. \
         Refer to {prof} by name (NO bold). Use <strong> ONLY for 2-3 key adjectives about \
         teaching. ONLY include a quote as: <a href=\"URL\">quoted text</a> IF the quote \
         DIRECTLY mentions {prof} by name. Otherwise omit quotes entirely.]\n\n\
         Requirements:\n\
         - Each summary MUST be exactly 80 words\n\
         - ONLY analyze feedback about {course} with {prof}\n\
         - Be conversational and direct\n\
         - Bold ONLY descriptive adjectives (2-3 max per summary)\n\
         - NEVER bold: course codes, professor names, or full phrases\n\
         - Use short course code (e.g., \"CS 2130\" not \"CS 2130 (Computer Systems)\")\n\
         - Quotes are OPTIONAL: only include if they DIRECTLY mention the course code or \
         professor name\n\
         - If no relevant quotes exist, write the summary WITHOUT any quotes{rubric}"
    )
}
