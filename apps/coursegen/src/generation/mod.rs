// Content generation: one LLM call per requested content type.
// All model calls go through llm_client, never through the backend directly.

pub mod generator;
pub mod handlers;
pub mod prompts;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of teaching material the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ContentType {
    LectureNotes,
    Slides,
    PracticeProblems,
    DiscussionQuestions,
    Assessment,
    SuggestedReadings,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::LectureNotes => "lecture_notes",
            ContentType::Slides => "slides",
            ContentType::PracticeProblems => "practice_problems",
            ContentType::DiscussionQuestions => "discussion_questions",
            ContentType::Assessment => "assessment",
            ContentType::SuggestedReadings => "suggested_readings",
        }
    }

    /// Human wording used in prompts and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ContentType::LectureNotes => "lecture notes",
            ContentType::Slides => "slides",
            ContentType::PracticeProblems => "practice problems",
            ContentType::DiscussionQuestions => "discussion questions",
            ContentType::Assessment => "assessment items",
            ContentType::SuggestedReadings => "suggested readings",
        }
    }

    pub fn max_output_tokens(self) -> u32 {
        match self {
            ContentType::LectureNotes
            | ContentType::PracticeProblems
            | ContentType::Assessment => 4000,
            ContentType::Slides | ContentType::DiscussionQuestions => 3000,
            ContentType::SuggestedReadings => 1000,
        }
    }

    /// Suggested readings fall back to the course as a whole.
    pub fn requires_topics(self) -> bool {
        self != ContentType::SuggestedReadings
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
