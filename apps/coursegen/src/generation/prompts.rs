// Prompt constants for content generation.
// The base block is shared by every content type; the format sections are per type.

use crate::generation::ContentType;

/// Shared instruction block. Replace `{language}` before sending.
pub const BASE_PROMPT_TEMPLATE: &str = r#"You are an expert educational content developer with extensive experience creating university-level course materials.
You have deep knowledge of pedagogical principles, curriculum design and academic writing.

When responding:
1. Maintain academic rigour and factual accuracy.
2. Use clear section headings and numbered lists for sequential steps.
3. Use the correct terminology of the course domain.
4. Write the entire answer in {language}.
5. Output only the requested content. Do NOT include greetings, farewells or explanations of the generation process."#;

/// Generation prompt template.
/// Replace: {base}, {task}, {course_info}, {topics}, {format}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"{base}

## Content Generation Task
{task}

### Course Information
{course_info}

### Topics to Cover
{topics}

### Required Format
{format}"#;

/// Used when suggested readings are requested for a syllabus without topics.
pub const GENERAL_COURSE_CONTENT: &str = "General Course Content";

/// Per-type prompt pieces.
pub struct TypeFormat {
    pub task: &'static str,
    pub format: &'static str,
    pub with_description: bool,
    pub with_objectives: bool,
}

pub fn type_format(content_type: ContentType) -> TypeFormat {
    match content_type {
        ContentType::LectureNotes => TypeFormat {
            task: "Generate detailed lecture notes for the following course and topic(s).",
            format: "Structure your lecture notes with:
1. Introduction and key concepts
2. Main content with clear headings and subheadings
3. Examples and applications
4. Summary and key takeaways
5. References and additional resources

Ensure academic rigour and accuracy while maintaining clarity and comprehensiveness.",
            with_description: true,
            with_objectives: true,
        },
        ContentType::Slides => TypeFormat {
            task: "Generate presentation slide content for the following course and topic(s).",
            format: "Present the content as slide-by-slide markdown with:
- Clear slide titles (## Slide Title)
- Bullet points for key information
- Presenter notes in blockquotes (> Note: explanation)
- Approximately 10-15 slides
- An introductory slide and a summary slide

Focus on concise key points rather than comprehensive text.",
            with_description: false,
            with_objectives: false,
        },
        ContentType::PracticeProblems => TypeFormat {
            task: "Generate a set of practice problems with detailed solutions for the following course and topic(s).",
            format: "For each problem:
1. State the problem clearly
2. Indicate the difficulty level (Basic, Intermediate, Advanced)
3. Provide a detailed step-by-step solution
4. Explain the key concepts used in the solution

Create 5-7 practice problems that test different aspects of the topic(s) and promote critical thinking.",
            with_description: false,
            with_objectives: true,
        },
        ContentType::DiscussionQuestions => TypeFormat {
            task: "Generate thought-provoking discussion questions for the following course and topic(s).",
            format: "For each discussion question:
1. Provide the main question
2. Include 2-3 follow-up questions to deepen the discussion
3. Offer brief notes on directions the discussion might take
4. Connect the question to the course learning objectives where possible

Create 8-10 discussion questions that encourage critical thinking and the application of concepts.",
            with_description: true,
            with_objectives: false,
        },
        ContentType::Assessment => TypeFormat {
            task: "Generate a comprehensive assessment covering the following course and topic(s).",
            format: "Include a mix of question types:
1. Multiple choice questions with 4 options and explanations
2. Short answer questions with expected responses
3. Essay questions with grading rubrics
4. Problem-solving items with step-by-step solutions

Balance the assessment across the levels of Bloom's taxonomy.
Provide a marking scheme with point allocations for each question.",
            with_description: false,
            with_objectives: true,
        },
        ContentType::SuggestedReadings => TypeFormat {
            task: "Generate an academically rigorous list of suggested readings for the following course and topic(s).",
            format: "Include:
- Academic journal articles
- Textbook chapters
- Online resources
- Supplementary materials

Give full bibliographic details and one sentence on why each reading is relevant.",
            with_description: false,
            with_objectives: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_every_type_has_a_format() {
        for &content_type in ContentType::value_variants() {
            let format = type_format(content_type);
            assert!(!format.task.is_empty());
            assert!(!format.format.is_empty());
        }
    }

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(BASE_PROMPT_TEMPLATE.contains("{language}"));
        for placeholder in ["{base}", "{task}", "{course_info}", "{topics}", "{format}"] {
            assert!(GENERATION_PROMPT_TEMPLATE.contains(placeholder), "missing {placeholder}");
        }
    }
}
