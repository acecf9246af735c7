// Prompt constants for quality evaluation.

/// Rubric criteria with the description the model scores against.
pub const EVALUATION_CRITERIA: [(&str, &str); 10] = [
    ("accuracy", "The content is correct and up to date."),
    ("alignment", "The content is aligned with the learning objectives."),
    ("completeness", "The content covers every necessary topic completely."),
    ("clarity", "The content is presented clearly and understandably."),
    ("engagement", "The content encourages active learning and holds attention."),
    ("level_appropriateness", "The content suits the target audience."),
    ("relevance", "The content is relevant to the course and the specific topic."),
    ("consistency", "The content is consistent and free of contradictions."),
    ("readability", "The content is legible and of suitable complexity."),
    ("domain_terminology", "The content uses the domain terminology correctly."),
];

/// Evaluation prompt template.
/// Replace: {content_type}, {criteria}, {course_title}, {course_code},
/// {learning_objectives}, {content}, {json_shape}, {json_only}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an expert in evaluating educational content with experience in academic quality assurance.

Evaluate the following {content_type} content against these criteria:
{criteria}

Course information:
- Title: {course_title}
- Code: {course_code}
- Learning Objectives: {learning_objectives}

Content to evaluate:
{content}

Score every criterion from 1 to 5 and return the evaluation as JSON with this structure:
{json_shape}

{json_only}"#;
