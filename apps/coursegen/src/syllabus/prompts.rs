// Prompt constants for syllabus extraction.

/// Extraction prompt template.
/// Replace: {components}, {json_only}, {syllabus_text}
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"You are an expert educational analyst specialised in reading course syllabi.
Extract the following components from the syllabus text below:
{components}

Format your answer as a JSON object with exactly these components as keys.
If a component is not present in the syllabus, set its value to null.
`topics` must be a JSON array of short topic names.

{json_only}

SYLLABUS TEXT:
{syllabus_text}"#;
