//! Read helpers over an extracted syllabus payload.
//!
//! The model decides the value shapes, so every accessor accepts strings,
//! arrays and objects and renders them as prompt-ready text.

use serde_json::Value;

use crate::llm_client::StructuredPayload;

/// Components the extraction prompt asks for, in prompt order.
pub const SYLLABUS_COMPONENTS: [&str; 10] = [
    "course_title",
    "course_code",
    "instructor_info",
    "course_description",
    "learning_objectives",
    "prerequisites",
    "required_materials",
    "grading_policy",
    "schedule",
    "topics",
];

/// Keys tried, in order, when a topic arrives as an object.
const TOPIC_NAME_KEYS: [&str; 4] = ["name", "title", "topic", "description"];

/// A component rendered as text, or `None` when missing, null or empty.
pub fn component_text(syllabus: &StructuredPayload, component: &str) -> Option<String> {
    syllabus.get(component).and_then(render_value)
}

/// `component_text` with a fallback for prompts.
pub fn component_or(syllabus: &StructuredPayload, component: &str, fallback: &str) -> String {
    component_text(syllabus, component).unwrap_or_else(|| fallback.to_string())
}

/// Topic names from the `topics` component.
///
/// Accepts an array of strings or objects, or a single string. Blank entries are dropped.
pub fn topics(syllabus: &StructuredPayload) -> Vec<String> {
    match syllabus.get("topics") {
        Some(Value::Array(items)) => items.iter().filter_map(topic_name).collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.trim().to_string()],
        _ => Vec::new(),
    }
}

fn topic_name(item: &Value) -> Option<String> {
    match item {
        Value::Object(fields) => TOPIC_NAME_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| render_value(item)),
        other => render_value(other),
    }
}

fn render_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(render_value)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
