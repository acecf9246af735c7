// Shared prompt fragments.
// Each call site keeps its own prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Appended to every prompt whose answer goes through structured recovery.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies. \
    Do NOT put line breaks inside JSON string values.";

/// Renders `name: description` pairs as a bulleted list.
pub fn bullet_list<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    items
        .into_iter()
        .map(|(name, description)| format!("- {name}: {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fills `{name}` placeholders in one pass.
///
/// Inserted values are never scanned again, so text taken from a syllabus or
/// from generated content can contain braces or placeholder names verbatim.
/// Unknown `{...}` groups are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match replacement {
            Some((close, value)) => {
                filled.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                filled.push('{');
                rest = after;
            }
        }
    }
    filled.push_str(rest);
    filled
}
