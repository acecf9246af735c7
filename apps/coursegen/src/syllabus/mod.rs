// Syllabus ingestion: document readers, the extraction call site and helpers
// for reading the extracted components.

pub mod components;
pub mod document;
pub mod handlers;
pub mod parser;
pub mod prompts;
