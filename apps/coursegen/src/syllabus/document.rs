//! Syllabus document readers: PDF, DOCX and plain text, dispatched by file extension.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("Error extracting text from DOCX: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    /// Maps a file extension (with or without the dot, any case) to a reader.
    pub fn from_extension(extension: &str) -> Result<Self, DocumentError> {
        let normalized = extension.trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" | "doc" => Ok(DocumentKind::Docx),
            "txt" | "text" => Ok(DocumentKind::Text),
            _ => Err(DocumentError::Unsupported(format!(".{normalized}"))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

/// Reads a syllabus file and returns its text.
pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    if !path.exists() {
        error!("File not found: {}", path.display());
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }

    let kind = DocumentKind::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!(
        "Extracting {:?} text from {} ({} bytes)",
        kind,
        path.display(),
        bytes.len()
    );
    extract_text_from_bytes(kind, bytes)
}

/// Extracts text from in-memory document bytes, e.g. an uploaded file.
pub fn extract_text_from_bytes(
    kind: DocumentKind,
    bytes: Vec<u8>,
) -> Result<String, DocumentError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string())),
        DocumentKind::Docx => extract_docx_text(&bytes),
        DocumentKind::Text => Ok(String::from_utf8(bytes)?),
    }
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Docx(e.to_string()))?
        .read_to_string(&mut document_xml)?;
    Ok(document_xml_to_text(&document_xml))
}

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?P<empty><w:p(?:\s[^>]*)?/>)",
            r"|(?P<end></w:p>)",
            r"|<w:t(?:\s[^>]*)?>(?P<text>[^<]*)</w:t>",
            r"|(?P<tab><w:tab\s*/>)",
            r"|(?P<br><w:(?:br|cr)(?:\s[^>]*)?/>)",
        ))
        .expect("valid document markup regex")
    })
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9A-Fa-f]+)|([a-z]+));").expect("valid entity regex")
    })
}

/// One line per `<w:p>` paragraph, joining its `<w:t>` runs.
///
/// Empty paragraphs stay as blank lines; `<w:br/>` and `<w:cr/>` break the line.
fn document_xml_to_text(xml: &str) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for caps in markup_pattern().captures_iter(xml) {
        if let Some(run) = caps.name("text") {
            current.push_str(&unescape_xml(run.as_str()));
        } else if caps.name("tab").is_some() {
            current.push('\t');
        } else if caps.name("br").is_some() {
            current.push('\n');
        } else {
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Decodes the predefined XML entities and numeric character references in one pass.
fn unescape_xml(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(decimal) = caps.get(1) {
                decimal.as_str().parse().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match &caps[3] {
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "amp" => Some('&'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
