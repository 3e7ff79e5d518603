//! Bulk question import from `.txt`, `.md` and `.docx` files.
//!
//! Import is all-or-nothing: any error means no question is produced.

pub mod docx;
pub mod grammar;

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::spec::Question;

pub use grammar::{ParsedQuestion, clean_variant, into_questions, parse_questions};

/// Largest accepted source file.
pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Errors raised while importing questions.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file format '{0}': use .txt, .md or .docx")]
    UnsupportedFormat(String),
    #[error("file is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
    #[error("no questions found in the file")]
    NoQuestions,
    #[error("could not extract document text: {0}")]
    Extraction(String),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ImportError {
    /// Stable code for message catalogs.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::UnsupportedFormat(_) => "import_unsupported_format",
            ImportError::TooLarge { .. } => "import_too_large",
            ImportError::NoQuestions => "import_no_questions",
            ImportError::Extraction(_) => "import_extraction_failed",
            ImportError::Io { .. } => "import_io",
        }
    }
}

/// Recognised source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    PlainText,
    Markdown,
    Docx,
}

impl ImportFormat {
    /// Picks the format from the file extension, falling back to the MIME type.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Result<Self, ImportError> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".txt") {
            return Ok(ImportFormat::PlainText);
        }
        if lower.ends_with(".md") {
            return Ok(ImportFormat::Markdown);
        }
        if lower.ends_with(".docx") {
            return Ok(ImportFormat::Docx);
        }
        match mime.map(|mime| mime.split(';').next().unwrap_or(mime).trim()) {
            Some(MIME_TEXT) => Ok(ImportFormat::PlainText),
            Some(MIME_MARKDOWN) => Ok(ImportFormat::Markdown),
            Some(MIME_DOCX) => Ok(ImportFormat::Docx),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Turns the raw bytes of an uploaded file into questions numbered after
/// `existing_count`.
pub fn import_bytes(
    file_name: &str,
    mime: Option<&str>,
    bytes: &[u8],
    existing_count: usize,
) -> Result<Vec<Question>, ImportError> {
    let format = ImportFormat::detect(file_name, mime)?;
    let size = bytes.len() as u64;
    if size > MAX_IMPORT_BYTES {
        return Err(ImportError::TooLarge {
            size,
            limit: MAX_IMPORT_BYTES,
        });
    }

    let text = match format {
        ImportFormat::PlainText | ImportFormat::Markdown => decode_text(bytes),
        ImportFormat::Docx => docx::extract_text(bytes)?,
    };

    let parsed = parse_questions(&text);
    if parsed.is_empty() {
        return Err(ImportError::NoQuestions);
    }
    let questions = into_questions(parsed, existing_count + 1);
    info!(file = file_name, count = questions.len(), "imported questions");
    Ok(questions)
}

/// Reads `path` and imports it; the size ceiling is checked before reading.
pub fn import_file(path: &Path, existing_count: usize) -> Result<Vec<Question>, ImportError> {
    let display = path.display().to_string();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| display.clone());
    ImportFormat::detect(&file_name, None)?;

    let metadata = fs::metadata(path).map_err(|source| ImportError::Io {
        path: display.clone(),
        source,
    })?;
    if metadata.len() > MAX_IMPORT_BYTES {
        return Err(ImportError::TooLarge {
            size: metadata.len(),
            limit: MAX_IMPORT_BYTES,
        });
    }

    let bytes = fs::read(path).map_err(|source| ImportError::Io {
        path: display,
        source,
    })?;
    import_bytes(&file_name, None, &bytes, existing_count)
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
