//! Document intake: extension checks and text loading.
//!
//! Everything here runs before the network is touched, so a wrong file type
//! or an empty document never reaches the server.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use lexcheck_types::NonEmptyString;

/// File extensions accepted for upload, lowercase and without the dot.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["txt", "doc", "docx"];

/// Document analysed when no source is given.
pub const DEFAULT_DOCUMENT: &str = "Target.txt";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("unsupported file type for {}: choose a .txt, .doc or .docx file", .path.display())]
    UnsupportedExtension { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to read standard input: {0}")]
    Stdin(#[source] io::Error),
    #[error("nothing to analyze: the text is empty")]
    Empty,
}

/// Where the document text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    File(PathBuf),
    Inline(String),
    Stdin,
}

impl TextSource {
    /// `--text -` reads stdin; otherwise inline text, a file, or the default document.
    #[must_use]
    pub fn from_args(file: Option<PathBuf>, text: Option<String>) -> Self {
        match (file, text) {
            (_, Some(text)) if text == "-" => Self::Stdin,
            (_, Some(text)) => Self::Inline(text),
            (Some(path), None) => Self::File(path),
            (None, None) => Self::File(PathBuf::from(DEFAULT_DOCUMENT)),
        }
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => f.write_str("inline text"),
            Self::Stdin => f.write_str("standard input"),
        }
    }
}

/// Loaded, non-empty document text.
#[derive(Debug, Clone)]
pub struct Document {
    /// Human-readable origin (file name, "inline text", ...).
    pub origin: String,
    pub text: NonEmptyString,
}

/// Check the file name's extension against [`ACCEPTED_EXTENSIONS`].
///
/// The extension is whatever follows the last `.` of the file name, compared
/// case-insensitively. A name without a dot is rejected.
pub fn validate_extension(path: &Path) -> Result<(), IntakeError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let accepted = name.rfind('.').is_some_and(|dot| {
        let ext = &name[dot + 1..];
        ACCEPTED_EXTENSIONS
            .iter()
            .any(|ok| ok.eq_ignore_ascii_case(ext))
    });
    if accepted {
        Ok(())
    } else {
        Err(IntakeError::UnsupportedExtension {
            path: path.to_path_buf(),
        })
    }
}

/// Read a document file as text, replacing invalid UTF-8.
pub fn read_document_file(path: &Path) -> Result<String, IntakeError> {
    validate_extension(path)?;
    let bytes = std::fs::read(path).map_err(|source| IntakeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_lossy(bytes, &path.display().to_string()))
}

fn decode_lossy(bytes: Vec<u8>, origin: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
            tracing::warn!(origin, "Document is not valid UTF-8; invalid bytes replaced");
            text
        }
    }
}

/// Resolve a [`TextSource`] into a document ready for analysis.
pub fn load_document(source: &TextSource) -> Result<Document, IntakeError> {
    load_document_with_stdin(source, io::stdin().lock())
}

/// Like [`load_document`], reading `TextSource::Stdin` from `stdin`.
pub fn load_document_with_stdin(
    source: &TextSource,
    mut stdin: impl Read,
) -> Result<Document, IntakeError> {
    let raw = match source {
        TextSource::File(path) => read_document_file(path)?,
        TextSource::Inline(text) => text.clone(),
        TextSource::Stdin => {
            let mut bytes = Vec::new();
            stdin.read_to_end(&mut bytes).map_err(IntakeError::Stdin)?;
            decode_lossy(bytes, "stdin")
        }
    };

    let text = NonEmptyString::trimmed(&raw).map_err(|_| IntakeError::Empty)?;
    let origin = match source {
        TextSource::File(path) => path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        other => other.to_string(),
    };
    tracing::debug!(origin = %origin, chars = text.chars().count(), "Document loaded");
    Ok(Document { origin, text })
}
