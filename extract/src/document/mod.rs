use std::fmt;
use std::path::Path;

use crate::error::ExtractionError;

/// The markup format of a documentation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Markdown,
    RestructuredText,
}

impl Dialect {
    /// Map a file extension (with or without the leading dot, any case) to a dialect.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Dialect::Markdown),
            "rst" | "rest" => Some(Dialect::RestructuredText),
            _ => None,
        }
    }

    /// Select the dialect of a file by its extension.
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        Dialect::from_extension(&extension)
            .ok_or(ExtractionError::UnsupportedFileType { extension })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Markdown => write!(f, "Markdown"),
            Dialect::RestructuredText => write!(f, "reStructuredText"),
        }
    }
}

/// Full text of a documentation file together with its dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub dialect: Dialect,
}

impl Document {
    pub fn new(text: String, dialect: Dialect) -> Self {
        Document { text, dialect }
    }

    /// Read a document from disk. The dialect is checked before the file is touched.
    pub fn read(path: &Path) -> Result<Self, ExtractionError> {
        let dialect = Dialect::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExtractionError::MissingInput {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractionError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(Document { text, dialect })
    }
}
