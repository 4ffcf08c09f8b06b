use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// Fatal conditions that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The input extension is not one of the recognized documentation formats.
    #[error("Unsupported file type '{extension}'. Supported types: .md, .markdown, .rst, .rest")]
    UnsupportedFileType { extension: String },

    #[error("File '{}' not found.", .path.display())]
    MissingInput { path: PathBuf },

    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A closing marker appeared while no opening marker of its family was open.
    #[error("Found closing {marker} marker without corresponding opening marker at position {offset}")]
    UnmatchedClose { marker: String, offset: usize },

    /// An opening marker was never closed. `offset` is the earliest unmatched opener.
    #[error("Unclosed {marker} marker found at position {offset}")]
    Unclosed { marker: String, offset: usize },
}

impl ExtractionError {
    /// Byte span of the offending marker, for marker structure errors.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ExtractionError::UnmatchedClose { offset, .. }
            | ExtractionError::Unclosed { offset, .. } => Some(*offset..*offset),
            _ => None,
        }
    }

    pub fn is_marker_error(&self) -> bool {
        self.span().is_some()
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::error().with_message(self.to_string());
        match (self, self.span()) {
            (ExtractionError::Unclosed { marker, .. }, Some(span)) => diagnostic
                .with_labels(vec![
                    Label::primary(file_id, span).with_message(format!("{} opened here", marker)),
                ])
                .with_notes(vec![format!("every {} opening marker needs a closing marker", marker)]),
            (ExtractionError::UnmatchedClose { .. }, Some(span)) => diagnostic.with_labels(vec![
                Label::primary(file_id, span).with_message("no marker is open here"),
            ]),
            _ => diagnostic,
        }
    }
}
