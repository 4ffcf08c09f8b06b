pub mod block;
pub mod document;
pub mod error;
pub mod parser;

pub use block::{CandidateBlock, Command};
pub use document::{Dialect, Document};
pub use error::ExtractionError;
pub use parser::{ExtractOptions, Parser};

/// The ordered commands extracted from one document.
#[derive(Debug, Clone)]
pub struct CommandList {
    /// Surviving commands, sorted by the start offset of their source block.
    pub commands: Vec<Command>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

impl CommandList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command texts in document order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Extract the command texts of `text` with default options.
pub fn extract_commands(text: &str, dialect: Dialect) -> Result<Vec<String>, ExtractionError> {
    let document = Document::new(text.to_string(), dialect);
    let list = Parser::new(document, 0).parse()?;
    Ok(list.commands.into_iter().map(|c| c.text).collect())
}
