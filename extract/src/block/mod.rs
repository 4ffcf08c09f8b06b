pub mod dedent;

use std::ops::Range;

pub use dedent::dedent;

/// Which discovery rule produced a candidate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    /// A fenced (Markdown) or directive (RST) code block.
    CodeBlock,
    /// Content between a paired SPREAD inclusion marker.
    Inclusion,
}

/// A span of the document that may become a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBlock {
    /// Byte span in source, from the block's opening syntax to its end.
    pub span: Range<usize>,
    /// Raw body text, before dedent. Inclusion bodies from RST are already uncommented.
    pub body: String,
    pub origin: BlockOrigin,
}

impl CandidateBlock {
    pub fn new(span: Range<usize>, body: impl Into<String>, origin: BlockOrigin) -> Self {
        CandidateBlock {
            span,
            body: body.into(),
            origin,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Dedent and trim the body. Blocks with nothing left produce no command.
    pub fn into_command(self) -> Option<Command> {
        let text = dedent(&self.body);
        if text.is_empty() {
            None
        } else {
            Some(Command {
                text,
                span: self.span,
            })
        }
    }
}

/// Text to execute, taken from one surviving candidate block.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub text: String,
    pub span: Range<usize>,
}

impl Command {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}
