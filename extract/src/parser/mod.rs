pub mod markdown;
pub mod markers;
pub mod rst;
pub mod sections;

use std::ops::Range;

use serde::Deserialize;

use crate::block::{CandidateBlock, Command};
use crate::document::{Dialect, Document};
use crate::error::ExtractionError;
use crate::CommandList;

pub use markdown::MarkdownRules;
pub use markers::{MarkerFamily, MarkerPair, validate_pairs};
pub use rst::RstRules;

/// Section titles that older tutorial layouts kept out of the generated task.
pub const LEGACY_SKIP_SECTIONS: &[&str] = &["what you'll need", "requirements", "prerequisites"];

/// Knobs that change which blocks survive extraction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractOptions {
    /// Heading titles (case-insensitive) whose whole section is excluded.
    pub skip_sections: Vec<String>,
}

impl ExtractOptions {
    /// Add the legacy prerequisites-style section titles to the denylist.
    pub fn with_legacy_sections(mut self) -> Self {
        for title in LEGACY_SKIP_SECTIONS {
            if !self.skip_sections.iter().any(|t| t.eq_ignore_ascii_case(title)) {
                self.skip_sections.push(title.to_string());
            }
        }
        self
    }
}

/// Why a range of the document is excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Between a SPREAD SKIP and SPREAD SKIP END marker.
    SkipMarker,
    /// Under a heading with this (denylisted) title.
    Section(String),
}

/// A byte range whose candidate blocks are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub span: Range<usize>,
    pub reason: ExclusionReason,
}

impl Exclusion {
    /// Half-open test on a block's start offset.
    pub fn excludes(&self, block: &CandidateBlock) -> bool {
        self.span.start <= block.start() && block.start() < self.span.end
    }
}

/// Dialect-specific discovery of candidate blocks and exclusion ranges.
pub trait DialectRules: Sync {
    /// All code and inclusion blocks, validating inclusion markers on the way.
    fn discover_candidates(&self, text: &str) -> Result<Vec<CandidateBlock>, ExtractionError>;

    /// All ranges whose blocks must be dropped, validating skip markers on the way.
    fn discover_exclusions(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<Vec<Exclusion>, ExtractionError>;
}

static MARKDOWN_RULES: MarkdownRules = MarkdownRules;
static RST_RULES: RstRules = RstRules;

impl Dialect {
    pub fn rules(self) -> &'static dyn DialectRules {
        match self {
            Dialect::Markdown => &MARKDOWN_RULES,
            Dialect::RestructuredText => &RST_RULES,
        }
    }
}

/// Parser entry point.
pub struct Parser {
    document: Document,
    file_id: usize,
    options: ExtractOptions,
}

impl Parser {
    pub fn new(document: Document, file_id: usize) -> Self {
        Parser {
            document,
            file_id,
            options: ExtractOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract the ordered command list. Any marker error aborts the whole run.
    pub fn parse(&self) -> Result<CommandList, ExtractionError> {
        let rules = self.document.dialect.rules();
        let text = &self.document.text;

        let candidates = rules.discover_candidates(text)?;
        let exclusions = rules.discover_exclusions(text, &self.options)?;
        log::debug!(
            "{}: {} candidate block(s), {} exclusion range(s)",
            self.document.dialect,
            candidates.len(),
            exclusions.len()
        );

        Ok(CommandList {
            commands: merge(candidates, &exclusions),
            source_id: self.file_id,
        })
    }
}

/// Drop excluded candidates, order the rest by start offset and turn them into commands.
pub fn merge(candidates: Vec<CandidateBlock>, exclusions: &[Exclusion]) -> Vec<Command> {
    let mut kept: Vec<CandidateBlock> = candidates
        .into_iter()
        .filter(|block| match exclusions.iter().find(|ex| ex.excludes(block)) {
            Some(ex) => {
                log::debug!(
                    "dropping {:?} block at {} ({:?})",
                    block.origin,
                    block.start(),
                    ex.reason
                );
                false
            }
            None => true,
        })
        .collect();
    kept.sort_by_key(|block| block.start());
    kept.into_iter()
        .filter_map(CandidateBlock::into_command)
        .collect()
}
