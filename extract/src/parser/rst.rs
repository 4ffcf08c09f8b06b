use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{BlockOrigin, CandidateBlock};
use crate::error::ExtractionError;
use crate::parser::markers::{MarkerFamily, MarkerPair, validate_pairs};
use crate::parser::sections::{rst_headings, section_exclusions};
use crate::parser::{DialectRules, Exclusion, ExclusionReason, ExtractOptions};

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\.\. code-block::[^\n]*\n(?:\n)?((?:[ \t]+.+(?:\n|$))+)").unwrap()
});
static SPREAD_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\.\. SPREAD[ \t\r]*$").unwrap());
static SPREAD_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\.\. SPREAD END[ \t\r]*$").unwrap());
static SKIP_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\.\. SPREAD SKIP[ \t\r]*$").unwrap());
static SKIP_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\.\. SPREAD SKIP END[ \t\r]*$").unwrap());

/// reStructuredText: `.. code-block::` directives, `.. SPREAD` / `.. SPREAD END`
/// comment inclusions and `.. SPREAD SKIP` / `.. SPREAD SKIP END` exclusions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RstRules;

impl DialectRules for RstRules {
    fn discover_candidates(&self, text: &str) -> Result<Vec<CandidateBlock>, ExtractionError> {
        let family = MarkerFamily {
            name: "SPREAD",
            open: &SPREAD_OPEN,
            close: &SPREAD_CLOSE,
        };
        let mut blocks: Vec<CandidateBlock> = validate_pairs(text, &family)?
            .iter()
            .map(|pair| inclusion_block(text, pair))
            .collect();

        blocks.extend(CODE_BLOCK.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = caps.get(1)?;
            Some(CandidateBlock::new(
                whole.range(),
                body.as_str(),
                BlockOrigin::CodeBlock,
            ))
        }));
        Ok(blocks)
    }

    fn discover_exclusions(
        &self,
        text: &str,
        options: &ExtractOptions,
    ) -> Result<Vec<Exclusion>, ExtractionError> {
        let family = MarkerFamily {
            name: "SPREAD SKIP",
            open: &SKIP_OPEN,
            close: &SKIP_CLOSE,
        };
        let mut exclusions: Vec<Exclusion> = validate_pairs(text, &family)?
            .iter()
            .map(|pair| Exclusion {
                span: pair.outer(),
                reason: ExclusionReason::SkipMarker,
            })
            .collect();

        if !options.skip_sections.is_empty() {
            exclusions.extend(section_exclusions(
                &rst_headings(text),
                &options.skip_sections,
                text.len(),
            ));
        }
        Ok(exclusions)
    }
}

/// The commented lines between a `.. SPREAD` line and its `.. SPREAD END`.
fn inclusion_block(text: &str, pair: &MarkerPair) -> CandidateBlock {
    let body_start = text[pair.open.end..]
        .find('\n')
        .map(|i| pair.open.end + i + 1)
        .unwrap_or(pair.open.end)
        .min(pair.close.start);
    let body: Vec<&str> = text[body_start..pair.close.start]
        .split('\n')
        .map(uncomment)
        .collect();
    CandidateBlock::new(pair.outer(), body.join("\n"), BlockOrigin::Inclusion)
}

/// Strip the `..` comment prefix (and one following space) from a line.
fn uncomment(line: &str) -> &str {
    line.strip_prefix(".. ")
        .or_else(|| line.strip_prefix(".."))
        .unwrap_or(line)
}
