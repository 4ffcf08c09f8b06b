use std::ops::Range;

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};
use regex::Regex;

use crate::block::{BlockOrigin, CandidateBlock};
use crate::error::ExtractionError;
use crate::parser::markers::{MarkerFamily, validate_pairs};
use crate::parser::sections::{Heading, section_exclusions};
use crate::parser::{DialectRules, Exclusion, ExclusionReason, ExtractOptions};

const INCLUSION_OPEN: &str = "<!-- SPREAD";
const COMMENT_CLOSE: &str = "-->";

static SKIP_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!-- SPREAD SKIP -->").unwrap());
static SKIP_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!-- SPREAD SKIP END -->").unwrap());

/// Markdown: triple-backtick fences, `<!-- SPREAD ... -->` inclusions and
/// `<!-- SPREAD SKIP -->` / `<!-- SPREAD SKIP END -->` exclusions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRules;

impl DialectRules for MarkdownRules {
    fn discover_candidates(&self, text: &str) -> Result<Vec<CandidateBlock>, ExtractionError> {
        let mut blocks = inclusion_blocks(text)?;

        let runs = backtick_runs(text);
        let inert = inert_fences(text, &runs);
        blocks.extend(
            fenced_blocks(text, &runs)
                .into_iter()
                .filter(|block| !inert.iter().any(|f| contains(f, &block.span))),
        );
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
                &headings(text),
                &options.skip_sections,
                text.len(),
            ));
        }
        Ok(exclusions)
    }
}

fn contains(outer: &Range<usize>, inner: &Range<usize>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

/// `<!-- SPREAD` comments (but not `<!-- SPREAD SKIP`). Each must reach its `-->`
/// before the next `<!-- SPREAD` marker of any kind.
fn inclusion_blocks(text: &str) -> Result<Vec<CandidateBlock>, ExtractionError> {
    let markers: Vec<usize> = text.match_indices(INCLUSION_OPEN).map(|(i, _)| i).collect();
    let mut blocks = Vec::new();

    for (n, &open) in markers.iter().enumerate() {
        let after_marker = open + INCLUSION_OPEN.len();
        if text[after_marker..].starts_with(" SKIP") {
            continue;
        }

        let unclosed = || ExtractionError::Unclosed {
            marker: "SPREAD".to_string(),
            offset: open,
        };
        let close = text[after_marker..]
            .find(COMMENT_CLOSE)
            .map(|i| after_marker + i)
            .ok_or_else(unclosed)?;
        if markers.get(n + 1).is_some_and(|&next| next < close) {
            return Err(unclosed());
        }

        // The opening line must end right after the marker; the body starts on the next line.
        let inner = &text[after_marker..close];
        let leading = &inner[..inner.len() - inner.trim_start().len()];
        let Some(newline) = leading.rfind('\n') else {
            continue;
        };
        blocks.push(CandidateBlock::new(
            open..close + COMMENT_CLOSE.len(),
            &inner[newline + 1..],
            BlockOrigin::Inclusion,
        ));
    }

    Ok(blocks)
}

/// Maximal runs of consecutive backticks.
fn backtick_runs(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            runs.push(start..i);
        } else {
            i += 1;
        }
    }
    runs
}

/// Pair fence runs selected by `is_fence` into (open, info, close) triples.
///
/// An opener needs a newline after its info string; its closer is the first
/// selected run that starts on a later line. An opener without a closer is
/// skipped and the following run is tried as an opener instead.
fn pair_fences<'t>(
    text: &'t str,
    runs: &[Range<usize>],
    is_fence: impl Fn(&Range<usize>) -> bool,
) -> Vec<(Range<usize>, &'t str, Range<usize>)> {
    let fences: Vec<&Range<usize>> = runs.iter().filter(|r| is_fence(*r)).collect();
    let mut pairs = Vec::new();

    let mut i = 0;
    while i < fences.len() {
        let open = fences[i];
        let Some(newline) = text[open.end..].find('\n') else {
            break;
        };
        let body_start = open.end + newline + 1;
        let info = &text[open.end..open.end + newline];

        match fences[i + 1..].iter().position(|r| r.start >= body_start) {
            Some(offset) => {
                let j = i + 1 + offset;
                pairs.push((open.clone(), info, fences[j].clone()));
                i = j + 1;
            }
            None => i += 1,
        }
    }
    pairs
}

/// Spans of fences made of four or more backticks. Their contents are inert examples.
fn inert_fences(text: &str, runs: &[Range<usize>]) -> Vec<Range<usize>> {
    pair_fences(text, runs, |r| r.len() >= 4)
        .into_iter()
        .map(|(open, _, close)| open.start..close.end)
        .collect()
}

/// Fences of exactly three backticks, skipping `{note}`-style directive fences.
fn fenced_blocks(text: &str, runs: &[Range<usize>]) -> Vec<CandidateBlock> {
    pair_fences(text, runs, |r| r.len() == 3)
        .into_iter()
        .filter(|(_, info, _)| !info.trim().starts_with('{'))
        .map(|(open, info, close)| {
            let body_start = open.end + info.len() + 1;
            CandidateBlock::new(
                open.start..close.end,
                &text[body_start..close.start],
                BlockOrigin::CodeBlock,
            )
        })
        .collect()
}

/// ATX and setext headings from the CommonMark event stream.
fn headings(text: &str) -> Vec<Heading> {
    let events: Vec<(Event<'_>, Range<usize>)> =
        CmarkParser::new_ext(text, Options::empty()).into_offset_iter().collect();

    let mut headings = Vec::new();
    let mut i = 0;
    while i < events.len() {
        let (ref ev, ref range) = events[i];
        i += 1;
        if let Event::Start(Tag::Heading { level, .. }) = ev {
            let title = collect_heading_text(&events, &mut i);
            headings.push(Heading {
                offset: range.start,
                level: heading_level_to_usize(level),
                title,
            });
        }
    }
    headings
}

fn heading_level_to_usize(level: &HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Collect heading text (all Text and Code events until End(Heading)).
fn collect_heading_text(events: &[(Event<'_>, Range<usize>)], i: &mut usize) -> String {
    let mut title = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(s) | Event::Code(s) => title.push_str(s),
            _ => {}
        }
    }
    title
}
