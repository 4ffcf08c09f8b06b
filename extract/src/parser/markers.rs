use std::ops::Range;

use regex::Regex;

use crate::error::ExtractionError;

/// An opening/closing marker pattern pair, e.g. `SPREAD SKIP` / `SPREAD SKIP END`.
#[derive(Debug, Clone, Copy)]
pub struct MarkerFamily<'r> {
    /// Name used in error messages.
    pub name: &'static str,
    pub open: &'r Regex,
    pub close: &'r Regex,
}

/// A matched opening and closing marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    /// Byte span of the opening marker match.
    pub open: Range<usize>,
    /// Byte span of the closing marker match.
    pub close: Range<usize>,
}

impl MarkerPair {
    /// From the first byte of the opening marker to the last byte of the closing marker.
    pub fn outer(&self) -> Range<usize> {
        self.open.start..self.close.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Open,
    Close,
}

/// Pair every opening marker of `family` with a closing marker using a stack.
///
/// Markers are processed in offset order. A close pops the most recently opened
/// marker; a close on an empty stack, or any opener left on the stack at the end,
/// is an error. Pairs are returned in the order their closing markers appear.
pub fn validate_pairs(
    text: &str,
    family: &MarkerFamily<'_>,
) -> Result<Vec<MarkerPair>, ExtractionError> {
    let mut markers: Vec<(Range<usize>, MarkerKind)> = family
        .open
        .find_iter(text)
        .map(|m| (m.range(), MarkerKind::Open))
        .collect();
    markers.extend(
        family
            .close
            .find_iter(text)
            .map(|m| (m.range(), MarkerKind::Close)),
    );
    markers.sort_by_key(|(range, _)| range.start);

    let mut stack: Vec<Range<usize>> = Vec::new();
    let mut pairs = Vec::new();

    for (range, kind) in markers {
        match kind {
            MarkerKind::Open => stack.push(range),
            MarkerKind::Close => {
                let Some(open) = stack.pop() else {
                    return Err(ExtractionError::UnmatchedClose {
                        marker: family.name.to_string(),
                        offset: range.start,
                    });
                };
                pairs.push(MarkerPair { open, close: range });
            }
        }
    }

    if let Some(earliest) = stack.first() {
        return Err(ExtractionError::Unclosed {
            marker: family.name.to_string(),
            offset: earliest.start,
        });
    }

    Ok(pairs)
}
