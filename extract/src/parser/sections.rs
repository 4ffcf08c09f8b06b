use std::collections::HashMap;

use crate::parser::{Exclusion, ExclusionReason};

/// Characters that may underline an RST section title.
const RST_UNDERLINE_CHARS: &[char] = &[
    '=', '-', '~', '^', '"', '\'', '`', ':', '.', '_', '*', '+', '#',
];

/// A section heading. Smaller `level` means shallower nesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub offset: usize,
    pub level: usize,
    pub title: String,
}

/// Exclusion ranges for every heading whose title is in `denylist` (case-insensitive).
///
/// A section ends at the next heading of the same or shallower level, or at
/// `doc_len` when there is none.
pub fn section_exclusions(headings: &[Heading], denylist: &[String], doc_len: usize) -> Vec<Exclusion> {
    if denylist.is_empty() {
        return Vec::new();
    }
    let denylist: Vec<String> = denylist.iter().map(|t| t.trim().to_lowercase()).collect();

    let mut exclusions = Vec::new();
    for (i, heading) in headings.iter().enumerate() {
        let title = heading.title.trim().to_lowercase();
        if !denylist.contains(&title) {
            continue;
        }
        let end = headings[i + 1..]
            .iter()
            .find(|next| next.level <= heading.level)
            .map(|next| next.offset)
            .unwrap_or(doc_len);
        log::debug!(
            "excluding section '{}' at {}..{}",
            heading.title,
            heading.offset,
            end
        );
        exclusions.push(Exclusion {
            span: heading.offset..end,
            reason: ExclusionReason::Section(heading.title.clone()),
        });
    }
    exclusions
}

/// Find RST section titles: a non-empty line followed by an underline of the same
/// length made of one repeated punctuation character.
///
/// Levels are assigned in order of first appearance of each underline character.
pub fn rst_headings(text: &str) -> Vec<Heading> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut levels: HashMap<char, usize> = HashMap::new();
    let mut headings = Vec::new();

    let mut i = 0;
    let mut offset = 0;
    while i < lines.len() {
        if let Some(next) = lines.get(i + 1) {
            let line = lines[i].trim_end();
            let underline = next.trim_end();
            if let Some(ch) = underline_char(line, underline) {
                let next_level = levels.len();
                let level = *levels.entry(ch).or_insert(next_level);
                headings.push(Heading {
                    offset,
                    level,
                    title: line.trim().to_string(),
                });
                offset += lines[i].len() + next.len() + 2;
                i += 2;
                continue;
            }
        }
        offset += lines[i].len() + 1;
        i += 1;
    }

    headings
}

fn underline_char(title: &str, underline: &str) -> Option<char> {
    if title.is_empty() || underline.is_empty() {
        return None;
    }
    if title.chars().count() != underline.chars().count() {
        return None;
    }
    let first = underline.chars().next()?;
    if !RST_UNDERLINE_CHARS.contains(&first) || underline.chars().any(|c| c != first) {
        return None;
    }
    Some(first)
}
