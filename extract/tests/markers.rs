use extract::ExtractionError;
use extract::block::dedent;
use extract::parser::{MarkerFamily, validate_pairs};
use regex::Regex;

fn pairs(text: &str) -> Result<Vec<(usize, usize)>, ExtractionError> {
    let open = Regex::new("OPEN").unwrap();
    let close = Regex::new("CLOSE").unwrap();
    let family = MarkerFamily {
        name: "TEST",
        open: &open,
        close: &close,
    };
    validate_pairs(text, &family)
        .map(|pairs| pairs.iter().map(|p| (p.open.start, p.close.start)).collect())
}

#[test]
fn sequential_pairs() {
    assert_eq!(
        pairs("OPEN\nCLOSE\nOPEN\nCLOSE\n").unwrap(),
        vec![(0, 5), (11, 16)]
    );
}

#[test]
fn nested_pairs_match_nearest_open() {
    let text = "OPEN\nOPEN\nCLOSE\nCLOSE\nOPEN\nCLOSE\n";
    assert_eq!(pairs(text).unwrap(), vec![(5, 10), (0, 16), (22, 27)]);
}

#[test]
fn no_markers_is_ok() {
    assert!(pairs("plain text").unwrap().is_empty());
}

#[test]
fn more_opens_than_closes_reports_earliest_opener() {
    let err = pairs("OPEN\nOPEN\nCLOSE\n").unwrap_err();
    assert!(matches!(err, ExtractionError::Unclosed { offset: 0, .. }));
}

#[test]
fn close_before_open() {
    let err = pairs("CLOSE\nOPEN\n").unwrap_err();
    assert!(matches!(err, ExtractionError::UnmatchedClose { offset: 0, .. }));
    assert_eq!(err.span(), Some(0..0));
}

#[test]
fn marker_errors_become_diagnostics() {
    let err = pairs("text OPEN").unwrap_err();
    let diagnostic = err.to_diagnostic(3);
    assert_eq!(diagnostic.message, "Unclosed TEST marker found at position 5");
    assert_eq!(diagnostic.labels.len(), 1);
    assert_eq!(diagnostic.labels[0].file_id, 3);
    assert_eq!(diagnostic.labels[0].range, 5..5);
}

#[test]
fn dedent_strips_common_indent() {
    assert_eq!(dedent("    a\n      b\n\n    c\n"), "a\n  b\n\nc");
}

#[test]
fn dedent_blank_lines_do_not_count() {
    assert_eq!(dedent("\n   \n    x\n \n"), "x");
}

#[test]
fn dedent_of_blank_body_is_empty() {
    assert_eq!(dedent(""), "");
    assert_eq!(dedent("  \n\t\n"), "");
}

#[test]
fn dedent_is_idempotent() {
    for body in ["  a\n    b\n", "x\n  y", "\n\n\tz\n\t\tw\n", "  one\n\n  two  "] {
        let once = dedent(body);
        assert_eq!(dedent(&once), once);
    }
}
