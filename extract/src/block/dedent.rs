/// Remove the common leading whitespace from `body` and trim the result.
///
/// The indent is the smallest leading-whitespace width (in characters) over the
/// non-blank lines. Blank lines become empty. A body with no non-blank line
/// yields an empty string.
pub fn dedent(body: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();

    let Some(indent) = lines
        .iter()
        .filter(|line| !is_blank(line))
        .map(|line| leading_width(line))
        .min()
    else {
        return String::new();
    };

    let dedented: Vec<&str> = lines
        .iter()
        .map(|line| {
            if is_blank(line) {
                ""
            } else {
                skip_chars(line, indent)
            }
        })
        .collect();

    dedented.join("\n").trim().to_string()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn skip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}
