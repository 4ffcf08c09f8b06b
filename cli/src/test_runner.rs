use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use extract::{Dialect, Document, ExtractOptions, Parser};

const FIXTURE_SUFFIXES: &[&str] = &[".test.md", ".test.markdown", ".test.rst", ".test.rest"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    /// Human-readable fixture description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected command texts, in order.
    #[serde(default)]
    pub expect_commands: Option<Vec<String>>,

    /// Expected extraction error — the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Section titles to skip for this fixture.
    #[serde(default)]
    pub skip_sections: Vec<String>,
}

/// Split a fixture into its TOML frontmatter and the document that follows it.
fn parse_fixture(content: &str) -> Result<(FixtureConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let document = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: FixtureConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, document))
}

pub enum FixtureOutcome {
    Pass,
    Fail(String),
}

pub struct FixtureResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: FixtureOutcome,
}

impl FixtureResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_fixture(path: &Path) -> FixtureResult {
    let (description, outcome) = match check_fixture(path) {
        Ok((description, None)) => (description, FixtureOutcome::Pass),
        Ok((description, Some(reason))) => (description, FixtureOutcome::Fail(reason)),
        Err(reason) => (None, FixtureOutcome::Fail(reason)),
    };
    FixtureResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Returns the fixture description and, on mismatch, the failure reason.
/// `Err` means the fixture itself could not be loaded.
fn check_fixture(path: &Path) -> Result<(Option<String>, Option<String>), String> {
    let dialect = Dialect::from_path(path).map_err(|e| e.to_string())?;
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {}", e))?;
    let (config, source) =
        parse_fixture(&content).map_err(|e| format!("frontmatter error: {}", e))?;

    let options = ExtractOptions {
        skip_sections: config.skip_sections,
    };
    let document = Document::new(source.to_string(), dialect);
    let result = Parser::new(document, 0).with_options(options).parse();

    let failure = match (&config.expect_error, result) {
        (Some(expected), Err(err)) => {
            let err_str = err.to_string();
            (!err_str.contains(expected.as_str())).then(|| {
                format!("expected error containing \"{}\", got: {}", expected, err_str)
            })
        }
        (Some(expected), Ok(_)) => Some(format!(
            "expected error containing \"{}\", but extraction succeeded",
            expected
        )),
        (None, Err(err)) => Some(format!("unexpected extraction error: {}", err)),
        (None, Ok(list)) => match &config.expect_commands {
            Some(expected) => {
                let actual = list.texts();
                (actual != *expected).then(|| {
                    format!(
                        "command mismatch\n  expected: {:?}\n  actual:   {:?}",
                        expected, actual
                    )
                })
            }
            None => None,
        },
    };

    Ok((config.description, failure))
}

fn is_fixture(name: &str) -> bool {
    FIXTURE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Discover fixture files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_fixtures(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_fixtures(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fixtures(&path, root, out);
        } else if path.file_name().and_then(|n| n.to_str()).is_some_and(is_fixture) {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given fixture path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no fixture files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} fixtures)", label, files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

/// Select the categories to run. Unknown requested categories produce a warning.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let prefix = format!("{}/", req);
        let mut found = false;
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                selected.insert(cat.as_str(), files);
                found = true;
            }
        }
        if !found {
            log::warn!(
                "category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// Run all fixture files under `path` (or a single file).
/// If `categories` is non-empty, only run fixtures in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let groups: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if groups.is_empty() {
        eprintln!("no fixture files found in {}", path.display());
        return 1;
    }

    // Single file mode ignores categories
    let requested: &[String] = if path.is_file() { &[] } else { categories };
    let selected = select_categories(&groups, requested);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<FixtureResult> = Vec::new();

    for (cat, files) in &selected {
        if selected.len() > 1 || !cat.is_empty() {
            let header = if cat.is_empty() { "(root)" } else { *cat };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in *files {
            let result = run_fixture(file);
            match result.outcome {
                FixtureOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                FixtureOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let FixtureOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
