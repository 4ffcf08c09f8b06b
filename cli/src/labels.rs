/// GitHub runner labels and the series names the runner charm uses for them.
const SERIES_MAPPING: &[(&str, &str)] = &[
    ("ubuntu-latest", "jammy"),
    ("ubuntu-22.04", "jammy"),
    ("ubuntu-20.04", "focal"),
];

pub fn convert_label(label: &str) -> &str {
    SERIES_MAPPING
        .iter()
        .find(|(github, _)| *github == label)
        .map(|(_, charm)| *charm)
        .unwrap_or(label)
}

/// Convert every label, splitting comma-separated arguments and dropping empty entries.
pub fn convert_labels(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| convert_label(label).to_string())
        .collect()
}
