/// De-duplicate text labels, case-insensitively, preserving first-seen
/// order and trimming whitespace. Empty labels are dropped.
pub fn dedupe_labels(labels: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for label in labels {
        let trimmed = label.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed);
        }
    }
    out
}

/// Strip a record title out of a link label.
///
/// Series listings repeat the post title in every part's label
/// ("Arsenal vs Chelsea: Second Half"); the title adds nothing inside a
/// record that already carries it.
pub fn strip_title_from_label(label: &str, title: &str) -> String {
    let cleaned = if !title.is_empty() {
        label.replace(title, "")
    } else {
        label.to_string()
    };
    cleaned
        .trim_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
        .to_string()
}
