//! String helpers shared across layers

/// Derive a workspace display name from a prefix and a branch name.
///
/// Path separators are not valid in workspace names, so both `/` and `\`
/// become hyphens: `vt` + `feature/foo` -> `vt-feature-foo`.
pub fn derive_workspace_name(prefix: &str, branch: &str) -> String {
    let normalized: String = branch
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect();
    let normalized = normalized.trim_matches('-');

    if normalized.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}-{normalized}")
    }
}

/// Truncate a detail string to at most `max_chars` characters, char-safe.
pub fn truncate_detail(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
