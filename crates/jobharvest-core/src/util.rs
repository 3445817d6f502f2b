/// Split a comma-separated list, trimming whitespace and dropping empty tokens.
///
/// Example: `"Azure, devops ,, "` → `["Azure", "devops"]`
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Like [`split_list`], but keeps only the first occurrence of each token.
pub fn split_unique_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in split_list(raw) {
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Interpret a boolean-ish environment value.
///
/// `1`, `true`, `yes`, `y` (any case, surrounding whitespace ignored) are true;
/// everything else is false.
pub fn parse_env_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Returns `None` for empty or whitespace-only values.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
