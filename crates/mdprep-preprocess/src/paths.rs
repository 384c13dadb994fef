//! Path and anchor helpers shared by the wikilink and embed passes.

/// Sanitize a link target for use as a markdown link destination.
///
/// Characters that are invalid in file names (`<>:"|?*`) become `_`, spaces
/// become `%20`, and backslashes become forward slashes.
///
/// # Examples
///
/// ```
/// use mdprep_preprocess::sanitize_path;
///
/// assert_eq!(sanitize_path(r"notes\My Note?"), "notes/My%20Note_");
/// ```
pub fn sanitize_path(path: &str) -> String {
    let mut sanitized = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            ' ' => sanitized.push_str("%20"),
            '\\' => sanitized.push('/'),
            _ => sanitized.push(c),
        }
    }
    sanitized
}

/// Convert a heading into a lowercase, dash-joined anchor.
///
/// # Examples
///
/// ```
/// use mdprep_preprocess::heading_anchor;
///
/// assert_eq!(heading_anchor("Section Two"), "section-two");
/// assert_eq!(heading_anchor("  What's new? (v2) "), "whats-new-v2");
/// ```
pub fn heading_anchor(heading: &str) -> String {
    let mut anchor = String::with_capacity(heading.len());
    for c in heading.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            if !anchor.ends_with('-') {
                anchor.push('-');
            }
        } else if c.is_alphanumeric() || c == '_' {
            anchor.push(c);
        }
    }
    anchor.trim_matches('-').to_owned()
}

/// Prefix a relative path with `base_url`. Absolute paths and URLs are kept.
pub(crate) fn apply_base_url(path: String, base_url: Option<&str>) -> String {
    match base_url {
        Some(base) if !base.is_empty() && !is_absolute(&path) => {
            format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
        }
        _ => path,
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.contains("://")
}

/// Last path component (after the final `/` or `\`).
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// File name without its final extension.
pub(crate) fn base_name(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Lowercased extension of the file name, if any.
pub(crate) fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(name[dot + 1..].to_lowercase()),
        _ => None,
    }
}
