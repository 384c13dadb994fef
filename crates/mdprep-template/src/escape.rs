//! Markup escaping for substituted values.

/// Escape a value for literal inclusion in template markup.
///
/// Each of `\ $ # [ ] { } < > "` is prefixed with a backslash. Backslashes
/// are handled in the same single pass, so no character is escaped twice.
///
/// # Examples
///
/// ```
/// use mdprep_template::escape_markup;
///
/// assert_eq!(escape_markup("#1 [draft]"), r"\#1 \[draft\]");
/// assert_eq!(escape_markup(r"C:\tmp"), r"C:\\tmp");
/// ```
pub fn escape_markup(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + value.len() / 4);
    for c in value.chars() {
        if matches!(c, '\\' | '$' | '#' | '[' | ']' | '{' | '}' | '<' | '>' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Reverse [`escape_markup`]: drop the backslash before any character.
pub fn unescape_markup(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(next) = chars.next()
        {
            unescaped.push(next);
            continue;
        }
        unescaped.push(c);
    }
    unescaped
}

/// Whether `text` contains `target` without a preceding escape backslash.
pub(crate) fn contains_unescaped(text: &str, target: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == target {
            return true;
        }
    }
    false
}
