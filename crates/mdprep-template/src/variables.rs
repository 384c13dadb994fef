//! `$name$` placeholder extraction.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\w+)\$").unwrap());

/// Distinct placeholder names in order of first appearance.
///
/// # Examples
///
/// ```
/// use mdprep_template::extract_variables;
///
/// let vars = extract_variables("= $title$\n$author$, $title$\n$body$");
/// assert_eq!(vars, vec!["title", "author", "body"]);
/// ```
pub fn extract_variables(template: &str) -> Vec<String> {
    count_variables(template)
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

/// Placeholder names with their occurrence counts, in order of first
/// appearance.
pub fn count_variables(template: &str) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for caps in VARIABLE_RE.captures_iter(template) {
        let name = &caps[1];
        match counts.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.to_owned(), 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_variables() {
        assert_eq!(
            count_variables("$a$ $b$ $a$ $a$"),
            vec![("a".to_owned(), 3), ("b".to_owned(), 1)]
        );
    }

    #[test]
    fn test_ignores_non_identifiers() {
        assert!(extract_variables("$ x $ and $a-b$ and 5$").is_empty());
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(extract_variables("$a$$b$"), vec!["a", "b"]);
    }
}
