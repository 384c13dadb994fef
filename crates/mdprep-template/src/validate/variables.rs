//! Placeholder name checks.

use std::sync::LazyLock;

use regex::Regex;

use super::TemplateValidationResult;
use crate::variables::count_variables;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// Common misspellings of standard variable names.
const TYPOS: &[(&str, &str)] = &[
    ("titel", "title"),
    ("tittle", "title"),
    ("tilte", "title"),
    ("authur", "author"),
    ("auther", "author"),
    ("athor", "author"),
    ("bdy", "body"),
    ("boddy", "body"),
    ("dat", "date"),
    ("daet", "date"),
    ("fontsize", "fontSize"),
    ("font_size", "fontSize"),
    ("pagesize", "pageSize"),
    ("page_size", "pageSize"),
    ("margin", "margins"),
];

/// Every `$...$` pair on a line must enclose a legal identifier.
///
/// Unescaped `$` characters are paired left to right within each line; a
/// trailing unpaired `$` is ignored.
pub(crate) fn check_variable_names(text: &str, result: &mut TemplateValidationResult) {
    for (index, line) in text.lines().enumerate() {
        let positions = unescaped_dollars(line);
        for pair in positions.chunks_exact(2) {
            let inner = &line[pair[0] + 1..pair[1]];
            if !IDENTIFIER_RE.is_match(inner) {
                result.errors.push(format!(
                    "Invalid variable name '{inner}' at line {}",
                    index + 1
                ));
            }
        }
    }
}

fn unescaped_dollars(line: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '$' {
            positions.push(i);
        }
    }
    positions
}

/// Warn about names that look like misspelled standard variables and about
/// variables referenced only once.
pub(crate) fn check_variable_usage(text: &str, result: &mut TemplateValidationResult) {
    for (name, count) in count_variables(text) {
        if let Some((_, correct)) = TYPOS.iter().find(|(typo, _)| *typo == name) {
            result.warnings.push(format!(
                "Variable '${name}$' looks like a misspelling of '${correct}$'"
            ));
        }
        if count == 1 && name != "body" {
            result.warnings.push(format!(
                "Variable '${name}$' is used only once; check that the name is intentional"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names(text: &str) -> Vec<String> {
        let mut result = TemplateValidationResult::default();
        check_variable_names(text, &mut result);
        result.errors
    }

    fn usage(text: &str) -> Vec<String> {
        let mut result = TemplateValidationResult::default();
        check_variable_usage(text, &mut result);
        result.warnings
    }

    #[test]
    fn test_legal_names() {
        assert!(names("$title$ and $_x1$\n$body$").is_empty());
    }

    #[test]
    fn test_illegal_names_reported_with_line() {
        assert_eq!(
            names("ok $a$\n$1st$ and $page-size$"),
            vec![
                "Invalid variable name '1st' at line 2",
                "Invalid variable name 'page-size' at line 2",
            ]
        );
    }

    #[test]
    fn test_escaped_dollars_ignored() {
        assert!(names(r"costs \$5 and \$10 $title$").is_empty());
    }

    #[test]
    fn test_unpaired_dollar_ignored() {
        assert!(names("$title$ costs 5$").is_empty());
    }

    #[test]
    fn test_typo_warning() {
        assert_eq!(
            usage("$titel$ $titel$"),
            vec!["Variable '$titel$' looks like a misspelling of '$title$'"]
        );
    }

    #[test]
    fn test_single_use_warning_excludes_body() {
        assert_eq!(
            usage("$body$ $title$ $author$ $author$"),
            vec!["Variable '$title$' is used only once; check that the name is intentional"]
        );
    }
}
