//! `$name$` placeholder substitution.

use std::collections::BTreeMap;

use regex::Captures;

use crate::context::{ContextValue, SubstitutionContext};
use crate::escape::escape_markup;
use crate::variables::VARIABLE_RE;

/// Replace every `$name$` placeholder with its escaped context value.
///
/// Missing names use the built-in defaults. Substitution never fails;
/// whether required values are present is decided by validation.
///
/// # Examples
///
/// ```
/// use mdprep_template::{SubstitutionContext, substitute};
///
/// let context = SubstitutionContext::new().with("title", "Q&A #1");
/// assert_eq!(substitute("= $title$", &context), r"= Q&A \#1");
/// ```
pub fn substitute(template: &str, context: &SubstitutionContext) -> String {
    substitute_with_defaults(template, context, &BTreeMap::new())
}

/// Like [`substitute`], with template-declared defaults consulted before the
/// built-in ones.
pub(crate) fn substitute_with_defaults(
    template: &str,
    context: &SubstitutionContext,
    declared: &BTreeMap<String, String>,
) -> String {
    VARIABLE_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match context.get(name) {
                Some(ContextValue::Text(value)) => escape_markup(value),
                Some(ContextValue::Raw(value)) => value.clone(),
                None => match declared.get(name) {
                    Some(value) => escape_markup(value),
                    None => escape_markup(&context.default_value(name)),
                },
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::escape::{contains_unescaped, unescape_markup};

    #[test]
    fn test_replaces_all_occurrences() {
        let context = SubstitutionContext::new().with("name", "X");
        assert_eq!(substitute("$name$-$name$", &context), "X-X");
    }

    #[test]
    fn test_escapes_text_but_not_raw() {
        let context = SubstitutionContext::new()
            .with("title", "[a]")
            .with_raw("body", "#strong[b]");
        assert_eq!(substitute("$title$ $body$", &context), r"\[a\] #strong[b]");
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let context = SubstitutionContext::new().with_today("2024-01-02");
        assert_eq!(
            substitute("$title$|$date$|$font$|$other$|$body$", &context),
            "|2024-01-02|New Computer Modern||"
        );
    }

    #[test]
    fn test_declared_defaults_win_over_builtin() {
        let declared = BTreeMap::from([("fontSize".to_owned(), "12pt".to_owned())]);
        let output =
            substitute_with_defaults("$fontSize$ $pageSize$", &SubstitutionContext::new(), &declared);
        assert_eq!(output, "12pt a4");
    }

    #[test]
    fn test_values_are_not_substituted_twice() {
        let context = SubstitutionContext::new()
            .with("a", "$b$")
            .with("b", "nope");
        assert_eq!(substitute("$a$", &context), r"\$b\$");
    }

    #[test]
    fn test_escaped_title_round_trips() {
        let title = r#"A "quoted" #value"#;
        let context = SubstitutionContext::new().with("title", title);
        let output = substitute("$title$", &context);
        assert!(!contains_unescaped(&output, '"'));
        assert!(!contains_unescaped(&output, '#'));
        assert_eq!(unescape_markup(&output), title);
    }
}
