//! Template validation.
//!
//! Each check runs independently over the template text and appends to one
//! [`TemplateValidationResult`]. Errors block rendering; warnings are advisory
//! and never affect validity.

mod brackets;
mod functions;
mod scanner;
mod structure;
mod variables;

use std::collections::BTreeSet;

use crate::context::SubstitutionContext;
use crate::variables::extract_variables;

pub(crate) use functions::{called_functions, defined_functions};

/// Outcome of validating a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Distinct placeholder names in order of first appearance.
    pub variables: Vec<String>,
}

impl TemplateValidationResult {
    /// Valid exactly when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the template checks.
#[derive(Debug, Clone)]
pub struct TemplateValidator {
    known_functions: BTreeSet<String>,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateValidator {
    pub fn new() -> Self {
        Self {
            known_functions: functions::KNOWN_FUNCTIONS
                .iter()
                .map(|&name| name.to_owned())
                .collect(),
        }
    }

    /// Accept an additional function name (e.g. one provided by a package).
    #[must_use]
    pub fn with_known_function(mut self, name: impl Into<String>) -> Self {
        self.known_functions.insert(name.into());
        self
    }

    /// Run every text check.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdprep_template::TemplateValidator;
    ///
    /// let result = TemplateValidator::new().validate("#set page(margin: (x: 1cm)\n$body$");
    /// assert!(!result.is_valid());
    /// assert!(result.errors[0].contains("parentheses"));
    /// ```
    pub fn validate(&self, text: &str) -> TemplateValidationResult {
        let mut result = TemplateValidationResult {
            variables: extract_variables(text),
            ..TemplateValidationResult::default()
        };

        brackets::check_brackets(text, &mut result);
        brackets::check_strings(text, &mut result);
        functions::check_functions(text, &self.known_functions, &mut result);
        variables::check_variable_names(text, &mut result);
        variables::check_variable_usage(text, &mut result);
        structure::check_structure(text, &mut result);
        structure::check_version_features(text, &mut result);
        structure::check_paper_sizes(text, &mut result);

        tracing::debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Validated template"
        );
        result
    }

    /// Check that `context` supplies every required variable the template
    /// references.
    ///
    /// `body` is always required when referenced; `required` lists further
    /// names declared as required by the template.
    pub fn validate_context(
        &self,
        result: &mut TemplateValidationResult,
        context: &SubstitutionContext,
        required: &[&str],
    ) {
        let mut names: Vec<&str> = Vec::new();
        if result.variables.iter().any(|v| v == "body") {
            names.push("body");
        }
        for &name in required {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        for name in names {
            match context.get(name) {
                None => result.errors.push(format!(
                    "Required variable '{name}' is missing from the substitution context"
                )),
                Some(value) if value.as_str().trim().is_empty() => result
                    .errors
                    .push(format!("Required variable '{name}' is empty")),
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GOOD: &str = "#set page(paper: \"a4\")\n#set text(size: 11pt)\n#set par(justify: true)\n= $title$\n#text[$title$]\n$body$\n";

    #[test]
    fn test_valid_template() {
        let result = TemplateValidator::new().validate(GOOD);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert_eq!(result.variables, vec!["title", "body"]);
    }

    #[test]
    fn test_unclosed_parenthesis_names_parentheses() {
        let result = TemplateValidator::new().validate("#set page(margin: (x: 1cm)");
        let paren_errors: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.contains("parentheses"))
            .collect();
        assert_eq!(paren_errors.len(), 1);
        assert!(paren_errors[0].contains("line 1"));
    }

    #[test]
    fn test_warnings_do_not_affect_validity() {
        let result = TemplateValidator::new().validate("#mystery(1)\n$body$");
        assert!(result.is_valid());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_with_known_function() {
        let validator = TemplateValidator::new().with_known_function("mystery");
        let result = validator.validate(&format!("{GOOD}#mystery(1)"));
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_missing_body_in_context() {
        let validator = TemplateValidator::new();
        let mut result = validator.validate(GOOD);
        validator.validate_context(&mut result, &SubstitutionContext::new(), &[]);
        assert!(!result.is_valid());
        assert_eq!(
            result.errors,
            vec!["Required variable 'body' is missing from the substitution context"]
        );
    }

    #[test]
    fn test_declared_required_variables() {
        let validator = TemplateValidator::new();
        let mut result = validator.validate(GOOD);
        let context = SubstitutionContext::new()
            .with_raw("body", "text")
            .with("author", "  ");
        validator.validate_context(&mut result, &context, &["author", "recipient"]);
        assert_eq!(
            result.errors,
            vec![
                "Required variable 'author' is empty",
                "Required variable 'recipient' is missing from the substitution context",
            ]
        );
    }

    #[test]
    fn test_body_not_required_when_unreferenced() {
        let validator = TemplateValidator::new();
        let mut result = validator.validate("no placeholders");
        validator.validate_context(&mut result, &SubstitutionContext::new(), &[]);
        assert!(!result.errors.iter().any(|e| e.contains("Required")));
    }
}
