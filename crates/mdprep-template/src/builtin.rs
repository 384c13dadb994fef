//! Templates shipped with the binary.

use std::collections::BTreeMap;

use crate::template::{Template, TemplateMetadata, TemplateSource, VariableSpec, VariableType};

struct BuiltinTemplate {
    name: &'static str,
    content: &'static str,
    description: &'static str,
    /// Variables beyond the standard set: `(name, default, description, required)`.
    extra_variables: &'static [(&'static str, Option<&'static str>, &'static str, bool)],
}

const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "default",
        content: include_str!("../templates/default.typ"),
        description: "Simple document with a centered title block",
        extra_variables: &[],
    },
    BuiltinTemplate {
        name: "article",
        content: include_str!("../templates/article.typ"),
        description: "Article with abstract and numbered sections",
        extra_variables: &[("abstract", Some(""), "Abstract paragraph", false)],
    },
    BuiltinTemplate {
        name: "report",
        content: include_str!("../templates/report.typ"),
        description: "Report with title page and table of contents",
        extra_variables: &[("organization", Some(""), "Organization shown on the title page", false)],
    },
    BuiltinTemplate {
        name: "letter",
        content: include_str!("../templates/letter.typ"),
        description: "Formal letter with sender and recipient blocks",
        extra_variables: &[
            ("sender", Some(""), "Sender address", false),
            ("recipient", None, "Recipient address", true),
            ("subject", Some(""), "Subject line", false),
            ("closing", Some("Kind regards,"), "Closing phrase", false),
        ],
    },
];

/// Variables every built-in template understands.
fn standard_variables() -> BTreeMap<String, VariableSpec> {
    [
        ("title", None, "Document title"),
        ("author", None, "Document author"),
        ("date", None, "Document date (defaults to today)"),
        ("font", Some("New Computer Modern"), "Body font family"),
        ("fontSize", Some("11pt"), "Body font size"),
        ("pageSize", Some("a4"), "Paper size"),
        ("margins", Some("2.5cm"), "Page margins"),
    ]
    .into_iter()
    .map(|(name, default, description)| {
        (
            name.to_owned(),
            VariableSpec::new(VariableType::String, default, description),
        )
    })
    .chain(std::iter::once((
        "body".to_owned(),
        VariableSpec::new(VariableType::String, None, "Converted document content").required(),
    )))
    .collect()
}

/// Built-in templates in registration order.
pub(crate) fn builtin_templates() -> Vec<Template> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|builtin| {
            let mut variables = standard_variables();
            for &(name, default, description, required) in builtin.extra_variables {
                let mut spec = VariableSpec::new(VariableType::String, default, description);
                spec.required = required;
                variables.insert(name.to_owned(), spec);
            }

            Template {
                name: builtin.name.to_owned(),
                source: TemplateSource::BuiltIn(builtin.name),
                variables,
                metadata: TemplateMetadata {
                    author: Some("mdprep".to_owned()),
                    version: Some(env!("CARGO_PKG_VERSION").to_owned()),
                    description: Some(builtin.description.to_owned()),
                    compatibility: vec!["0.11".to_owned(), "0.12".to_owned(), "0.13".to_owned()],
                },
            }
        })
        .collect()
}

/// Text of a built-in template.
pub(crate) fn builtin_content(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|builtin| builtin.name == name)
        .map(|builtin| builtin.content)
}
