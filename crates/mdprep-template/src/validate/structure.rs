//! Document-level checks: required placeholders, setup rules, version
//! features and paper sizes.

use std::sync::LazyLock;

use regex::Regex;

use super::TemplateValidationResult;

static SET_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#set\s+([A-Za-z_][\w-]*)\s*\(").unwrap());

static PAPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"paper\s*:\s*"([^"]*)""#).unwrap());

/// Setup rules every template is expected to configure.
const SETUP_RULES: [(&str, &str); 3] = [
    ("page", "page size and margins"),
    ("text", "font and size"),
    ("par", "paragraph layout"),
];

/// Syntax introduced in later compiler releases: `(pattern, feature, version)`.
static VERSION_FEATURES: LazyLock<Vec<(Regex, &'static str, &'static str)>> =
    LazyLock::new(|| {
        vec![
            (
                Regex::new(r"\b(?:height|width)\s*:\s*auto\b").unwrap(),
                "auto-sized pages",
                "0.1.0",
            ),
            (
                Regex::new(r"#context\b|\bcontext\s*[\[{(]").unwrap(),
                "context blocks",
                "0.11.0",
            ),
            (
                Regex::new(r#"\bscope\s*:\s*"parent""#).unwrap(),
                "parent-scope placement",
                "0.12.0",
            ),
        ]
    });

/// Paper sizes accepted by `#set page(paper: ...)`.
pub(crate) const PAPER_SIZES: &[&str] = &[
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "a10", "a11", "iso-b1",
    "iso-b2", "iso-b3", "iso-b4", "iso-b5", "iso-b6", "iso-b7", "iso-b8", "iso-c3", "iso-c4",
    "iso-c5", "iso-c6", "iso-c7", "iso-c8", "us-letter", "us-legal", "us-tabloid",
    "us-executive", "us-statement", "us-trade", "us-digest", "us-business-card",
    "presentation-16-9", "presentation-4-3",
];

/// `$body$` is mandatory; missing setup rules only warn.
pub(crate) fn check_structure(text: &str, result: &mut TemplateValidationResult) {
    if !text.contains("$body$") {
        result
            .errors
            .push("Template must contain the $body$ placeholder".to_owned());
    }

    let rules: Vec<&str> = SET_RULE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    for (rule, purpose) in SETUP_RULES {
        if !rules.contains(&rule) {
            result.warnings.push(format!(
                "Template has no '#set {rule}' rule; compiler defaults will be used for {purpose}"
            ));
        }
    }
}

/// Note syntax that needs a minimum compiler version.
pub(crate) fn check_version_features(text: &str, result: &mut TemplateValidationResult) {
    for (pattern, feature, version) in VERSION_FEATURES.iter() {
        if pattern.is_match(text) {
            result.warnings.push(format!(
                "Template uses {feature}, which requires compiler version {version} or newer"
            ));
        }
    }
}

/// Warn about `paper: "..."` values that are not known paper sizes.
/// Values containing a placeholder are skipped.
pub(crate) fn check_paper_sizes(text: &str, result: &mut TemplateValidationResult) {
    for caps in PAPER_RE.captures_iter(text) {
        let paper = &caps[1];
        if paper.contains('$') || PAPER_SIZES.contains(&paper) {
            continue;
        }
        result.warnings.push(format!(
            "Unknown paper size '{paper}'. Valid options: {}",
            PAPER_SIZES.join(", ")
        ));
    }
}
