//! Function-call checks against the known markup functions.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::TemplateValidationResult;

/// `#name(` calls. Method calls such as `#calc.max(` report the root name.
static FUNCTION_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z_][\w-]*)(?:\.[A-Za-z_][\w-]*)*\(").unwrap());

/// `#let name(` definitions.
static FUNCTION_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#let\s+([A-Za-z_][\w-]*)\s*\(").unwrap());

/// Built-in functions and modules of the target markup language.
pub(crate) const KNOWN_FUNCTIONS: &[&str] = &[
    "align", "assert", "bibliography", "block", "box", "calc", "circle", "cite", "cmyk",
    "colbreak", "columns", "counter", "csv", "datetime", "document", "ellipse", "emph", "enum",
    "eval", "figure", "float", "footnote", "grid", "h", "heading", "hide", "highlight", "image",
    "int", "json", "label", "layout", "line", "link", "list", "locate", "lorem", "lower", "luma",
    "measure", "metadata", "move", "numbering", "outline", "overline", "pad", "page",
    "pagebreak", "panic", "par", "parbreak", "path", "place", "polygon", "query", "quote",
    "range", "raw", "read", "rect", "ref", "repeat", "repr", "rgb", "rotate", "scale",
    "smallcaps", "square", "stack", "state", "str", "strike", "strong", "sub", "super", "sym",
    "table", "terms", "text", "toml", "type", "underline", "upper", "v", "xml", "yaml",
];

/// Names of functions called as `#name(`, skipping escaped `\#`.
pub(crate) fn called_functions(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in FUNCTION_CALL_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if text[..whole.start()].ends_with('\\') {
            continue;
        }
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Names of functions defined with `#let name(`.
pub(crate) fn defined_functions(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in FUNCTION_DEF_RE.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Warn about every called function that is neither known nor defined in the
/// template.
pub(crate) fn check_functions(
    text: &str,
    known: &BTreeSet<String>,
    result: &mut TemplateValidationResult,
) {
    let defined = defined_functions(text);
    for name in called_functions(text) {
        if known.contains(&name) || defined.contains(&name) {
            continue;
        }
        result
            .warnings
            .push(format!("Unknown function '#{name}' (not a built-in or defined in the template)"));
    }
}
