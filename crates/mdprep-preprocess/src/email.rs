//! Conversion of fenced `email` blocks into a raw markup function call.
//!
//! ````text
//! ```email
//! ---
//! from: Ann <ann@example.com>
//! subject: Status
//! ---
//! Body text
//! ```
//! ````
//!
//! becomes a raw `typst` block calling `#emailBlock(from: "...", subject: "...", "Body text")`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EmailBlockError;
use crate::fence::{FenceLine, FenceTracker};
use crate::frontmatter::{FrontmatterMap, fallback_parse, parse_yaml};
use crate::link_filter::filter_noise_links;
use crate::result::PreprocessingResult;

/// Raw output format tag of the emitted block.
pub const RAW_FORMAT: &str = "typst";

/// Markup function the block is rendered as.
pub const EMAIL_FUNCTION: &str = "emailBlock";

/// Fence info string that marks an email block.
const EMAIL_INFO: &str = "email";

/// Header keys forwarded as named arguments, in emission order.
const HEADER_KEYS: [&str; 4] = ["from", "to", "subject", "date"];

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());

/// Escape text for inclusion in a double-quoted markup string literal.
///
/// Unicode space, dash, zero-width and bullet variants are normalized to
/// ASCII first. Backslashes and both quote characters are escaped, runs of
/// three or more newlines collapse to a single blank line, and real newlines
/// are kept.
///
/// # Examples
///
/// ```
/// use mdprep_preprocess::escape_string_literal;
///
/// assert_eq!(escape_string_literal("say \"hi\"\u{2014}now"), r#"say \"hi\"-now"#);
/// ```
pub fn escape_string_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\r' => {}
            '\u{00A0}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
                escaped.push(' ');
            }
            '\u{2010}'..='\u{2015}' | '\u{2212}' => escaped.push('-'),
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => {}
            '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{2219}' | '\u{25E6}' => escaped.push('-'),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }

    BLANK_RUN_RE
        .replace_all(&escaped, "\n\n")
        .trim()
        .to_owned()
}

/// A parsed email block.
#[derive(Debug, Default, PartialEq)]
struct EmailBlock {
    fields: Vec<(&'static str, String)>,
    body: String,
}

impl EmailBlock {
    fn to_markup(&self) -> String {
        let mut args = String::new();
        for (key, value) in &self.fields {
            args.push_str(key);
            args.push_str(": \"");
            args.push_str(&escape_string_literal(value));
            args.push_str("\", ");
        }

        let body = escape_string_literal(&filter_noise_links(&self.body));
        format!("```{{={RAW_FORMAT}}}\n#{EMAIL_FUNCTION}({args}\"{body}\")\n```")
    }
}

/// Email pass: replace every fenced `email` block outside other fences.
///
/// An unterminated email fence is left as is. A block whose header cannot be
/// parsed is re-emitted as a plain fenced code block with a warning.
pub(crate) fn convert_email_blocks(content: &str, result: &mut PreprocessingResult) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut output = String::with_capacity(content.len());
    let mut fence = FenceTracker::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let FenceLine::Opening(info) = fence.classify(line) else {
            output.push_str(line);
            i += 1;
            continue;
        };
        if !is_email_info(info) {
            output.push_str(line);
            i += 1;
            continue;
        }

        let close = (i + 1..lines.len()).find(|&j| fence.classify(lines[j]) == FenceLine::Closing);
        let Some(close) = close else {
            lines[i..].iter().for_each(|l| output.push_str(l));
            break;
        };

        let inner: Vec<&str> = lines[i + 1..close]
            .iter()
            .map(|l| l.trim_end_matches(['\n', '\r']))
            .collect();
        output.push_str(&render_block(&inner, i + 2, result));
        if lines[close].ends_with('\n') {
            output.push('\n');
        }
        i = close + 1;
    }

    output
}

fn is_email_info(info: &str) -> bool {
    info.split_whitespace()
        .next()
        .is_some_and(|lang| lang.eq_ignore_ascii_case(EMAIL_INFO))
}

/// Render one block. `first_line` is the 1-based document line of `inner[0]`.
fn render_block(inner: &[&str], first_line: usize, result: &mut PreprocessingResult) -> String {
    match parse_email(inner, first_line, result) {
        Ok(email) => email.to_markup(),
        Err(error) => {
            tracing::warn!(%error, "Email block kept as plain code block");
            result.warn(format!(
                "Email block could not be converted ({error}); kept as code block"
            ));
            format!("```\n{}\n```", inner.join("\n"))
        }
    }
}

fn parse_email(
    inner: &[&str],
    first_line: usize,
    result: &mut PreprocessingResult,
) -> Result<EmailBlock, EmailBlockError> {
    let (header_lines, body_lines): (&[&str], &[&str]) =
        match inner.iter().position(|l| !l.trim().is_empty()) {
            Some(open) if inner[open].trim() == "---" => {
                let close = inner[open + 1..]
                    .iter()
                    .position(|l| l.trim() == "---")
                    .ok_or(EmailBlockError::UnclosedHeader {
                        line: first_line + open,
                    })?;
                let close = open + 1 + close;
                (&inner[open + 1..close], &inner[close + 1..])
            }
            _ => (&[], inner),
        };

    let header = parse_header(header_lines, result);
    let fields = HEADER_KEYS
        .iter()
        .filter_map(|&key| {
            let value = header.get(key)?.to_display_string()?;
            (!value.is_empty()).then_some((key, value))
        })
        .collect();

    Ok(EmailBlock {
        fields,
        body: body_lines.join("\n"),
    })
}

fn parse_header(lines: &[&str], result: &mut PreprocessingResult) -> FrontmatterMap {
    if lines.is_empty() {
        return FrontmatterMap::new();
    }

    let yaml = lines
        .iter()
        .map(|line| quote_link_value(line))
        .collect::<Vec<_>>()
        .join("\n");

    match parse_yaml(&yaml) {
        Ok(map) => map,
        Err(error) => {
            tracing::warn!(%error, "Email header is not valid YAML, using fallback parser");
            result.warn(format!(
                "Email header could not be parsed as YAML ({error}); used fallback parser"
            ));
            fallback_parse(&yaml)
        }
    }
}

/// Quote a header value that contains `[[` or `{{` so YAML reads it as a
/// plain string instead of a flow collection.
fn quote_link_value(line: &str) -> Cow<'_, str> {
    let Some((key, value)) = line.split_once(':') else {
        return Cow::Borrowed(line);
    };
    let value = value.trim();
    let needs_quotes = (value.contains("[[") || value.contains("{{"))
        && !value.starts_with(['"', '\'']);
    if !needs_quotes {
        return Cow::Borrowed(line);
    }

    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    Cow::Owned(format!("{key}: \"{escaped}\""))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frontmatter::FrontmatterValue;

    fn convert(content: &str) -> (String, PreprocessingResult) {
        let mut result = PreprocessingResult::default();
        let output = convert_email_blocks(content, &mut result);
        (output, result)
    }

    #[test]
    fn test_escape_string_literal_quotes_and_backslashes() {
        assert_eq!(escape_string_literal(r#"a\b "c" 'd'"#), r#"a\\b \"c\" \'d\'"#);
    }

    #[test]
    fn test_escape_string_literal_normalizes_unicode() {
        assert_eq!(
            escape_string_literal("a\u{00A0}b\u{2013}c\u{200B}d \u{2022} e"),
            "a b-cd - e"
        );
    }

    #[test]
    fn test_escape_string_literal_collapses_blank_runs() {
        assert_eq!(
            escape_string_literal("\n\none\n\n\n\ntwo\r\nthree\n"),
            "one\n\ntwo\nthree"
        );
    }

    #[test]
    fn test_converts_email_block() {
        let input = "Before\n```email\n---\nfrom: Ann <ann@example.com>\nto: [Bob, Cy]\nsubject: \"Hi\"\nx-mailer: ignored\n---\nLine one\n\nLine \"two\"\n```\nAfter\n";
        let (output, result) = convert(input);

        assert_eq!(
            output,
            "Before\n```{=typst}\n#emailBlock(from: \"Ann <ann@example.com>\", to: \"Bob, Cy\", subject: \"Hi\", \"Line one\n\nLine \\\"two\\\"\")\n```\nAfter\n"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_block_without_header_uses_whole_body() {
        let (output, _) = convert("```email\nJust text\n```");
        assert_eq!(output, "```{=typst}\n#emailBlock(\"Just text\")\n```");
    }

    #[test]
    fn test_quotes_wikilink_values() {
        let (output, result) = convert("```email\n---\nfrom: [[Ann Smith]]\n---\nBody\n```\n");
        assert!(output.contains("from: \"[[Ann Smith]]\""));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_filters_noise_links_in_body() {
        let (output, _) = convert("```email\nHi [Open: Mail](message://abc)\n```\n");
        assert!(!output.contains("message://"));
        assert!(output.contains("#emailBlock(\"Hi\")"));
    }

    #[test]
    fn test_unclosed_header_falls_back_to_code_block() {
        let (output, result) = convert("```email\n---\nfrom: Ann\nBody\n```\n");
        assert_eq!(output, "```\n---\nfrom: Ann\nBody\n```\n");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("line 2"));
    }

    #[test]
    fn test_malformed_header_uses_fallback_parser() {
        let (output, result) = convert("```email\n---\nfrom: Ann\nsubject: [unclosed\n---\nBody\n```\n");
        assert!(output.contains("from: \"Ann\""));
        assert!(output.contains("subject: \"[unclosed\""));
        assert!(result.warnings.iter().any(|w| w.contains("fallback")));
    }

    #[test]
    fn test_unterminated_email_fence_is_unchanged() {
        let input = "```email\n---\nfrom: Ann\n---\nBody\n";
        let (output, _) = convert(input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_email_inside_other_fence_is_unchanged() {
        let input = "````markdown\n```email\nBody\n```\n````\n";
        let (output, _) = convert(input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_header_value_model() {
        let mut result = PreprocessingResult::default();
        let header = parse_header(&["from: Ann", "date: 2024-01-05"], &mut result);
        assert_eq!(header["from"], FrontmatterValue::String("Ann".to_owned()));
    }
}
