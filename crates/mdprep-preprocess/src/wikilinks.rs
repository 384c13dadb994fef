//! Wikilink (`[[target#heading|alias]]`) conversion to markdown links.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::LinkError;
use crate::fence::rewrite_outside_code;
use crate::options::{LinkFormat, LinkOptions};
use crate::paths::{apply_base_url, heading_anchor, sanitize_path};
use crate::result::PreprocessingResult;

static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|#]*)(?:#([^\[\]|]*))?(?:\|([^\[\]]*))?\]\]").unwrap()
});

/// Wikilink pass. Matches preceded by `!` are embeds and stay untouched.
pub(crate) fn convert_wikilinks(
    content: &str,
    links: &LinkOptions,
    result: &mut PreprocessingResult,
) -> String {
    rewrite_outside_code(content, |chunk| {
        let mut output = String::with_capacity(chunk.len());
        let mut last = 0;

        for caps in WIKILINK_RE.captures_iter(chunk) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            output.push_str(&chunk[last..whole.start()]);
            last = whole.end();

            if chunk[..whole.start()].ends_with('!') {
                output.push_str(whole.as_str());
                continue;
            }
            match convert_wikilink(&caps, links) {
                Ok(link) => output.push_str(&link),
                Err(error) => {
                    result.warn(error.to_string());
                    output.push_str(whole.as_str());
                }
            }
        }

        output.push_str(&chunk[last..]);
        output
    })
}

fn convert_wikilink(caps: &Captures, links: &LinkOptions) -> Result<String, LinkError> {
    let target = caps[1].trim();
    if target.is_empty() {
        return Err(LinkError::EmptyWikilink(caps[0].to_owned()));
    }
    let heading = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|h| !h.is_empty());
    let alias = caps
        .get(3)
        .map(|m| m.as_str().trim())
        .filter(|a| !a.is_empty());

    let mut path = sanitize_path(target);
    if links.format == LinkFormat::Markdown
        && !links.extension.is_empty()
        && !path.ends_with(links.extension.as_str())
    {
        path.push_str(&links.extension);
    }
    if let Some(heading) = heading {
        let anchor = heading_anchor(heading);
        if !anchor.is_empty() {
            path.push('#');
            path.push_str(&anchor);
        }
    }

    let display = match (alias, heading) {
        (Some(alias), _) => alias.to_owned(),
        (None, Some(heading)) => format!("{target}#{heading}"),
        (None, None) => target.to_owned(),
    };

    let path = apply_base_url(path, links.base_url.as_deref());
    Ok(format!("[{display}]({path})"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn convert_with(content: &str, links: &LinkOptions) -> (String, PreprocessingResult) {
        let mut result = PreprocessingResult::default();
        let output = convert_wikilinks(content, links, &mut result);
        (output, result)
    }

    fn convert(content: &str) -> String {
        convert_with(content, &LinkOptions::default()).0
    }

    #[test]
    fn test_heading_and_alias() {
        assert_eq!(
            convert("[[My Note#Section Two|See here]]"),
            "[See here](My%20Note.md#section-two)"
        );
    }

    #[test]
    fn test_display_precedence() {
        assert_eq!(convert("[[Note#Intro]]"), "[Note#Intro](Note.md#intro)");
        assert_eq!(convert("[[ Note ]]"), "[Note](Note.md)");
        assert_eq!(convert("[[Note|Alias]]"), "[Alias](Note.md)");
    }

    #[test]
    fn test_extension_not_duplicated() {
        assert_eq!(convert("[[Folder/Readme.md]]"), "[Folder/Readme.md](Folder/Readme.md)");
    }

    #[test]
    fn test_no_extension_format() {
        let links = LinkOptions {
            format: LinkFormat::NoExtension,
            ..LinkOptions::default()
        };
        assert_eq!(convert_with("[[A B]]", &links).0, "[A B](A%20B)");
    }

    #[test]
    fn test_base_url() {
        let links = LinkOptions {
            base_url: Some("https://notes.example.com/".to_owned()),
            ..LinkOptions::default()
        };
        assert_eq!(
            convert_with("[[Note]]", &links).0,
            "[Note](https://notes.example.com/Note.md)"
        );
    }

    #[test]
    fn test_empty_target_passes_through_with_warning() {
        let (output, result) = convert_with("see [[ |alias]] and [[#heading]]", &LinkOptions::default());
        assert_eq!(output, "see [[ |alias]] and [[#heading]]");
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].starts_with("Empty wikilink target"));
    }

    #[test]
    fn test_embeds_are_skipped() {
        assert_eq!(convert("![[diagram.png]] [[Note]]"), "![[diagram.png]] [Note](Note.md)");
    }

    #[test]
    fn test_malformed_links_untouched() {
        assert_eq!(convert("[[unclosed and [single]"), "[[unclosed and [single]");
    }

    #[test]
    fn test_fenced_code_untouched() {
        let input = "```\n[[Note]]\n```\n[[Note]]\n";
        assert_eq!(convert(input), "```\n[[Note]]\n```\n[Note](Note.md)\n");
    }
}
