//! Inline hashtag extraction.

use crate::fence::strip_code;
use crate::frontmatter::split_frontmatter;

/// How far back a preceding `#` disqualifies a hashtag candidate.
const HEADING_LOOKBEHIND: usize = 5;

/// Extract inline `#tags` in order of first appearance.
///
/// Frontmatter, fenced code and inline code spans are ignored. A tag must be
/// preceded by the start of the line or whitespace, start with a letter, and
/// may continue with letters, digits, `_`, `-` and `/`. Trailing separators
/// are not part of the tag.
///
/// # Examples
///
/// ```
/// use mdprep_preprocess::extract_tags;
///
/// assert_eq!(extract_tags("#alpha #beta #alpha"), vec!["alpha", "beta"]);
/// assert_eq!(extract_tags("## Heading\n`#code`"), Vec::<String>::new());
/// ```
pub fn extract_tags(content: &str) -> Vec<String> {
    let body = split_frontmatter(content).map_or(content, |(_, body)| body);
    let stripped = strip_code(body);

    let mut tags: Vec<String> = Vec::new();
    for line in stripped.lines() {
        for tag in line_tags(line) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_owned());
            }
        }
    }
    tags
}

fn line_tags(line: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut tags = Vec::new();

    for (i, &(offset, c)) in chars.iter().enumerate() {
        if c != '#' {
            continue;
        }
        if i > 0 && !chars[i - 1].1.is_whitespace() {
            continue;
        }
        let lookbehind = &chars[i.saturating_sub(HEADING_LOOKBEHIND)..i];
        if lookbehind.iter().any(|&(_, prev)| prev == '#') {
            continue;
        }
        if let Some(tag) = tag_body(&line[offset + 1..]) {
            tags.push(tag);
        }
    }

    tags
}

fn tag_body(rest: &str) -> Option<&str> {
    let first = rest.chars().next()?;
    if !first.is_alphabetic() {
        return None;
    }

    let end = rest
        .char_indices()
        .find(|&(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '/')))
        .map_or(rest.len(), |(i, _)| i);

    let tag = rest[..end].trim_end_matches(['/', '-']);
    (!tag.is_empty()).then_some(tag)
}
