//! Fenced code block tracking shared by the line-oriented passes.
//!
//! Passes that rewrite syntax must leave fenced code untouched, and the email
//! pass needs the info string of the fence that opens a block.

use std::sync::LazyLock;

use regex::Regex;

use crate::frontmatter::split_frontmatter;

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]+`").unwrap());

/// Classification of a single line relative to fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceLine<'a> {
    /// Opening fence; carries the trimmed info string (e.g. `rust`, `email`).
    Opening(&'a str),
    /// Closing fence.
    Closing,
    /// Line inside a fenced block.
    Inside,
    /// Regular text outside any fence.
    Text,
}

impl FenceLine<'_> {
    /// Whether the line belongs to a fenced block (including its fences).
    pub(crate) fn is_code(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Tracks fence state while scanning a document line by line.
///
/// Fences use backticks or tildes (three or more). A closing fence must use
/// the same character and be at least as long as the opening one.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Classify a line and advance the fence state.
    pub(crate) fn classify<'a>(&mut self, line: &'a str) -> FenceLine<'a> {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return FenceLine::Closing;
            }
            return FenceLine::Inside;
        }

        match detect_fence(trimmed) {
            Some((ch, len)) => {
                self.fence_char = Some(ch);
                self.fence_len = len;
                // Fence characters are ASCII, so `len` is also a byte offset.
                FenceLine::Opening(trimmed[len..].trim())
            }
            None => FenceLine::Text,
        }
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Apply `rewrite` to every run of lines outside a leading frontmatter block
/// and fenced code blocks.
///
/// Frontmatter and fenced lines are copied verbatim. Each run passed to
/// `rewrite` keeps its original line endings, so the output preserves the
/// input's line structure.
pub(crate) fn rewrite_outside_fences(
    content: &str,
    mut rewrite: impl FnMut(&str) -> String,
) -> String {
    let mut output = String::with_capacity(content.len());
    let frontmatter_len =
        split_frontmatter(content).map_or(0, |(_, body)| content.len() - body.len());
    output.push_str(&content[..frontmatter_len]);

    let mut fence = FenceTracker::new();
    let mut run_start: Option<usize> = None;
    let mut offset = frontmatter_len;

    for line in content[frontmatter_len..].split_inclusive('\n') {
        if fence.classify(line).is_code() {
            if let Some(start) = run_start.take() {
                output.push_str(&rewrite(&content[start..offset]));
            }
            output.push_str(line);
        } else if run_start.is_none() {
            run_start = Some(offset);
        }
        offset += line.len();
    }

    if let Some(start) = run_start {
        output.push_str(&rewrite(&content[start..]));
    }

    output
}

/// Like [`rewrite_outside_fences`], but inline code spans are copied verbatim
/// as well. `rewrite` sees the text between spans.
pub(crate) fn rewrite_outside_code(
    content: &str,
    mut rewrite: impl FnMut(&str) -> String,
) -> String {
    rewrite_outside_fences(content, |run| {
        let mut output = String::with_capacity(run.len());
        let mut last = 0;
        for span in INLINE_CODE_RE.find_iter(run) {
            output.push_str(&rewrite(&run[last..span.start()]));
            output.push_str(span.as_str());
            last = span.end();
        }
        output.push_str(&rewrite(&run[last..]));
        output
    })
}

/// Blank out fenced code blocks and inline code spans.
///
/// Line count is preserved so positions in the result still map to lines of
/// the original text.
pub(crate) fn strip_code(content: &str) -> String {
    let mut fence = FenceTracker::new();
    let mut output = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if fence.classify(line).is_code() {
            if line.ends_with('\n') {
                output.push('\n');
            }
        } else {
            output.push_str(&INLINE_CODE_RE.replace_all(line, " "));
        }
    }

    output
}

/// Join processed lines, keeping a trailing newline only if the input had one.
pub(crate) fn join_lines(lines: &[String], input: &str) -> String {
    let mut output = lines.join("\n");
    if input.ends_with('\n') && !lines.is_empty() {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_initially() {
        let tracker = FenceTracker::new();
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_opening_fence_reports_info_string() {
        let mut tracker = FenceTracker::new();

        assert_eq!(tracker.classify("```email"), FenceLine::Opening("email"));
        assert!(tracker.in_fence());
        assert_eq!(tracker.classify("from: a"), FenceLine::Inside);
        assert_eq!(tracker.classify("```"), FenceLine::Closing);
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence_with_spaced_info() {
        let mut tracker = FenceTracker::new();

        assert_eq!(tracker.classify("~~~ python "), FenceLine::Opening("python"));
        assert_eq!(tracker.classify("~~~"), FenceLine::Closing);
    }

    #[test]
    fn test_shorter_fence_does_not_close() {
        let mut tracker = FenceTracker::new();

        tracker.classify("````");
        assert_eq!(tracker.classify("```"), FenceLine::Inside);
        assert_eq!(tracker.classify("`````"), FenceLine::Closing);
    }

    #[test]
    fn test_mixed_fence_chars_do_not_close() {
        let mut tracker = FenceTracker::new();

        tracker.classify("```");
        assert_eq!(tracker.classify("~~~"), FenceLine::Inside);
        assert_eq!(tracker.classify("```"), FenceLine::Closing);
    }

    #[test]
    fn test_two_backticks_is_text() {
        let mut tracker = FenceTracker::new();
        assert_eq!(tracker.classify("``inline``"), FenceLine::Text);
    }

    #[test]
    fn test_rewrite_outside_fences_skips_code() {
        let input = "a [[x]]\n```\n[[x]]\n```\nb [[x]]\n";
        let output = rewrite_outside_fences(input, |chunk| chunk.replace("[[x]]", "X"));
        assert_eq!(output, "a X\n```\n[[x]]\n```\nb X\n");
    }

    #[test]
    fn test_rewrite_outside_fences_without_trailing_newline() {
        let output = rewrite_outside_fences("one\ntwo", str::to_uppercase);
        assert_eq!(output, "ONE\nTWO");
    }

    #[test]
    fn test_strip_code_blanks_fences_and_inline_code() {
        let input = "keep #a\n```\n#b\n```\nuse `#c` here\n";
        let stripped = strip_code(input);
        assert!(stripped.contains("#a"));
        assert!(!stripped.contains("#b"));
        assert!(!stripped.contains("#c"));
        assert_eq!(stripped.lines().count(), input.lines().count());
    }

    #[test]
    fn test_join_lines_preserves_trailing_newline() {
        let lines = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(join_lines(&lines, "a\nb\n"), "a\nb\n");
        assert_eq!(join_lines(&lines, "a\nb"), "a\nb");
    }

    #[test]
    fn test_rewrite_outside_fences_skips_frontmatter() {
        let input = "---\nup: [[x]]\n---\nbody [[x]]\n";
        let output = rewrite_outside_fences(input, |chunk| chunk.replace("[[x]]", "X"));
        assert_eq!(output, "---\nup: [[x]]\n---\nbody X\n");
    }

    #[test]
    fn test_thematic_break_is_not_frontmatter() {
        let input = "text [[x]]\n---\nmore [[x]]\n";
        let output = rewrite_outside_fences(input, |chunk| chunk.replace("[[x]]", "X"));
        assert_eq!(output, "text X\n---\nmore X\n");
    }

    #[test]
    fn test_rewrite_outside_code_skips_inline_spans() {
        let input = "a [[x]] `[[x]]` b [[x]]\n```\n[[x]]\n```\n";
        let output = rewrite_outside_code(input, |chunk| chunk.replace("[[x]]", "X"));
        assert_eq!(output, "a X `[[x]]` b X\n```\n[[x]]\n```\n");
    }
}
