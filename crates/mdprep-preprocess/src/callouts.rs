//! Callout (`> [!type] Title`) conversion.
//!
//! Callouts are recognized by a line scanner with two states. A block ends at
//! the first line that is not `>`-prefixed, except that a single blank line is
//! kept when the line after it continues the quote (see
//! [`continues_after_blank`]).

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::{FenceTracker, join_lines};

static CALLOUT_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s*\[!([\w-]+)\]([+-]?)\s*(.*)$").unwrap());

/// Canonical callout types: `(type, icon, label)`.
const CALLOUT_TYPES: &[(&str, &str, &str)] = &[
    ("note", "📝", "Note"),
    ("abstract", "📋", "Abstract"),
    ("info", "ℹ️", "Info"),
    ("tip", "💡", "Tip"),
    ("success", "✅", "Success"),
    ("question", "❓", "Question"),
    ("warning", "⚠️", "Warning"),
    ("failure", "❌", "Failure"),
    ("danger", "⚡", "Danger"),
    ("bug", "🐛", "Bug"),
    ("example", "📖", "Example"),
    ("quote", "💬", "Quote"),
    ("cite", "📚", "Citation"),
];

/// Alternative type names and the canonical type they render as.
const CALLOUT_ALIASES: &[(&str, &str)] = &[
    ("summary", "abstract"),
    ("tldr", "abstract"),
    ("todo", "info"),
    ("hint", "tip"),
    ("important", "tip"),
    ("check", "success"),
    ("done", "success"),
    ("help", "question"),
    ("faq", "question"),
    ("caution", "warning"),
    ("attention", "warning"),
    ("fail", "failure"),
    ("missing", "failure"),
    ("error", "danger"),
];

const GENERIC_ICON: &str = "📌";

/// Fold marker after the type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldState {
    #[default]
    None,
    /// `+`: foldable, initially open.
    Expanded,
    /// `-`: foldable, initially closed.
    Collapsed,
}

impl FoldState {
    fn from_marker(marker: &str) -> Self {
        match marker {
            "+" => Self::Expanded,
            "-" => Self::Collapsed,
            _ => Self::None,
        }
    }

    /// Glyph appended to the header line.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Expanded => " ▼",
            Self::Collapsed => " ▶",
        }
    }
}

/// Display style of a callout type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutStyle {
    /// Canonical type name (aliases resolved, lowercase).
    pub kind: String,
    pub icon: &'static str,
    pub label: String,
}

impl CalloutStyle {
    /// Look up the style for a callout type (case-insensitive).
    ///
    /// ```
    /// use mdprep_preprocess::CalloutStyle;
    ///
    /// let style = CalloutStyle::for_type("TLDR");
    /// assert_eq!(style.kind, "abstract");
    /// assert_eq!(style.label, "Abstract");
    ///
    /// let custom = CalloutStyle::for_type("recipe");
    /// assert_eq!((custom.icon, custom.label.as_str()), ("📌", "Recipe"));
    /// ```
    pub fn for_type(kind: &str) -> Self {
        let kind = kind.to_lowercase();
        let canonical = CALLOUT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == kind)
            .map_or(kind.as_str(), |(_, canonical)| canonical);

        match CALLOUT_TYPES.iter().find(|(name, _, _)| *name == canonical) {
            Some(&(name, icon, label)) => Self {
                kind: name.to_owned(),
                icon,
                label: label.to_owned(),
            },
            None => Self {
                label: title_case(&kind),
                kind,
                icon: GENERIC_ICON,
            },
        }
    }

    /// Style class written in the marker comment.
    pub fn class(&self) -> String {
        format!("callout-{}", self.kind)
    }
}

fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A callout being accumulated.
#[derive(Debug)]
struct CalloutBlock {
    kind: String,
    fold: FoldState,
    body: Vec<String>,
}

impl CalloutBlock {
    fn from_header(line: &str) -> Option<Self> {
        let caps = CALLOUT_HEADER_RE.captures(line.trim_start())?;
        let title = caps[3].trim();
        Some(Self {
            kind: caps[1].to_lowercase(),
            fold: FoldState::from_marker(&caps[2]),
            body: if title.is_empty() {
                Vec::new()
            } else {
                vec![title.to_owned()]
            },
        })
    }

    fn render_into(self, output: &mut Vec<String>) {
        let style = CalloutStyle::for_type(&self.kind);

        output.push(format!("<!-- {} -->", style.class()));
        output.push(format!(
            "> **{} {}**{}",
            style.icon,
            style.label,
            self.fold.glyph()
        ));
        for line in self.body {
            if line.is_empty() {
                output.push(">".to_owned());
            } else {
                output.push(format!("> {line}"));
            }
        }
        output.push(String::new());
    }
}

enum State {
    Scanning,
    InCallout(CalloutBlock),
}

fn is_callout_header(line: &str) -> bool {
    CALLOUT_HEADER_RE.is_match(line.trim_start())
}

/// Body text of a `>`-prefixed line, without the marker and one space.
fn quoted_content(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Whether a blank line inside a callout is followed by more of the same
/// callout. A following callout header starts a new block instead.
fn continues_after_blank(next: Option<&str>) -> bool {
    next.is_some_and(|line| quoted_content(line).is_some() && !is_callout_header(line))
}

/// Callout pass. Callouts inside fenced code are left as they are.
pub(crate) fn convert_callouts(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut fence = FenceTracker::new();
    let mut state = State::Scanning;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        state = match state {
            State::Scanning => {
                i += 1;
                if !fence.classify(line).is_code()
                    && let Some(block) = CalloutBlock::from_header(line)
                {
                    State::InCallout(block)
                } else {
                    output.push(line.to_owned());
                    State::Scanning
                }
            }
            State::InCallout(mut block) => {
                if is_callout_header(line) {
                    block.render_into(&mut output);
                    State::Scanning
                } else if let Some(text) = quoted_content(line) {
                    block.body.push(text.trim_end().to_owned());
                    i += 1;
                    State::InCallout(block)
                } else if line.trim().is_empty() && continues_after_blank(lines.get(i + 1).copied()) {
                    block.body.push(String::new());
                    i += 1;
                    State::InCallout(block)
                } else {
                    block.render_into(&mut output);
                    State::Scanning
                }
            }
        };
    }

    if let State::InCallout(block) = state {
        block.render_into(&mut output);
    }

    join_lines(&output, content)
}
