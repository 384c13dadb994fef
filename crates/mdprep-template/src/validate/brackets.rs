//! Bracket and string balance checks.

use super::TemplateValidationResult;
use super::scanner::{CharKind, MarkupScanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Brace,
    Square,
    Paren,
}

impl BracketKind {
    const ALL: [Self; 3] = [Self::Brace, Self::Square, Self::Paren];

    fn name(self) -> &'static str {
        match self {
            Self::Brace => "braces",
            Self::Square => "square brackets",
            Self::Paren => "parentheses",
        }
    }

    fn open_char(self) -> char {
        match self {
            Self::Brace => '{',
            Self::Square => '[',
            Self::Paren => '(',
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Brace => 0,
            Self::Square => 1,
            Self::Paren => 2,
        }
    }

    /// Classify a bracket character as `(kind, is_opening)`.
    fn classify(c: char) -> Option<(Self, bool)> {
        match c {
            '{' => Some((Self::Brace, true)),
            '}' => Some((Self::Brace, false)),
            '[' => Some((Self::Square, true)),
            ']' => Some((Self::Square, false)),
            '(' => Some((Self::Paren, true)),
            ')' => Some((Self::Paren, false)),
            _ => None,
        }
    }
}

/// Check `{}`, `[]` and `()` balance with one stack per bracket type.
///
/// Brackets inside string literals, comments and escapes are ignored.
pub(crate) fn check_brackets(text: &str, result: &mut TemplateValidationResult) {
    let mut stacks: [Vec<(usize, usize)>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for scanned in MarkupScanner::new(text) {
        if scanned.kind != CharKind::Code {
            continue;
        }
        let Some((kind, opening)) = BracketKind::classify(scanned.ch) else {
            continue;
        };

        let stack = &mut stacks[kind.index()];
        if opening {
            stack.push((scanned.line, scanned.column));
        } else if stack.pop().is_none() {
            result.errors.push(format!(
                "Unmatched closing {} '{}' at line {}, column {}",
                kind.name(),
                scanned.ch,
                scanned.line,
                scanned.column
            ));
        }
    }

    for kind in BracketKind::ALL {
        for &(line, column) in &stacks[kind.index()] {
            result.errors.push(format!(
                "Unclosed {}: '{}' opened at line {line}, column {column}",
                kind.name(),
                kind.open_char()
            ));
        }
    }
}

/// Check string literals and `[...]` content blocks.
///
/// `[` and `]` are counted only outside strings. A string literal still open
/// at the end of the text is an error.
pub(crate) fn check_strings(text: &str, result: &mut TemplateValidationResult) {
    let mut depth: i64 = 0;
    let mut scanner = MarkupScanner::new(text);

    for scanned in scanner.by_ref() {
        if scanned.kind != CharKind::Code {
            continue;
        }
        match scanned.ch {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
    }

    if depth > 0 {
        result
            .errors
            .push(format!("{depth} unclosed '[' content block(s)"));
    } else if depth < 0 {
        result.errors.push(format!(
            "{} extra ']' without a matching '['",
            depth.unsigned_abs()
        ));
    }

    if let Some((line, column)) = scanner.open_string() {
        result.errors.push(format!(
            "Unterminated string literal starting at line {line}, column {column}"
        ));
    }
}
