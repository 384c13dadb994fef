//! Character scanner shared by the bracket and string checks.
//!
//! Escaped characters and `//` line comments are skipped. String literals are
//! tracked so that callers can tell prose brackets from bracket characters
//! inside strings.

/// Where a scanned character sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharKind {
    /// Markup or code outside string literals.
    Code,
    /// An unescaped `"` opening or closing a string.
    Quote,
    /// Inside a string literal.
    InString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScannedChar {
    pub ch: char,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
    pub kind: CharKind,
}

pub(crate) struct MarkupScanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    previous: Option<char>,
    string_start: Option<(usize, usize)>,
}

impl<'a> MarkupScanner<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 0,
            previous: None,
            string_start: None,
        }
    }

    /// Position of a string literal still open at the current point.
    pub(crate) fn open_string(&self) -> Option<(usize, usize)> {
        self.string_start
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.previous = Some(c);
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }
}

impl Iterator for MarkupScanner<'_> {
    type Item = ScannedChar;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let previous = self.previous;
            let (line, column) = (self.line, self.column + 1);
            let c = self.advance()?;

            match c {
                '\\' => {
                    // The escaped character is consumed without being reported.
                    if self.chars.peek().is_some_and(|&next| next != '\n') {
                        self.advance();
                    }
                    self.previous = None;
                }
                '/' if self.string_start.is_none()
                    && self.chars.peek() == Some(&'/')
                    && previous != Some(':') =>
                {
                    self.skip_line();
                }
                '"' => {
                    self.string_start = match self.string_start {
                        Some(_) => None,
                        None => Some((line, column)),
                    };
                    return Some(ScannedChar {
                        ch: c,
                        line,
                        column,
                        kind: CharKind::Quote,
                    });
                }
                _ => {
                    let kind = if self.string_start.is_some() {
                        CharKind::InString
                    } else {
                        CharKind::Code
                    };
                    return Some(ScannedChar {
                        ch: c,
                        line,
                        column,
                        kind,
                    });
                }
            }
        }
    }
}
