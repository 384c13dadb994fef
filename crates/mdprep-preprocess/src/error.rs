//! Error types for preprocessing passes.
//!
//! None of these escape [`Preprocessor::process`](crate::Preprocessor::process):
//! their `Display` text becomes an entry in the result's `errors` or
//! `warnings`.

/// Failure that aborts the remaining passes for a document.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// The override title could not be written as a YAML scalar.
    #[error("failed to write title into frontmatter: {0}")]
    FrontmatterTitle(#[from] serde_yaml::Error),
}

/// Frontmatter that could not be parsed as a YAML mapping.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("{0}")]
    Yaml(serde_yaml::Error),
    #[error("frontmatter is not a key/value mapping")]
    NotAMapping,
}

/// Per-match failure in the wikilink or embed passes.
///
/// The matched text is passed through unchanged and the message is recorded
/// as a warning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Empty wikilink target: {0}")]
    EmptyWikilink(String),
    #[error("Empty embed path: {0}")]
    EmptyEmbed(String),
}

/// Failure to parse a fenced email block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailBlockError {
    #[error("email header opened at line {line} is never closed with '---'")]
    UnclosedHeader { line: usize },
}
