//! Errors raised while finding, reading or rendering templates.

use std::path::PathBuf;

/// Template lookup, loading or rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No built-in or user template with this name.
    #[error("Template not found: {0}")]
    NotFound(String),
    /// Template file disappeared since discovery.
    #[error("Template file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Permission denied reading template: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Validation failed; the template must not be passed to the compiler.
    #[error("Template '{name}' is invalid: {}", errors.join("; "))]
    Invalid { name: String, errors: Vec<String> },
}

impl TemplateError {
    /// Map a read error for `path` onto the matching variant.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
