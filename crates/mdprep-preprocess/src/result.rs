//! Output of a preprocessing run.

use crate::frontmatter::FrontmatterMap;

/// Result of preprocessing one document.
///
/// Built fresh for every [`Preprocessor::process`](crate::Preprocessor::process)
/// call and never shared between documents.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PreprocessingResult {
    /// Normalized document text.
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Failures that stopped a pass. Processing of the document still
    /// returns best-effort content.
    pub errors: Vec<String>,
    /// Non-fatal notices (unknown file types, fallbacks, queued embeds).
    pub warnings: Vec<String>,
}

impl PreprocessingResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Metadata collected while preprocessing.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentMetadata {
    /// Tags in order of first appearance, without duplicates.
    pub tags: Vec<String>,
    pub frontmatter: Option<FrontmatterMap>,
    pub title: Option<String>,
    pub word_count: usize,
    pub pdf_embeds: Vec<EmbedDescriptor>,
    pub image_embeds: Vec<EmbedDescriptor>,
}

impl DocumentMetadata {
    /// Add a tag unless it is already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }
}

/// An embed replaced by a deferred marker.
///
/// The marker is left in the content for a resolver with file-system access,
/// which uses the descriptor lists in [`DocumentMetadata`] as its worklist.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EmbedDescriptor {
    /// Path as written in the document.
    pub original_path: String,
    pub sanitized_path: String,
    pub file_name: String,
    /// File name without extension.
    pub base_name: String,
    /// Raw parameter after `|` (size, alt text, or page options).
    pub options: Option<String>,
    /// Sentinel token inserted into the content.
    pub marker: String,
}
