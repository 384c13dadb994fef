//! Preprocessor for an extended markdown dialect.
//!
//! Converts author-facing documents (wikilinks, embeds, callouts, frontmatter,
//! inline email blocks, hashtags) into normalized markdown for a downstream
//! typesetting pipeline, while collecting document metadata.
//!
//! # Architecture
//!
//! [`Preprocessor::process`] runs a fixed sequence of text passes (see
//! [`Pass::ORDER`]). Each pass receives the evolving content and the shared
//! [`PreprocessingResult`]; malformed input degrades to partial output plus
//! warnings rather than failing the document.
//!
//! Image and PDF embeds are not resolved here. They are replaced by deferred
//! markers and queued as [`EmbedDescriptor`]s for a collaborator that has
//! file-system access.
//!
//! # Example
//!
//! ```
//! use mdprep_preprocess::{PreprocessOptions, Preprocessor};
//!
//! let preprocessor = Preprocessor::new(PreprocessOptions::default());
//! let result = preprocessor.process("# Hello\n\nSee [[Other Note]] #draft\n");
//!
//! assert!(result.content.contains("[Other Note](Other%20Note.md)"));
//! assert_eq!(result.metadata.tags, vec!["draft".to_owned()]);
//! assert_eq!(result.metadata.title.as_deref(), Some("Hello"));
//! ```

mod callouts;
mod email;
mod embeds;
mod error;
mod fence;
mod frontmatter;
mod link_filter;
mod options;
mod paths;
mod preprocessor;
mod result;
mod stats;
mod tags;
mod wikilinks;

pub use callouts::{CalloutStyle, FoldState};
pub use email::{EMAIL_FUNCTION, RAW_FORMAT, escape_string_literal};
pub use embeds::EmbedKind;
pub use error::{EmailBlockError, FrontmatterError, LinkError, PassError};
pub use frontmatter::{FrontmatterMap, FrontmatterValue};
pub use link_filter::filter_noise_links;
pub use options::{ImageMode, LinkFormat, LinkOptions, PreprocessOptions};
pub use paths::{heading_anchor, sanitize_path};
pub use preprocessor::{Pass, Preprocessor, preprocess};
pub use result::{DocumentMetadata, EmbedDescriptor, PreprocessingResult};
pub use tags::extract_tags;
