//! Pass orchestration.

use crate::callouts::convert_callouts;
use crate::email::convert_email_blocks;
use crate::embeds::convert_embeds;
use crate::error::PassError;
use crate::fence::rewrite_outside_fences;
use crate::frontmatter::process_frontmatter;
use crate::link_filter::filter_noise_links;
use crate::options::PreprocessOptions;
use crate::result::PreprocessingResult;
use crate::stats::document_stats;
use crate::tags::extract_tags;
use crate::wikilinks::convert_wikilinks;

/// A preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Frontmatter,
    Tags,
    EmailBlocks,
    LinkFilter,
    Embeds,
    Wikilinks,
    Callouts,
    Statistics,
}

impl Pass {
    /// Execution order. Embeds must run before wikilinks because `![[x]]`
    /// contains `[[x]]`, and frontmatter before tags so that inline tags are
    /// de-duplicated against frontmatter tags.
    pub const ORDER: [Self; 8] = [
        Self::Frontmatter,
        Self::Tags,
        Self::EmailBlocks,
        Self::LinkFilter,
        Self::Embeds,
        Self::Wikilinks,
        Self::Callouts,
        Self::Statistics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Frontmatter => "frontmatter",
            Self::Tags => "tags",
            Self::EmailBlocks => "email-blocks",
            Self::LinkFilter => "link-filter",
            Self::Embeds => "embeds",
            Self::Wikilinks => "wikilinks",
            Self::Callouts => "callouts",
            Self::Statistics => "statistics",
        }
    }

    fn is_enabled(self, options: &PreprocessOptions) -> bool {
        match self {
            Self::Frontmatter | Self::Statistics => true,
            Self::Tags => options.extract_metadata,
            Self::EmailBlocks => options.convert_email_blocks,
            Self::LinkFilter => options.filter_links,
            Self::Embeds => options.convert_embeds,
            Self::Wikilinks => options.convert_wikilinks,
            Self::Callouts => options.convert_callouts,
        }
    }
}

/// Runs the preprocessing passes over a document.
///
/// A `Preprocessor` holds only configuration, so one instance can process
/// many documents, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Process one document.
    ///
    /// Never fails. If a pass fails, its message is recorded in `errors` as
    /// `"Processing error: <message>"`, the remaining passes are skipped, and
    /// the content as of the failing pass is returned.
    pub fn process(&self, raw: &str) -> PreprocessingResult {
        let mut result = PreprocessingResult::default();
        let mut content = raw.to_owned();

        for pass in Pass::ORDER {
            if !pass.is_enabled(&self.options) {
                continue;
            }

            let warnings_before = result.warnings.len();
            match self.run_pass(pass, &content, &mut result) {
                Ok(Some(next)) => content = next,
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(pass = pass.name(), %error, "Preprocessing pass failed");
                    result.errors.push(format!("Processing error: {error}"));
                    break;
                }
            }
            tracing::debug!(
                pass = pass.name(),
                warnings = result.warnings.len() - warnings_before,
                "Pass complete"
            );
        }

        result.content = content;
        result
    }

    /// Run a single pass. `None` means the content is unchanged.
    fn run_pass(
        &self,
        pass: Pass,
        content: &str,
        result: &mut PreprocessingResult,
    ) -> Result<Option<String>, PassError> {
        let next = match pass {
            Pass::Frontmatter => process_frontmatter(content, &self.options, result)?,
            Pass::Tags => {
                for tag in extract_tags(content) {
                    result.metadata.add_tag(tag);
                }
                tracing::debug!(tags = ?result.metadata.tags, "Collected tags");
                return Ok(None);
            }
            Pass::EmailBlocks => convert_email_blocks(content, result),
            Pass::LinkFilter => rewrite_outside_fences(content, filter_noise_links),
            Pass::Embeds => convert_embeds(content, self.options.image_mode, result),
            Pass::Wikilinks => convert_wikilinks(content, &self.options.links, result),
            Pass::Callouts => convert_callouts(content),
            Pass::Statistics => {
                let stats = document_stats(content);
                result.metadata.word_count = stats.word_count;
                if result.metadata.title.is_none() {
                    result.metadata.title = stats.first_heading;
                }
                return Ok(None);
            }
        };
        Ok(Some(next))
    }
}

/// Process one document with the given options.
pub fn preprocess(raw: &str, options: &PreprocessOptions) -> PreprocessingResult {
    Preprocessor::new(options.clone()).process(raw)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::frontmatter::{parse_yaml, split_frontmatter};
    use crate::options::{ImageMode, LinkFormat, LinkOptions};

    fn process(raw: &str) -> PreprocessingResult {
        Preprocessor::default().process(raw)
    }

    #[test]
    fn test_order_is_fixed() {
        let names: Vec<_> = Pass::ORDER.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "frontmatter",
                "tags",
                "email-blocks",
                "link-filter",
                "embeds",
                "wikilinks",
                "callouts",
                "statistics",
            ]
        );
    }

    #[test]
    fn test_full_document() {
        let raw = "---\ntitle: Weekly\ntags: [work]\n---\n# Heading\n\nMet with [[People/Ann|Ann]] #work #meeting\n\n![[chart.png]]\n\n> [!tip] Remember\n> Bring [[Notes]]\n";
        let result = process(raw);

        assert!(result.errors.is_empty());
        assert_eq!(result.metadata.title.as_deref(), Some("Weekly"));
        assert_eq!(result.metadata.tags, vec!["work", "meeting"]);
        assert_eq!(
            result.content,
            "---\ntitle: Weekly\ntags: [work]\n---\n# Heading\n\nMet with [Ann](People/Ann.md) #work #meeting\n\nIMAGE_EMBED_MARKER:chart.png:chart:\n\n<!-- callout-tip -->\n> **💡 Tip**\n> Remember\n> Bring [Notes](Notes.md)\n\n"
        );
        assert_eq!(result.metadata.image_embeds.len(), 1);
        assert!(result.metadata.word_count > 0);
    }

    #[test]
    fn test_wikilink_round_trip() {
        let options = PreprocessOptions::default().with_links(LinkOptions {
            format: LinkFormat::Markdown,
            extension: ".md".to_owned(),
            base_url: None,
        });
        let result = preprocess("[[My Note#Section Two|See here]]", &options);
        assert_eq!(result.content, "[See here](My%20Note.md#section-two)");
    }

    #[test]
    fn test_embed_runs_before_wikilinks() {
        let result = process("![[diagram.png]]");
        assert!(!result.content.contains(".md"));
        assert!(!result.content.contains("[["));
        assert_eq!(result.content, "IMAGE_EMBED_MARKER:diagram.png:diagram:");

        let inline = preprocess(
            "![[diagram.png]]",
            &PreprocessOptions::default().with_image_mode(ImageMode::Inline),
        );
        assert_eq!(inline.content, "![diagram](diagram.png)");
    }

    #[test]
    fn test_disabled_embeds_are_not_treated_as_wikilinks() {
        let result = preprocess("![[diagram.png]]", &PreprocessOptions::default().with_embeds(false));
        assert_eq!(result.content, "![[diagram.png]]");
    }

    #[test]
    fn test_callout_lookahead() {
        let result = process("> [!note] Title\n> line one\n\n> line two\n");
        assert_eq!(result.content.matches("<!-- callout-note -->").count(), 1);
        assert!(result.content.contains("> line one\n>\n> line two"));
    }

    #[test]
    fn test_callout_termination() {
        let result = process("> [!note] Title\n> body\n\nNot part of callout");
        assert!(result.content.ends_with("\n\nNot part of callout"));
        assert!(!result.content.contains("> Not part of callout"));
    }

    #[test]
    fn test_inline_tags_deduplicated_against_frontmatter() {
        let result = process("---\ntags: beta, alpha\n---\n#alpha #gamma #beta #alpha\n");
        assert_eq!(result.metadata.tags, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_tag_extraction_is_idempotent_over_output() {
        let result = process("Text #alpha and [[Link]] and > [!note]\n#beta\n");
        assert_eq!(extract_tags(&result.content), result.metadata.tags);
    }

    #[test]
    fn test_tags_skipped_without_metadata_extraction() {
        let options = PreprocessOptions::default().with_extract_metadata(false);
        let result = preprocess("---\ntags: [fm]\n---\n#inline\n", &options);
        assert_eq!(result.metadata.tags, vec!["fm"]);
    }

    #[test]
    fn test_malformed_frontmatter_falls_back() {
        let result = process("---\ntitle: [unbalanced\nauthor: Ann\n---\nBody text stays\n");
        assert!(result.errors.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("Frontmatter")));
        assert!(result.content.contains("Body text stays"));
        assert_eq!(
            result
                .metadata
                .frontmatter
                .as_ref()
                .and_then(|fm| fm.get("author"))
                .and_then(|v| v.as_str()),
            Some("Ann")
        );
    }

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let result = process("Intro\n\n## First Section\n\n# Second\n");
        assert_eq!(result.metadata.title.as_deref(), Some("First Section"));
    }

    #[test]
    fn test_override_title_wins() {
        let options = PreprocessOptions::default().with_title_override("From File");
        let result = preprocess("---\ntitle: Inner\n---\n# Heading\n", &options);
        assert_eq!(result.metadata.title.as_deref(), Some("From File"));
        assert!(result.content.starts_with("---\ntitle: From File\n---\n"));
    }

    #[test]
    fn test_email_block_and_link_filter() {
        let raw = "Note [Open: mail](message://x)\n\n```email\n---\nfrom: Ann\n---\nHello [Open: it](message://y)\n```\n";
        let result = process(raw);
        assert!(!result.content.contains("message://"));
        assert!(result.content.contains("#emailBlock(from: \"Ann\", \"Hello\")"));
    }

    #[test]
    fn test_code_blocks_are_preserved() {
        let raw = "```md\n[[Note]] ![[a.png]] #tag\n> [!note]\n```\n";
        let result = process(raw);
        assert_eq!(result.content, raw);
        assert!(result.metadata.tags.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_fresh_result_per_call() {
        let preprocessor = Preprocessor::default();
        let first = preprocessor.process("#one ![[a.png]]");
        let second = preprocessor.process("#two");
        assert_eq!(first.metadata.tags, vec!["one"]);
        assert_eq!(second.metadata.tags, vec!["two"]);
        assert!(second.metadata.image_embeds.is_empty());
    }

    #[test]
    fn test_callout_title_goes_into_body() {
        let result = process("> [!note] Title\n> body\n");
        assert_eq!(
            result.content,
            "<!-- callout-note -->\n> **📝 Note**\n> Title\n> body\n\n"
        );
    }

    #[test]
    fn test_link_filter_keeps_hard_line_breaks() {
        let result = process("Line one  \nLine two\n\nReply [Open: Mail](message://abc)\n");
        assert_eq!(result.content, "Line one  \nLine two\n\nReply\n");
    }

    #[test]
    fn test_preserved_frontmatter_stays_valid_yaml() {
        let result = process("---\ntitle: T\nup: [[Parent]]\n---\nSee [[Parent]]\n");

        let (yaml, body) = split_frontmatter(&result.content).unwrap();
        assert_eq!(yaml, "title: T\nup: [[Parent]]\n");
        assert_eq!(body, "See [Parent](Parent.md)\n");
        let map = parse_yaml(yaml).unwrap();
        assert_eq!(map.get("title").and_then(|v| v.as_str()), Some("T"));
    }

    #[test]
    fn test_inline_code_is_not_rewritten() {
        let result = process("Type `[[Note]]` or `![[a.png]]` to link [[Note]]\n");
        assert_eq!(
            result.content,
            "Type `[[Note]]` or `![[a.png]]` to link [Note](Note.md)\n"
        );
        assert!(result.metadata.image_embeds.is_empty());
    }
}
