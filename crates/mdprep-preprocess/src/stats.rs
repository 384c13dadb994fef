//! Word count and first-heading extraction over normalized content.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::split_frontmatter;

/// Statistics gathered from a markdown document.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DocumentStats {
    pub word_count: usize,
    /// Plain text of the first heading.
    pub first_heading: Option<String>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Count words and find the first heading. Frontmatter, code blocks and raw
/// HTML are not counted; inline code is.
pub(crate) fn document_stats(content: &str) -> DocumentStats {
    let body = split_frontmatter(content).map_or(content, |(_, body)| body);

    let mut word_count = 0;
    let mut first_heading: Option<String> = None;
    let mut heading_text: Option<String> = None;
    let mut in_code_block = false;

    for event in Parser::new_ext(body, parser_options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::Heading { .. }) if first_heading.is_none() => {
                heading_text = Some(String::new());
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = heading_text.take() {
                    let text = text.trim();
                    if !text.is_empty() {
                        first_heading = Some(text.to_owned());
                    }
                }
            }
            Event::Text(text) | Event::Code(text) if !in_code_block => {
                word_count += text.split_whitespace().count();
                if let Some(heading) = heading_text.as_mut() {
                    heading.push_str(&text);
                }
            }
            _ => {}
        }
    }

    DocumentStats {
        word_count,
        first_heading,
    }
}
