//! Preprocessor configuration.

/// How wikilink targets are turned into link destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkFormat {
    /// Append [`LinkOptions::extension`] to the target (`Note` → `Note.md`).
    #[default]
    Markdown,
    /// Leave the target without an extension.
    NoExtension,
}

/// Options for rewriting wikilinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    pub format: LinkFormat,
    /// Extension appended in [`LinkFormat::Markdown`] mode, including the dot.
    pub extension: String,
    /// Prefix for relative link destinations.
    pub base_url: Option<String>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            format: LinkFormat::Markdown,
            extension: ".md".to_owned(),
            base_url: None,
        }
    }
}

/// How image embeds are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// Emit a deferred marker and queue the image for an external resolver.
    #[default]
    Deferred,
    /// Emit markdown image syntax (or an `<img>` tag when a size is given).
    Inline,
}

/// Configuration for [`Preprocessor`](crate::Preprocessor).
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PreprocessOptions {
    /// Keep the frontmatter block in the output content.
    pub preserve_frontmatter: bool,
    /// Extract inline hashtags into the metadata.
    pub extract_metadata: bool,
    /// Title that overrides any frontmatter title (e.g. from the file name).
    pub title_override: Option<String>,
    pub convert_email_blocks: bool,
    pub filter_links: bool,
    pub convert_embeds: bool,
    pub convert_wikilinks: bool,
    pub convert_callouts: bool,
    pub links: LinkOptions,
    pub image_mode: ImageMode,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            preserve_frontmatter: true,
            extract_metadata: true,
            title_override: None,
            convert_email_blocks: true,
            filter_links: true,
            convert_embeds: true,
            convert_wikilinks: true,
            convert_callouts: true,
            links: LinkOptions::default(),
            image_mode: ImageMode::Deferred,
        }
    }
}

impl PreprocessOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_preserve_frontmatter(mut self, preserve: bool) -> Self {
        self.preserve_frontmatter = preserve;
        self
    }

    #[must_use]
    pub fn with_extract_metadata(mut self, extract: bool) -> Self {
        self.extract_metadata = extract;
        self
    }

    /// Set a title that wins over the frontmatter title.
    #[must_use]
    pub fn with_title_override(mut self, title: impl Into<String>) -> Self {
        self.title_override = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: LinkOptions) -> Self {
        self.links = links;
        self
    }

    #[must_use]
    pub fn with_image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = mode;
        self
    }

    #[must_use]
    pub fn with_email_blocks(mut self, enabled: bool) -> Self {
        self.convert_email_blocks = enabled;
        self
    }

    #[must_use]
    pub fn with_link_filter(mut self, enabled: bool) -> Self {
        self.filter_links = enabled;
        self
    }

    #[must_use]
    pub fn with_embeds(mut self, enabled: bool) -> Self {
        self.convert_embeds = enabled;
        self
    }

    #[must_use]
    pub fn with_wikilinks(mut self, enabled: bool) -> Self {
        self.convert_wikilinks = enabled;
        self
    }

    #[must_use]
    pub fn with_callouts(mut self, enabled: bool) -> Self {
        self.convert_callouts = enabled;
        self
    }
}
